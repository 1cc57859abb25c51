use santi_core_contact_impl::ContactFeatureServiceImpl;
use santi_core_health_impl::HealthFeatureServiceImpl;
use santi_email_impl::ResendEmailServiceImpl;
use santi_shared_impl::{rate_limit::RateLimitServiceImpl, time::TimeServiceImpl};

// API
pub type RestServer = santi_api_rest::RestServer<HealthFeature, ContactFeature, RateLimit>;

// Cache
pub type Cache = crate::cache::Cache;

// Email
pub type Email = ResendEmailServiceImpl;

// Shared
pub type Time = TimeServiceImpl;
pub type RateLimit = RateLimitServiceImpl<Cache>;

// Core
pub type ContactFeature = ContactFeatureServiceImpl<RateLimit, Time, Email>;
pub type HealthFeature = HealthFeatureServiceImpl<Time, Cache>;
