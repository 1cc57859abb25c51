use std::sync::Arc;

use santi_api_rest::{RestServerConfig, RestServerRealIpConfig};
use santi_config::{Config, RateLimitPolicyConfig};
use santi_core_contact_impl::ContactFeatureConfig;
use santi_core_health_impl::HealthFeatureConfig;
use santi_shared_contracts::rate_limit::RateLimitPolicy;
use types::{Cache, ContactFeature, Email, HealthFeature, RateLimit, RestServer, Time};

pub mod types;

/// Header carrying the client address when running behind a reverse proxy.
const FORWARDED_FOR: &str = "X-Forwarded-For";

/// Builds the services of the application from their dependencies.
#[derive(Debug)]
pub struct Provider {
    cache: Cache,
    email: Email,
    config: ConfigProvider,
}

impl Provider {
    pub fn new(config: ConfigProvider, cache: Cache, email: Email) -> Self {
        Self {
            cache,
            email,
            config,
        }
    }

    pub fn rest_server(self) -> RestServer {
        let rate_limit = self.rate_limit();
        let health = self.health_feature();
        let contact = self.contact_feature();
        RestServer::new(health, contact, rate_limit, self.config.rest_server_config)
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::new(self.cache.clone())
    }

    fn health_feature(&self) -> HealthFeature {
        HealthFeature::new(
            Time::default(),
            self.cache.clone(),
            self.config.health_feature_config.clone(),
        )
    }

    fn contact_feature(&self) -> ContactFeature {
        ContactFeature::new(
            self.rate_limit(),
            Time::default(),
            self.email.clone(),
            self.config.contact_feature_config.clone(),
        )
    }
}

/// The parts of the configuration consumed by the individual services.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    pub rest_server_config: RestServerConfig,
    pub contact_feature_config: ContactFeatureConfig,
    pub health_feature_config: HealthFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> Self {
        // API
        let real_ip_config = match &config.http.real_ip {
            Some(real_ip) => Some(RestServerRealIpConfig {
                header: real_ip.header.clone(),
                set_from: real_ip.set_from,
            }),
            None if config.environment.is_production() => Some(RestServerRealIpConfig {
                header: FORWARDED_FOR.into(),
                set_from: None,
            }),
            None => None,
        };

        let rest_server_config = RestServerConfig {
            environment: config.environment,
            static_dir: config.http.static_dir.clone(),
            body_limit: config.http.body_limit,
            real_ip_config: real_ip_config.map(Arc::new),
            rate_limit: policy("general", &config.rate_limit.general),
        };

        // Core
        let contact_feature_config = ContactFeatureConfig {
            recipient: config.contact.email.clone(),
            timezone: config.contact.timezone,
            send_timeout: config.contact.send_timeout.into(),
            rate_limit: policy("contact", &config.rate_limit.contact),
        };

        let health_feature_config = HealthFeatureConfig {
            environment: config.environment,
            cache_ttl: config.health.cache_ttl.into(),
        };

        Self {
            rest_server_config,
            contact_feature_config,
            health_feature_config,
        }
    }
}

fn policy(name: &'static str, config: &RateLimitPolicyConfig) -> RateLimitPolicy {
    RateLimitPolicy {
        name,
        max_requests: config.max_requests,
        window: config.window.into(),
    }
}
