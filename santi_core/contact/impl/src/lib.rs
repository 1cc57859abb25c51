use std::{net::IpAddr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use email_address::EmailAddress;
use santi_core_contact_contracts::{ContactFeatureService, ContactSubmitError, RateLimitExceeded};
use santi_email_contracts::{Email, EmailService};
use santi_models::contact::ContactForm;
use santi_shared_contracts::{
    rate_limit::{RateLimitPolicy, RateLimitService},
    time::TimeService,
};
use tracing::{error, info, warn};

use crate::{
    email::make_email,
    sanitize::{mask_email, sanitize_text, SanitizedSubmission},
    validation::validate,
};

mod email;
mod sanitize;
mod validation;

#[derive(Debug)]
pub struct ContactFeatureServiceImpl<RateLimit, Time, EmailS> {
    rate_limit: RateLimit,
    time: Time,
    email: Arc<EmailS>,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Mailbox receiving the submitted messages.
    pub recipient: EmailAddress,
    /// Timezone of the timestamp included in the notification.
    pub timezone: Tz,
    pub send_timeout: Duration,
    pub rate_limit: RateLimitPolicy,
}

impl<RateLimit, Time, EmailS> ContactFeatureServiceImpl<RateLimit, Time, EmailS> {
    pub fn new(
        rate_limit: RateLimit,
        time: Time,
        email: EmailS,
        config: ContactFeatureConfig,
    ) -> Self {
        Self {
            rate_limit,
            time,
            email: Arc::new(email),
            config,
        }
    }
}

impl<RateLimit, Time, EmailS> ContactFeatureService
    for ContactFeatureServiceImpl<RateLimit, Time, EmailS>
where
    RateLimit: RateLimitService,
    Time: TimeService,
    EmailS: EmailService,
{
    #[tracing::instrument(skip_all)]
    async fn submit(&self, client: IpAddr, form: ContactForm) -> Result<(), ContactSubmitError> {
        let name = form.name.as_deref().map(sanitize_text).unwrap_or_default();
        let email = mask_email(&form.email.as_deref().map(sanitize_text).unwrap_or_default());

        let result = self.process(client, form).await;

        match &result {
            Ok(()) => info!(
                outcome = "sent",
                name = %name,
                email = %email,
                client_ip = %client,
                "contact message sent"
            ),
            Err(ContactSubmitError::RateLimited(RateLimitExceeded { limit, reset_after })) => {
                warn!(
                    outcome = "rate_limited",
                    name = %name,
                    email = %email,
                    client_ip = %client,
                    limit,
                    reset_after_secs = reset_after.as_secs(),
                    "contact submission rejected"
                )
            }
            Err(ContactSubmitError::Invalid(errors)) => warn!(
                outcome = "invalid",
                name = %name,
                email = %email,
                client_ip = %client,
                field = %errors.first().field,
                rule = %errors.first().rule,
                "contact submission rejected"
            ),
            Err(ContactSubmitError::ConsentMissing) => warn!(
                outcome = "consent_missing",
                name = %name,
                email = %email,
                client_ip = %client,
                "contact submission rejected"
            ),
            Err(ContactSubmitError::Send) => error!(
                outcome = "send_failed",
                name = %name,
                email = %email,
                client_ip = %client,
                "contact message could not be sent"
            ),
            Err(ContactSubmitError::Other(err)) => error!(
                outcome = "error",
                name = %name,
                email = %email,
                client_ip = %client,
                error = ?err,
                "contact submission failed"
            ),
        }

        result
    }
}

impl<RateLimit, Time, EmailS> ContactFeatureServiceImpl<RateLimit, Time, EmailS>
where
    RateLimit: RateLimitService,
    Time: TimeService,
    EmailS: EmailService,
{
    async fn process(&self, client: IpAddr, form: ContactForm) -> Result<(), ContactSubmitError> {
        let decision = self.rate_limit.hit(self.config.rate_limit, client).await?;
        if !decision.allowed {
            return Err(ContactSubmitError::RateLimited(RateLimitExceeded {
                limit: decision.limit,
                reset_after: decision.reset_after,
            }));
        }

        let submission = validate(&form).map_err(ContactSubmitError::Invalid)?;

        if !form.privacy_consent {
            return Err(ContactSubmitError::ConsentMissing);
        }

        let email = make_email(
            self.config.recipient.clone(),
            &SanitizedSubmission::from(&submission),
            self.time.now(),
            self.config.timezone,
        );

        self.send(email).await.map_err(|err| {
            error!("Failed to send email: {err:#}");
            ContactSubmitError::Send
        })
    }

    /// Sends the email in a separate task, so a disconnecting client cannot
    /// abort a request to the provider that has already started.
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        let service = Arc::clone(&self.email);
        let timeout = self.config.send_timeout;

        let task =
            tokio::spawn(async move { tokio::time::timeout(timeout, service.send(email)).await });

        match task.await.context("Email task failed")? {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(anyhow!("Email provider rejected the message")),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(anyhow!("Email provider did not respond within {timeout:?}")),
        }
    }
}
