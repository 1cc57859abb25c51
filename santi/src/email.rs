use santi_config::EmailConfig;
use santi_email_impl::{ResendEmailServiceConfig, ResendEmailServiceImpl};

/// Build the client for the Resend API.
pub fn connect(config: &EmailConfig) -> anyhow::Result<ResendEmailServiceImpl> {
    ResendEmailServiceImpl::new(ResendEmailServiceConfig {
        endpoint: config.endpoint.clone(),
        api_key: config.api_key.clone(),
        from: config.from.clone(),
        timeout: config.timeout.into(),
    })
}
