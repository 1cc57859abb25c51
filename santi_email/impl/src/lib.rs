use std::{sync::LazyLock, time::Duration};

use anyhow::Context;
use santi_email_contracts::{Email, EmailService};
use santi_utils::santi_version;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

static USER_AGENT: LazyLock<String> =
    LazyLock::new(|| format!("LA SANTI Gomme Website (Version {})", santi_version()));

/// Sends emails through the Resend HTTP API.
#[derive(Debug, Clone)]
pub struct ResendEmailServiceImpl {
    client: reqwest::Client,
    config: ResendEmailServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ResendEmailServiceConfig {
    pub endpoint: Url,
    pub api_key: String,
    /// Sender mailbox, e.g. `Company <noreply@example.com>`.
    pub from: String,
    /// Upper bound for the whole request, including reading the response.
    pub timeout: Duration,
}

impl ResendEmailServiceImpl {
    pub fn new(config: ResendEmailServiceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&*USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context("Failed to build http client")?;

        Ok(Self { client, config })
    }
}

impl EmailService for ResendEmailServiceImpl {
    #[tracing::instrument(skip_all)]
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let request = SendEmailRequest {
            from: &self.config.from,
            to: [email.recipient.as_str()],
            subject: &email.subject,
            text: &email.body,
            reply_to: email.reply_to.as_ref().map(|x| x.as_str()),
        };

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to email provider")?;

        let status = response.status();
        if status.is_success() {
            let SendEmailResponse { id } = response
                .json()
                .await
                .context("Failed to read response of email provider")?;
            debug!(%id, "email accepted by provider");
            return Ok(true);
        }

        // The error message may echo request fields, only the error name is
        // logged.
        let name = response
            .json::<ErrorResponse>()
            .await
            .map(|err| err.name)
            .unwrap_or_default();
        warn!(%status, name, "email rejected by provider");

        Ok(false)
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    name: String,
}
