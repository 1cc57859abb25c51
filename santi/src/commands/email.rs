use anyhow::ensure;
use clap::Subcommand;
use email_address::EmailAddress;
use santi_config::Config;
use santi_email_contracts::{Email, EmailService};

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test {
        /// Defaults to the mailbox receiving the contact form messages
        recipient: Option<EmailAddress>,
    },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => {
                let recipient = recipient.unwrap_or_else(|| config.contact.email.clone());
                test(&config, recipient).await
            }
        }
    }
}

async fn test(config: &Config, recipient: EmailAddress) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email)?;

    let ok = email_service
        .send(Email {
            recipient,
            subject: "[Sito Web] Test di recapito email".into(),
            body: "L'invio delle email dal sito funziona correttamente.".into(),
            reply_to: None,
        })
        .await?;

    ensure!(ok, "Failed to send email");

    Ok(())
}
