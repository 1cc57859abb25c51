use std::{fmt, future::Future, net::IpAddr, time::Duration};

use santi_models::contact::{ContactForm, ContactMessageContent, ContactName};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Validate the contact form submitted by `client` and forward it to the
    /// configured mailbox.
    fn submit(
        &self,
        client: IpAddr,
        form: ContactForm,
    ) -> impl Future<Output = Result<(), ContactSubmitError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error("Too many contact submissions from this client.")]
    RateLimited(RateLimitExceeded),
    #[error("Invalid contact form: {}", .0.first())]
    Invalid(ContactValidationErrors),
    #[error("The privacy policy has not been accepted.")]
    ConsentMissing,
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitExceeded {
    pub limit: u64,
    /// Time until the client may submit again.
    pub reset_after: Duration,
}

/// The first violation of every invalid field, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactValidationErrors {
    first: ContactViolation,
    rest: Vec<ContactViolation>,
}

impl ContactValidationErrors {
    pub fn new(first: ContactViolation, rest: impl IntoIterator<Item = ContactViolation>) -> Self {
        Self {
            first,
            rest: rest.into_iter().collect(),
        }
    }

    pub fn first(&self) -> &ContactViolation {
        &self.first
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactViolation> {
        std::iter::once(&self.first).chain(&self.rest)
    }
}

impl From<ContactViolation> for ContactValidationErrors {
    fn from(value: ContactViolation) -> Self {
        Self::new(value, [])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactViolation {
    pub field: ContactField,
    pub rule: ContactRule,
}

impl ContactViolation {
    pub const fn new(field: ContactField, rule: ContactRule) -> Self {
        Self { field, rule }
    }

    /// The user facing description of this violation.
    pub fn message(&self) -> String {
        use ContactField as F;
        use ContactRule as R;

        match (self.field, self.rule) {
            (F::Name, R::Required) => "Il nome è obbligatorio.".into(),
            (F::Name, R::Length) => format!(
                "Il nome deve essere tra {} e {} caratteri.",
                ContactName::MIN_LEN,
                ContactName::MAX_LEN
            ),
            (F::Name, _) => "Il nome contiene caratteri non validi.".into(),
            (F::Email, R::Required) => "L'email è obbligatoria.".into(),
            (F::Email, _) => "Inserisci un indirizzo email valido.".into(),
            (F::Message, R::Required) => "Il messaggio è obbligatorio.".into(),
            (F::Message, _) => format!(
                "Il messaggio deve essere tra {} e {} caratteri.",
                ContactMessageContent::MIN_LEN,
                ContactMessageContent::MAX_LEN
            ),
        }
    }
}

impl fmt::Display for ContactViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.rule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    /// The name of the field in the submitted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "nome",
            Self::Email => "email",
            Self::Message => "messaggio",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRule {
    Required,
    Length,
    Charset,
    Email,
}

impl ContactRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Length => "length",
            Self::Charset => "charset",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for ContactRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_submit(
        mut self,
        client: IpAddr,
        form: ContactForm,
        result: Result<(), ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(
                mockall::predicate::eq(client),
                mockall::predicate::eq(form),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(result)));
        self
    }
}
