use email_address::EmailAddress;
use santi_models::contact::ContactSubmission;

/// A validated submission, safe to embed into the outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SanitizedSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    /// The validated and normalized address of the sender.
    pub reply_to: EmailAddress,
}

impl From<&ContactSubmission> for SanitizedSubmission {
    fn from(value: &ContactSubmission) -> Self {
        Self {
            name: sanitize_text(&value.name),
            email: sanitize_text(value.email.as_str()),
            message: sanitize_text(&value.message),
            reply_to: value.email.clone(),
        }
    }
}

/// Removes ASCII control characters, escapes angle brackets and trims the
/// result.
pub(crate) fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if c.is_ascii_control() => {}
            c => out.push(c),
        }
    }
    out.trim().into()
}

/// Masks an email address for logging, keeping only the first two characters
/// of the local part and the domain.
pub(crate) fn mask_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let prefix = local.chars().take(2).collect::<String>();
            format!("{prefix}***@{domain}")
        }
        _ => "***".into(),
    }
}
