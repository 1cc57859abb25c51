use std::sync::LazyLock;

use email_address::EmailAddress;
use nutype::nutype;
use regex::Regex;

/// An untrusted contact form as received from a client.
///
/// Fields that were missing or not text are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub privacy_consent: bool,
}

/// A contact form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: EmailAddress,
    pub message: ContactMessageContent,
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 100, predicate = |name: &str| is_contact_name(name)),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactName(String);

impl ContactName {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 100;
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 2000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageContent(String);

impl ContactMessageContent {
    pub const MIN_LEN: usize = 10;
    pub const MAX_LEN: usize = 2000;
}

static CONTACT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZàèéìòùÀÈÉÌÒÙ\s'-]+$").unwrap());

/// Returns whether `name` only consists of latin letters (including the
/// accented vowels used in Italian), whitespace, apostrophes and hyphens.
pub fn is_contact_name(name: &str) -> bool {
    CONTACT_NAME_REGEX.is_match(name)
}
