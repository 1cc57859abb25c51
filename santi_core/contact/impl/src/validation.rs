use email_address::EmailAddress;
use santi_core_contact_contracts::{
    ContactField, ContactRule, ContactValidationErrors, ContactViolation,
};
use santi_models::contact::{
    is_contact_name, ContactForm, ContactMessageContent, ContactName, ContactSubmission,
};

/// A named predicate a trimmed, non-empty field value has to satisfy.
struct Rule {
    name: ContactRule,
    check: fn(&str) -> bool,
}

const NAME_RULES: &[Rule] = &[
    Rule {
        name: ContactRule::Length,
        check: is_valid_name_length,
    },
    Rule {
        name: ContactRule::Charset,
        check: is_contact_name,
    },
];

const EMAIL_RULES: &[Rule] = &[Rule {
    name: ContactRule::Email,
    check: EmailAddress::is_valid,
}];

const MESSAGE_RULES: &[Rule] = &[Rule {
    name: ContactRule::Length,
    check: is_valid_message_length,
}];

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];

/// Checks the fields in the order name, email, message.
///
/// Each field stops at its first violated rule. All invalid fields are
/// reported.
pub(crate) fn validate(form: &ContactForm) -> Result<ContactSubmission, ContactValidationErrors> {
    let name = check_field(ContactField::Name, form.name.as_deref(), NAME_RULES);
    let email = check_field(ContactField::Email, form.email.as_deref(), EMAIL_RULES);
    let message = check_field(ContactField::Message, form.message.as_deref(), MESSAGE_RULES);

    {
        let mut violations = [&name, &email, &message]
            .into_iter()
            .filter_map(|x| x.as_ref().err().copied());
        if let Some(first) = violations.next() {
            return Err(ContactValidationErrors::new(first, violations));
        }
    }

    let violation = |field, rule| ContactViolation::new(field, rule);
    Ok(ContactSubmission {
        name: ContactName::try_new(name?)
            .map_err(|_| violation(ContactField::Name, ContactRule::Length))?,
        email: email?
            .parse()
            .map(normalize_email)
            .map_err(|_| violation(ContactField::Email, ContactRule::Email))?,
        message: ContactMessageContent::try_new(message?)
            .map_err(|_| violation(ContactField::Message, ContactRule::Length))?,
    })
}

/// Returns the trimmed value of the field or its first violated rule.
fn check_field<'a>(
    field: ContactField,
    value: Option<&'a str>,
    rules: &[Rule],
) -> Result<&'a str, ContactViolation> {
    let value = value
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .ok_or(ContactViolation::new(field, ContactRule::Required))?;

    match rules.iter().find(|rule| !(rule.check)(value)) {
        Some(rule) => Err(ContactViolation::new(field, rule.name)),
        None => Ok(value),
    }
}

fn is_valid_name_length(name: &str) -> bool {
    (ContactName::MIN_LEN..=ContactName::MAX_LEN).contains(&name.chars().count())
}

fn is_valid_message_length(message: &str) -> bool {
    (ContactMessageContent::MIN_LEN..=ContactMessageContent::MAX_LEN)
        .contains(&message.chars().count())
}

/// Lowercases the address. Gmail addresses additionally lose dots and
/// sub-addresses in the local part.
pub(crate) fn normalize_email(email: EmailAddress) -> EmailAddress {
    let mut local = email.local_part().to_lowercase();
    let mut domain = email.domain().to_lowercase();

    if GMAIL_DOMAINS.contains(&domain.as_str()) {
        if let Some((address, _tag)) = local.split_once('+') {
            local = address.into();
        }
        local.retain(|c| c != '.');
        domain = "gmail.com".into();
    }

    format!("{local}@{domain}").parse().unwrap_or(email)
}
