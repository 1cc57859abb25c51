use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use email_address::EmailAddress;
use santi_email_contracts::Email;

use crate::sanitize::SanitizedSubmission;

const BANNER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Builds the notification for the site owner.
pub(crate) fn make_email(
    recipient: EmailAddress,
    submission: &SanitizedSubmission,
    now: DateTime<Utc>,
    timezone: Tz,
) -> Email {
    let SanitizedSubmission {
        name,
        email,
        message,
        reply_to,
    } = submission;
    let date = now.with_timezone(&timezone).format("%d/%m/%Y, %H:%M:%S");
    let name_line = format!("Nome: {name}");
    let email_line = format!("Email: {email}");
    let date_line = format!("Data: {date}");

    let body = [
        BANNER,
        "NUOVO MESSAGGIO DAL SITO WEB",
        BANNER,
        "",
        name_line.as_str(),
        email_line.as_str(),
        date_line.as_str(),
        "",
        BANNER,
        "MESSAGGIO:",
        BANNER,
        "",
        message.as_str(),
    ]
    .join("\n");

    Email {
        recipient,
        subject: format!("[Sito Web] Nuovo messaggio da {name}"),
        body,
        reply_to: Some(reply_to.clone()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn compose() {
        // Arrange
        let submission = SanitizedSubmission {
            name: "Mario Rossi".into(),
            email: "m.rossi@example.com".into(),
            message: "Vorrei un preventivo per 4 gomme.".into(),
            reply_to: "m.rossi@example.com".parse().unwrap(),
        };
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 8, 5, 9).unwrap();

        // Act
        let result = make_email(
            "info@example.com".parse().unwrap(),
            &submission,
            now,
            chrono_tz::Europe::Rome,
        );

        // Assert
        assert_eq!(
            result,
            Email {
                recipient: "info@example.com".parse().unwrap(),
                subject: "[Sito Web] Nuovo messaggio da Mario Rossi".into(),
                body: "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
                       NUOVO MESSAGGIO DAL SITO WEB\n\
                       ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
                       \n\
                       Nome: Mario Rossi\n\
                       Email: m.rossi@example.com\n\
                       Data: 01/07/2024, 10:05:09\n\
                       \n\
                       ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
                       MESSAGGIO:\n\
                       ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
                       \n\
                       Vorrei un preventivo per 4 gomme."
                    .into(),
                reply_to: Some("m.rossi@example.com".parse().unwrap()),
            }
        );
    }

    #[test]
    fn winter_time() {
        // Arrange
        let submission = SanitizedSubmission {
            name: "Anna".into(),
            email: "anna@example.com".into(),
            message: "Cambio gomme invernali".into(),
            reply_to: "anna@example.com".parse().unwrap(),
        };
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();

        // Act
        let result = make_email(
            "info@example.com".parse().unwrap(),
            &submission,
            now,
            chrono_tz::Europe::Rome,
        );

        // Assert
        assert!(result.body.contains("\nData: 01/01/2025, 00:30:00\n"));
    }
}
