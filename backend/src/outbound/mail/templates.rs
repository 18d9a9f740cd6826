//! Askama bodies for account emails.

use askama::Template;

use crate::domain::ports::{EmailKind, EmailMessage, MailerError};

#[derive(Template)]
#[template(path = "email/verify_email.html")]
struct VerifyEmailTemplate<'a> {
    username: &'a str,
    link: &'a str,
    token: &'a str,
}

#[derive(Template)]
#[template(path = "email/reset_password.html")]
struct ResetPasswordTemplate<'a> {
    username: &'a str,
    link: &'a str,
    token: &'a str,
}

/// Build the link the email points at from the public base URL.
pub(crate) fn link_for(message: &EmailMessage) -> String {
    let path = match message.kind {
        EmailKind::Verification => "api/auth/confirmed_email",
        EmailKind::PasswordReset => "api/users/reset_password",
    };
    format!(
        "{}/{path}/{}",
        message.base_url.trim_end_matches('/'),
        message.token
    )
}

/// Render the HTML body for `message`.
pub(crate) fn render(message: &EmailMessage) -> Result<String, MailerError> {
    let link = link_for(message);
    let rendered = match message.kind {
        EmailKind::Verification => VerifyEmailTemplate {
            username: &message.username,
            link: &link,
            token: &message.token,
        }
        .render(),
        EmailKind::PasswordReset => ResetPasswordTemplate {
            username: &message.username,
            link: &link,
            token: &message.token,
        }
        .render(),
    };
    rendered.map_err(|err| MailerError::template(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::rstest;

    fn message(kind: EmailKind, base_url: &str) -> EmailMessage {
        EmailMessage {
            kind,
            recipient: EmailAddress::new("ada@example.com").expect("valid email"),
            username: "ada".to_owned(),
            base_url: base_url.to_owned(),
            token: "abc.def.ghi".to_owned(),
        }
    }

    #[rstest]
    #[case(EmailKind::Verification, "http://localhost:8000/", "http://localhost:8000/api/auth/confirmed_email/abc.def.ghi")]
    #[case(EmailKind::Verification, "http://localhost:8000", "http://localhost:8000/api/auth/confirmed_email/abc.def.ghi")]
    #[case(EmailKind::PasswordReset, "https://contacts.example/", "https://contacts.example/api/users/reset_password/abc.def.ghi")]
    fn links_join_base_and_token(#[case] kind: EmailKind, #[case] base: &str, #[case] expected: &str) {
        assert_eq!(link_for(&message(kind, base)), expected);
    }

    #[rstest]
    #[case(EmailKind::Verification, "Confirm email")]
    #[case(EmailKind::PasswordReset, "Reset password")]
    fn bodies_greet_user_and_carry_token(#[case] kind: EmailKind, #[case] call_to_action: &str) {
        let body = render(&message(kind, "http://localhost:8000/")).expect("render body");
        assert!(body.contains("Hi ada,"));
        assert!(body.contains("abc.def.ghi"));
        assert!(body.contains(call_to_action));
    }
}
