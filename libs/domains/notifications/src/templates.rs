//! Email template rendering.

use crate::error::NotificationResult;
use handlebars::Handlebars;
use serde_json::json;

/// Rendered email content.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

const VERIFICATION_SUBJECT: &str = "Verify your email address";

const VERIFICATION_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; line-height: 1.5;">
  <h2>Welcome!</h2>
  <p>Thanks for signing up. Confirm your email address to start submitting events and clubs.</p>
  <p><a href="{{link}}" style="display: inline-block; padding: 10px 18px; background: #1f2937; color: #ffffff; text-decoration: none; border-radius: 4px;">Verify email</a></p>
  <p>Or paste this link into your browser:<br>{{link}}</p>
  <p>This link expires in {{expires_hours}} hours.</p>
</body>
</html>"#;

const VERIFICATION_TEXT_TEMPLATE: &str = "Welcome!

Thanks for signing up. Confirm your email address to start submitting events and clubs:

{{link}}

This link expires in {{expires_hours}} hours.
";

/// Verification email for `link`, valid for `expires_hours`.
pub fn verification_email(link: &str, expires_hours: i64) -> NotificationResult<RenderedEmail> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("verification_html", VERIFICATION_HTML_TEMPLATE)?;
    handlebars.register_template_string("verification_text", VERIFICATION_TEXT_TEMPLATE)?;
    // Links carry only the base URL and an alphanumeric token
    handlebars.register_escape_fn(handlebars::no_escape);

    let data = json!({ "link": link, "expires_hours": expires_hours });

    Ok(RenderedEmail {
        subject: VERIFICATION_SUBJECT.to_string(),
        html: handlebars.render("verification_html", &data)?,
        text: handlebars.render("verification_text", &data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_embeds_link() {
        let link = "http://localhost:8080/api/auth/verify-email/abc123";
        let email = verification_email(link, 24).unwrap();

        assert_eq!(email.subject, "Verify your email address");
        assert!(email.html.contains(&format!("href=\"{}\"", link)));
        assert!(email.text.contains(link));
        assert!(email.text.contains("24 hours"));
    }
}
