use kainan_domain::otp::OtpPurpose;

use crate::domain::repository::NotificationDispatcher;
use crate::error::ApiError;

/// Production dispatcher: posts OTP mails to a transactional-mail HTTP
/// endpoint. Delivery failure surfaces as `Unavailable` so the caller can
/// roll the challenge back — a code the user never receives must not stay
/// redeemable.
#[derive(Clone)]
pub struct MailDispatcher {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl MailDispatcher {
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

impl NotificationDispatcher for MailDispatcher {
    async fn send_otp(
        &self,
        recipient: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), ApiError> {
        let subject = match purpose {
            OtpPurpose::Register => "Your Kainan registration code",
            OtpPurpose::PasswordReset => "Your Kainan password reset code",
        };
        let text = format!(
            "Your code is: {code}\n\n\
             This code expires in 5 minutes.\n\n\
             If you did not request this, ignore this message."
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.from,
                "to": recipient,
                "subject": subject,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "otp dispatch failed");
                ApiError::Unavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "otp dispatch rejected");
            return Err(ApiError::Unavailable);
        }

        tracing::info!(purpose = purpose.as_str(), "otp dispatched");
        Ok(())
    }
}
