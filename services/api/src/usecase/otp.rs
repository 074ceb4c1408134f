use chrono::{Duration, Utc};
use uuid::Uuid;

use kainan_domain::otp::OtpPurpose;

use crate::domain::repository::{NotificationDispatcher, OtpRepository, UserRepository};
use crate::domain::types::{OTP_CODE_LEN, OTP_MAX_ATTEMPTS, OTP_TTL_SECS, OtpChallenge};
use crate::error::ApiError;
use crate::usecase::token::issue_proof_token;
use crate::util::{generate_otp_code, hash_secret, verify_secret};

fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

// ── RequestOtp (issue a challenge) ───────────────────────────────────────────

pub struct RequestOtpInput {
    pub identifier: String,
    pub purpose: OtpPurpose,
}

pub struct RequestOtpUseCase<U, O, N>
where
    U: UserRepository,
    O: OtpRepository,
    N: NotificationDispatcher,
{
    pub users: U,
    pub otps: O,
    pub notifier: N,
}

impl<U, O, N> RequestOtpUseCase<U, O, N>
where
    U: UserRepository,
    O: OtpRepository,
    N: NotificationDispatcher,
{
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), ApiError> {
        let identifier = normalize_identifier(&input.identifier);
        if identifier.is_empty() || !identifier.contains('@') {
            return Err(ApiError::MissingData);
        }

        // Purpose-dependent precondition: a registration code must go to a
        // fresh identifier, a reset code to a registered one.
        let account = self.users.find_by_email(&identifier).await?;
        match input.purpose {
            OtpPurpose::Register => {
                if account.is_some() {
                    return Err(ApiError::AlreadyRegistered);
                }
            }
            OtpPurpose::PasswordReset => {
                if account.is_none() {
                    return Err(ApiError::UserNotFound);
                }
            }
        }

        let code = generate_otp_code();
        let code_hash = hash_secret(&code).map_err(|e| anyhow::anyhow!("hash otp code: {e}"))?;
        let now = Utc::now();
        let challenge = OtpChallenge {
            id: Uuid::new_v4(),
            identifier: identifier.clone(),
            purpose: input.purpose,
            code_hash,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            attempts: 0,
            consumed_at: None,
            created_at: now,
        };

        // Persisting and replacing prior challenges happens in one
        // transaction: at most one active challenge per (identifier, purpose).
        self.otps.create_replacing_active(&challenge).await?;

        // A code the user can never receive must not stay persisted.
        if let Err(e) = self.notifier.send_otp(&identifier, input.purpose, &code).await {
            self.otps.delete(challenge.id).await?;
            return Err(e);
        }

        Ok(())
    }
}

// ── VerifyOtp (redeem a challenge for a proof token) ─────────────────────────

pub struct VerifyOtpInput {
    pub identifier: String,
    pub purpose: OtpPurpose,
    pub code: String,
}

pub struct VerifyOtpUseCase<O: OtpRepository> {
    pub otps: O,
    pub jwt_secret: String,
}

impl<O: OtpRepository> VerifyOtpUseCase<O> {
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<String, ApiError> {
        let identifier = normalize_identifier(&input.identifier);
        let code = input.code.trim();
        if code.len() != OTP_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::InvalidCode);
        }

        let challenge = self
            .otps
            .find_latest(&identifier, input.purpose)
            .await?
            .ok_or(ApiError::OtpNotFound)?;

        if challenge.is_consumed() {
            // A challenge burned by attempt exhaustion keeps answering
            // TooManyAttempts until a fresh one replaces it.
            if challenge.attempts >= OTP_MAX_ATTEMPTS {
                return Err(ApiError::TooManyAttempts);
            }
            return Err(ApiError::OtpNotFound);
        }

        if challenge.is_expired(Utc::now()) {
            return Err(ApiError::OtpExpired);
        }

        if challenge.attempts >= OTP_MAX_ATTEMPTS {
            self.otps.consume(challenge.id).await?;
            return Err(ApiError::TooManyAttempts);
        }

        // Every try counts, right or wrong.
        self.otps.record_attempt(challenge.id).await?;

        if !verify_secret(code, &challenge.code_hash) {
            return Err(ApiError::InvalidCode);
        }

        // Guarded consume: the predicate in the store rejects the second of
        // two concurrent redeems.
        if !self.otps.consume(challenge.id).await? {
            return Err(ApiError::OtpNotFound);
        }

        issue_proof_token(&identifier, input.purpose, &self.jwt_secret)
    }
}
