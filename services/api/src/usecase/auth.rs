use chrono::Utc;
use uuid::Uuid;

use kainan_auth_types::token::validate_proof_token;
use kainan_domain::otp::OtpPurpose;

use crate::domain::repository::UserRepository;
use crate::domain::types::{MIN_PASSWORD_LEN, User};
use crate::error::ApiError;
use crate::usecase::token::issue_session_token;
use crate::util::{hash_secret, verify_secret};

// ── Register (step 3 of the two-phase protocol) ──────────────────────────────

pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub proof_token: String,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user: User,
    pub session_token: String,
    pub session_token_exp: u64,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RegisterUseCase<U> {
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, ApiError> {
        let first_name = input.first_name.trim().to_owned();
        let last_name = input.last_name.trim().to_owned();
        let username = input.username.trim().to_owned();
        let email = input.email.trim().to_lowercase();
        let phone = input.phone.trim().to_owned();

        if first_name.is_empty()
            || last_name.is_empty()
            || username.is_empty()
            || email.is_empty()
            || phone.is_empty()
        {
            return Err(ApiError::MissingData);
        }

        // The proof must carry the registration purpose and be bound to
        // exactly the email being registered.
        let proof = validate_proof_token(&input.proof_token, &self.jwt_secret, OtpPurpose::Register)
            .map_err(|_| ApiError::InvalidToken)?;
        if proof.identifier != email {
            return Err(ApiError::InvalidToken);
        }

        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::PasswordTooShort);
        }

        if self
            .users
            .find_conflicting(&username, &email, &phone)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict);
        }

        let password_hash =
            hash_secret(&input.password).map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            first_name,
            last_name,
            username,
            email,
            phone,
            password_hash,
            is_admin: false,
            is_banned: false,
            addresses: vec![],
            cart: vec![],
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;

        // Registration doubles as the first login.
        let (session_token, session_token_exp) =
            issue_session_token(user.id, user.is_admin, &self.jwt_secret)?;

        Ok(RegisterOutput {
            user,
            session_token,
            session_token_exp,
        })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub session_token: String,
    pub session_token_exp: u64,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
    /// Admin-restricted variant: rejects non-admin accounts.
    pub require_admin: bool,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let identifier = input.identifier.trim();
        if identifier.is_empty() || input.password.is_empty() {
            return Err(ApiError::MissingData);
        }

        // An '@' marks an email identifier; anything else is a username.
        let user = if identifier.contains('@') {
            self.users.find_by_email(&identifier.to_lowercase()).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        // Uniform failure for unknown account and wrong password, so the
        // response does not reveal which identifiers exist.
        let user = user.ok_or(ApiError::InvalidCredentials)?;
        if !verify_secret(&input.password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        if user.is_banned {
            return Err(ApiError::Forbidden);
        }
        if self.require_admin && !user.is_admin {
            return Err(ApiError::Forbidden);
        }

        let (session_token, session_token_exp) =
            issue_session_token(user.id, user.is_admin, &self.jwt_secret)?;

        Ok(LoginOutput {
            user,
            session_token,
            session_token_exp,
        })
    }
}

// ── ResetPassword (redeems a password-reset proof) ───────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub new_password: String,
    pub proof_token: String,
}

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), ApiError> {
        let email = input.email.trim().to_lowercase();

        let proof = validate_proof_token(
            &input.proof_token,
            &self.jwt_secret,
            OtpPurpose::PasswordReset,
        )
        .map_err(|_| ApiError::InvalidToken)?;
        if proof.identifier != email {
            return Err(ApiError::InvalidToken);
        }

        if input.new_password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::PasswordTooShort);
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let password_hash =
            hash_secret(&input.new_password).map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
        self.users.update_password_hash(user.id, &password_hash).await
    }
}
