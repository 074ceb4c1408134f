//! Token signing. The api service is the sole issuer; validation lives in
//! `kainan-auth-types` next to the claims layout.

use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use kainan_auth_types::token::{JwtClaims, PROOF_TOKEN_EXP, SESSION_PURPOSE, SESSION_TOKEN_EXP};
use kainan_domain::otp::OtpPurpose;

use crate::error::ApiError;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Sign a session token (7 days) for a logged-in user.
pub fn issue_session_token(
    user_id: Uuid,
    is_admin: bool,
    secret: &str,
) -> Result<(String, u64), ApiError> {
    let iat = now_secs();
    let exp = iat + SESSION_TOKEN_EXP;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        admin: is_admin,
        purpose: SESSION_PURPOSE.to_owned(),
        iat,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;
    Ok((token, exp))
}

/// Sign a proof token (10 minutes) scoped to exactly the identifier a
/// satisfied OTP challenge verified.
pub fn issue_proof_token(
    identifier: &str,
    purpose: OtpPurpose,
    secret: &str,
) -> Result<String, ApiError> {
    let iat = now_secs();
    let claims = JwtClaims {
        sub: identifier.to_owned(),
        admin: false,
        purpose: purpose.as_str().to_owned(),
        iat,
        exp: iat + PROOF_TOKEN_EXP,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}
