//! JWT validation for session and proof tokens.
//!
//! Two token flavors share one HMAC secret but carry distinct `purpose`
//! claims, so neither can be replayed as the other:
//!
//! - **session** — long-lived, proves a successful login. Subject is the
//!   user id.
//! - **proof** — short-lived, proves a specific OTP challenge was
//!   satisfied. Subject is the verified identifier (email), and the
//!   purpose names which flow it belongs to.
//!
//! Signing lives in the api service (the sole issuer); every consumer
//! validates through this module.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kainan_domain::otp::OtpPurpose;

/// Session-token JWT lifetime in seconds (7 days).
pub const SESSION_TOKEN_EXP: u64 = 604_800;

/// Proof-token JWT lifetime in seconds (10 minutes).
pub const PROOF_TOKEN_EXP: u64 = 600;

/// Purpose claim value carried by every session token.
pub const SESSION_PURPOSE: &str = "session";

/// Errors returned by token validation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("wrong token purpose")]
    WrongPurpose,
}

/// Claims payload shared by both token flavors.
///
/// | Field | Meaning |
/// |-------|---------|
/// | `sub` | user id (session) or verified identifier (proof) |
/// | `admin` | role flag; always `false` on proof tokens |
/// | `purpose` | `"session"`, `"register"` or `"password-reset"` |
/// | `iat` | issued-at, seconds since epoch |
/// | `exp` | expiration, seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub admin: bool,
    pub purpose: String,
    pub iat: u64,
    pub exp: u64,
}

/// Identity extracted from a validated session token.
#[derive(Debug, Clone)]
pub struct SessionTokenInfo {
    pub user_id: Uuid,
    pub is_admin: bool,
    pub exp: u64,
}

/// Claim extracted from a validated proof token.
#[derive(Debug, Clone)]
pub struct ProofTokenInfo {
    pub identifier: String,
    pub purpose: OtpPurpose,
}

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s — tolerates clock skew.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a session token and return the authenticated identity.
///
/// Callers must still re-resolve the subject against the credential store:
/// a valid signature proves past authentication, not current account
/// existence.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionTokenInfo, TokenError> {
    let claims = decode_jwt(token, secret)?;
    if claims.purpose != SESSION_PURPOSE {
        return Err(TokenError::WrongPurpose);
    }
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(SessionTokenInfo {
        user_id,
        is_admin: claims.admin,
        exp: claims.exp,
    })
}

/// Validate a proof token against the purpose the caller expects.
///
/// A registration step passes `OtpPurpose::Register`; a proof minted for
/// any other purpose fails `WrongPurpose` even with a valid signature.
pub fn validate_proof_token(
    token: &str,
    secret: &str,
    expected: OtpPurpose,
) -> Result<ProofTokenInfo, TokenError> {
    let claims = decode_jwt(token, secret)?;
    let purpose = OtpPurpose::from_str_opt(&claims.purpose).ok_or(TokenError::WrongPurpose)?;
    if purpose != expected {
        return Err(TokenError::WrongPurpose);
    }
    Ok(ProofTokenInfo {
        identifier: claims.sub,
        purpose,
    })
}
