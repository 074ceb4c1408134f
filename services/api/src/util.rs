//! Shared helpers: code generation and argon2 hashing.

use crate::domain::types::OTP_CODE_LEN;

/// Generate a numeric one-time code of [`OTP_CODE_LEN`] digits,
/// zero-padded (leading zeros are valid codes).
pub fn generate_otp_code() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let max = 10u32.pow(OTP_CODE_LEN as u32);
    format!("{:0width$}", rng.random_range(0..max), width = OTP_CODE_LEN)
}

/// Argon2 salted hash of a secret (password or OTP code).
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret against its argon2 hash. Comparison inside argon2 is
/// constant-time; an unparseable hash counts as a mismatch.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}
