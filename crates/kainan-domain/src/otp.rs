//! One-time-code challenge types.

use serde::{Deserialize, Serialize};

/// What an OTP challenge (and the proof token minted from it) is for.
///
/// A proof token is only redeemable by the step matching its purpose:
/// `Register` by account creation, `PasswordReset` by the password reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OtpPurpose {
    Register,
    PasswordReset,
}

impl OtpPurpose {
    /// Stable string form, used in token claims and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::PasswordReset => "password-reset",
        }
    }

    /// Parse the stable string form. Returns `None` for unknown values.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "register" => Some(Self::Register),
            "password-reset" => Some(Self::PasswordReset),
            _ => None,
        }
    }
}
