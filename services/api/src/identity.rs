//! Authenticated-request extractor.

use axum::extract::FromRequestParts;
use http::request::Parts;
use uuid::Uuid;

use kainan_auth_types::bearer::BearerToken;
use kainan_auth_types::token::validate_session_token;

use crate::domain::repository::UserRepository as _;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved from a bearer session token.
///
/// Tokens prove past authentication, not current account existence, so the
/// claimed subject is re-resolved against the store on every request:
/// a deleted account fails `AccountGone`, a banned one `Forbidden`.
/// `is_admin` comes from the stored row, not the token claim.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // The bearer extraction reads headers synchronously and hands back a
    // 'static future, so the store lookup can run in an async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = BearerToken::from_request_parts(parts, state);
        let state = state.clone();

        async move {
            let BearerToken(token) = bearer.await.map_err(|_| ApiError::InvalidToken)?;
            let info = validate_session_token(&token, &state.jwt_secret)
                .map_err(|_| ApiError::InvalidToken)?;

            let user = state
                .user_repo()
                .find_by_id(info.user_id)
                .await?
                .ok_or(ApiError::AccountGone)?;
            if user.is_banned {
                return Err(ApiError::Forbidden);
            }

            Ok(Self {
                user_id: user.id,
                is_admin: user.is_admin,
            })
        }
    }
}

impl Identity {
    /// Guard for admin-only handlers.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
