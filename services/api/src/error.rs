use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Api service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation — rejected before touching the store.
    #[error("missing or invalid fields")]
    MissingData,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("invalid status")]
    InvalidStatus,
    #[error("invalid code")]
    InvalidCode,
    #[error("code expired")]
    OtpExpired,
    #[error("cart is empty")]
    EmptyCart,
    #[error("no saved address")]
    NoAddress,
    // Authentication.
    #[error("invalid token")]
    InvalidToken,
    #[error("account no longer exists")]
    AccountGone,
    #[error("invalid credentials")]
    InvalidCredentials,
    // Authorization.
    #[error("forbidden")]
    Forbidden,
    // Not found.
    #[error("no active code for this identifier")]
    OtpNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("cart item not found")]
    CartItemNotFound,
    // Conflict / state violations.
    #[error("already registered")]
    AlreadyRegistered,
    #[error("username, email or phone already exists")]
    Conflict,
    #[error("order can only be cancelled while processing")]
    CannotCancel,
    #[error("order is in a terminal state")]
    TerminalState,
    #[error("operation not allowed for current order status")]
    InvalidForStatus,
    #[error("too many attempts")]
    TooManyAttempts,
    // Downstream.
    #[error("notification dispatch unavailable")]
    Unavailable,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingData => "MISSING_DATA",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidCode => "INVALID_CODE",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::EmptyCart => "EMPTY_CART",
            Self::NoAddress => "NO_ADDRESS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::AccountGone => "ACCOUNT_GONE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden => "FORBIDDEN",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::CartItemNotFound => "CART_ITEM_NOT_FOUND",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::Conflict => "CONFLICT",
            Self::CannotCancel => "CANNOT_CANCEL",
            Self::TerminalState => "TERMINAL_STATE",
            Self::InvalidForStatus => "INVALID_FOR_STATUS",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingData
            | Self::PasswordTooShort
            | Self::InvalidStatus
            | Self::InvalidCode
            | Self::OtpExpired
            | Self::EmptyCart
            | Self::NoAddress => StatusCode::BAD_REQUEST,
            Self::InvalidToken | Self::AccountGone | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::OtpNotFound | Self::UserNotFound | Self::OrderNotFound | Self::CartItemNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyRegistered
            | Self::Conflict
            | Self::CannotCancel
            | Self::TerminalState
            | Self::InvalidForStatus => StatusCode::CONFLICT,
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
