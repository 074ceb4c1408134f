use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use kainan_domain::otp::OtpPurpose;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::auth::{
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, ResetPasswordInput,
    ResetPasswordUseCase,
};
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Public account view returned by register/login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
}

impl UserResponse {
    pub(crate) fn from_user(user: &crate::domain::types::User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            is_admin: user.is_admin,
        }
    }
}

// ── POST /auth/register-send-otp ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
}

pub async fn register_send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let usecase = RequestOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        notifier: state.notifier.clone(),
    };
    usecase
        .execute(RequestOtpInput {
            identifier: body.email,
            purpose: OtpPurpose::Register,
        })
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

// ── POST /auth/register-verify-otp ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofTokenResponse {
    pub proof_token: String,
}

pub async fn register_verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<ProofTokenResponse>, ApiError> {
    let usecase = VerifyOtpUseCase {
        otps: state.otp_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let proof_token = usecase
        .execute(VerifyOtpInput {
            identifier: body.email,
            purpose: OtpPurpose::Register,
            code: body.code,
        })
        .await?;
    Ok(Json(ProofTokenResponse { proof_token }))
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub proof_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_token: String,
    pub user: UserResponse,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(RegisterInput {
            first_name: body.first_name,
            last_name: body.last_name,
            username: body.username,
            email: body.email,
            phone: body.phone,
            password: body.password,
            proof_token: body.proof_token,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_token: out.session_token,
            user: UserResponse::from_user(&out.user),
        }),
    ))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
        require_admin: false,
    };
    let out = usecase
        .execute(LoginInput {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;
    Ok(Json(SessionResponse {
        session_token: out.session_token,
        user: UserResponse::from_user(&out.user),
    }))
}

// ── POST /auth/admin-login ───────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionResponse {
    pub session_token: String,
    pub admin: UserResponse,
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AdminSessionResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
        require_admin: true,
    };
    let out = usecase
        .execute(LoginInput {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;
    Ok(Json(AdminSessionResponse {
        session_token: out.session_token,
        admin: UserResponse::from_user(&out.user),
    }))
}

// ── POST /auth/password-send-otp ─────────────────────────────────────────────

pub async fn password_send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let usecase = RequestOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        notifier: state.notifier.clone(),
    };
    usecase
        .execute(RequestOtpInput {
            identifier: body.email,
            purpose: OtpPurpose::PasswordReset,
        })
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

// ── POST /auth/password-verify-otp ───────────────────────────────────────────

pub async fn password_verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<ProofTokenResponse>, ApiError> {
    let usecase = VerifyOtpUseCase {
        otps: state.otp_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let proof_token = usecase
        .execute(VerifyOtpInput {
            identifier: body.email,
            purpose: OtpPurpose::PasswordReset,
            code: body.code,
        })
        .await?;
    Ok(Json(ProofTokenResponse { proof_token }))
}

// ── POST /auth/password-reset ────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
    pub proof_token: String,
}

pub async fn password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            new_password: body.new_password,
            proof_token: body.proof_token,
        })
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
