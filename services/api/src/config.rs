/// Api service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session and proof JWTs.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3100). Env var: `API_PORT`.
    pub api_port: u16,
    /// Transactional-mail endpoint the OTP dispatcher posts to. Env var: `NOTIFY_URL`.
    pub notify_url: String,
    /// API key for the mail endpoint. Env var: `NOTIFY_API_KEY`.
    pub notify_api_key: String,
    /// Sender address for OTP mails (e.g. "Kainan <no-reply@kainan.ph>"). Env var: `NOTIFY_FROM`.
    pub notify_from: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
            notify_url: std::env::var("NOTIFY_URL").expect("NOTIFY_URL"),
            notify_api_key: std::env::var("NOTIFY_API_KEY").expect("NOTIFY_API_KEY"),
            notify_from: std::env::var("NOTIFY_FROM").expect("NOTIFY_FROM"),
        }
    }
}
