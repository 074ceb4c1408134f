use sea_orm::Database;
use tracing::info;

use kainan_api::config::ApiConfig;
use kainan_api::infra::notify::MailDispatcher;
use kainan_api::router::build_router;
use kainan_api::state::AppState;
use kainan_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let notifier = MailDispatcher::new(
        config.notify_url,
        config.notify_api_key,
        config.notify_from,
    );

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        notifier,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
