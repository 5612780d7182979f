//! Bee 预约助手 WhatsApp 服务
//!
//! 配置见 config/default.toml，环境变量覆盖:
//! - BEE__WHATSAPP__ACCESS_TOKEN: Meta WhatsApp API 访问令牌
//! - BEE__WHATSAPP__PHONE_NUMBER_ID: 企业电话号码 ID
//! - BEE__WHATSAPP__VERIFY_TOKEN: Webhook 验证令牌 (默认 "bee")
//! - BEE__AGENDA__OPERATOR_IDENTITY: 接收每日日程的运营者号码
//!
//! 启动: cargo run --bin bee-booking

use std::sync::Arc;

use anyhow::Context;
use bee_booking::{
    config::load_config,
    core::ShutdownManager,
    gateway::{MessageGateway, WhatsappCloudGateway},
    observability,
    server::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config = load_config(None).context("Failed to load config")?;
    if config.whatsapp.access_token.is_empty() || config.whatsapp.phone_number_id.is_empty() {
        tracing::warn!("WhatsApp credentials are not configured; outbound replies will fail");
    }
    if config.agenda.operator_identity.is_none() {
        tracing::warn!("agenda.operator_identity is not set; /agenda requests will fail");
    }

    let gateway: Arc<dyn MessageGateway> = Arc::new(
        WhatsappCloudGateway::new(&config.whatsapp).context("Failed to build WhatsApp client")?,
    );
    let state = Arc::new(AppState::in_memory(&config, gateway));
    let app = create_router(Arc::clone(&state));

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Bee booking server listening on http://{}", addr);
    tracing::info!("Webhook URL: http://YOUR_HOST:{}/webhook", config.server.port);

    let signal = Arc::clone(&shutdown);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { signal.wait_for_shutdown().await })
        .await?;

    let lost = state.router.ledger().len().await;
    let sessions = state.router.sessions().len().await;
    tracing::info!(
        "Server stopped; discarding {} in-memory bookings and {} sessions",
        lost,
        sessions
    );

    Ok(())
}
