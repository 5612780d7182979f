//! HTTP 服务：Webhook 路由与运营者日程接口

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::booking::{
    AgendaReporter, BookingLedger, IntentRouter, MemoryLedger, MemorySessionStore, Replies,
    SessionStore,
};
use crate::config::AppConfig;
use crate::gateway::{Delivery, MessageGateway};
use crate::integrations::{twilio, whatsapp};

/// 服务状态（所有处理器共享）
pub struct AppState {
    pub router: IntentRouter,
    pub agenda: AgendaReporter,
    pub gateway: Arc<dyn MessageGateway>,
    pub verify_token: String,
}

impl AppState {
    /// 用内存会话存储与内存账本组装服务状态
    pub fn in_memory(config: &AppConfig, gateway: Arc<dyn MessageGateway>) -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let ledger: Arc<dyn BookingLedger> = Arc::new(MemoryLedger::new());
        Self::new(config, sessions, ledger, gateway)
    }

    pub fn new(
        config: &AppConfig,
        sessions: Arc<dyn SessionStore>,
        ledger: Arc<dyn BookingLedger>,
        gateway: Arc<dyn MessageGateway>,
    ) -> Self {
        let router = IntentRouter::new(
            sessions,
            Arc::clone(&ledger),
            Replies::new(config.business.clone()),
        );
        let agenda = AgendaReporter::new(
            ledger,
            Arc::clone(&gateway),
            config.agenda.operator_identity.clone(),
            config.agenda.utc_offset_minutes,
        );
        Self {
            router,
            agenda,
            gateway,
            verify_token: config.whatsapp.verify_token.clone(),
        }
    }
}

/// 日程查询参数；不传 date 时取今天
#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    pub date: Option<String>,
}

/// 创建路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Bee booking bot running" }))
        .route("/health", get(|| async { "OK" }))
        .route(
            "/webhook",
            get(whatsapp::webhook_verify).post(whatsapp::webhook_receive),
        )
        .route("/webhook/twilio", post(twilio::webhook_receive))
        .route("/agenda", get(send_agenda))
        .with_state(state)
}

/// GET /agenda - 把日程推送给运营者
async fn send_agenda(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgendaQuery>,
) -> (StatusCode, String) {
    let date = query
        .date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| state.agenda.today());

    match state.agenda.send_agenda(&date).await {
        Ok(Delivery::Delivered) => (StatusCode::OK, format!("Agenda for {} sent", date)),
        Ok(Delivery::Failed(reason)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to send agenda for {}: {}", date, reason),
        ),
        Err(e) => {
            tracing::error!("Agenda request failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
