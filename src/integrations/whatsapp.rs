//! WhatsApp Cloud API 集成
//!
//! 通过 Webhook 接收消息，交给预约路由处理后经 [`MessageGateway`](crate::gateway::MessageGateway) 发送回复。
//! 无论处理或发送是否出错都回 200，避免 Meta 重投。

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::gateway::InboundMessage;
use crate::server::AppState;

/// Webhook 验证参数
#[derive(Debug, Deserialize)]
pub struct WebhookVerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// WhatsApp Webhook 请求体
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    pub entry: Option<Vec<WebhookEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEntry {
    pub changes: Option<Vec<WebhookChange>>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookChange {
    pub value: Option<WebhookValue>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookValue {
    pub contacts: Option<Vec<WebhookContact>>,
    pub messages: Option<Vec<WebhookMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookContact {
    pub profile: Option<WebhookProfile>,
    pub wa_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookProfile {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub from: String,
    #[serde(rename = "type")]
    pub msg_type: Option<String>,
    pub text: Option<WebhookText>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookText {
    #[serde(default)]
    pub body: String,
}

impl WebhookPayload {
    /// 取出全部文本消息并归一化；昵称取 wa_id 相同的联系人，找不到时用第一个联系人
    pub fn into_messages(self) -> Vec<InboundMessage> {
        if self.object.as_deref() != Some("whatsapp_business_account") {
            return Vec::new();
        }

        let mut out = Vec::new();
        for value in self
            .entry
            .into_iter()
            .flatten()
            .flat_map(|e| e.changes.into_iter().flatten())
            .filter_map(|c| c.value)
        {
            let contacts = value.contacts.unwrap_or_default();
            for msg in value.messages.into_iter().flatten() {
                if msg.msg_type.as_deref().is_some_and(|t| t != "text") {
                    continue;
                }
                let Some(text) = msg.text else { continue };
                let name = contacts
                    .iter()
                    .find(|c| c.wa_id.as_deref() == Some(msg.from.as_str()))
                    .or_else(|| contacts.first())
                    .and_then(|c| c.profile.as_ref())
                    .and_then(|p| p.name.clone());
                out.push(InboundMessage {
                    identity: msg.from,
                    name,
                    body: text.body,
                });
            }
        }
        out
    }
}

/// GET /webhook - Meta 验证 Webhook
pub async fn webhook_verify(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookVerifyQuery>,
) -> Result<String, StatusCode> {
    if query.mode.as_deref() == Some("subscribe")
        && query.verify_token.as_deref() == Some(state.verify_token.as_str())
    {
        tracing::info!("Webhook verified");
        Ok(query.challenge.unwrap_or_default())
    } else {
        tracing::warn!("Webhook verification rejected: mode={:?}", query.mode);
        Err(StatusCode::FORBIDDEN)
    }
}

/// POST /webhook - 接收 WhatsApp 消息
pub async fn webhook_receive(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> StatusCode {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("WhatsApp webhook: unreadable payload ignored: {}", e);
            return StatusCode::OK;
        }
    };

    let messages = payload.into_messages();
    if messages.is_empty() {
        tracing::debug!("WhatsApp webhook: no text messages in payload");
    }

    for msg in messages {
        state
            .router
            .handle_and_deliver(state.gateway.as_ref(), &msg)
            .await;
    }

    StatusCode::OK
}
