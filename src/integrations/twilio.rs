//! Twilio WhatsApp 集成
//!
//! Twilio 以表单提交入站消息（`From` / `ProfileName` / `Body`），回复直接以 TwiML 写在响应体里，
//! 不经过出站网关。

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::header,
    response::IntoResponse,
    Form,
};
use serde::Deserialize;

use crate::gateway::InboundMessage;
use crate::server::AppState;

/// Twilio 表单字段
#[derive(Debug, Default, Deserialize)]
pub struct TwilioForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "ProfileName")]
    pub profile_name: Option<String>,
    #[serde(rename = "Body", default)]
    pub body: String,
}

impl TwilioForm {
    /// `whatsapp:+14155238886` → `+14155238886`
    pub fn into_message(self) -> InboundMessage {
        let identity = self
            .from
            .trim()
            .strip_prefix("whatsapp:")
            .unwrap_or(self.from.trim())
            .to_string();
        InboundMessage {
            identity,
            name: self.profile_name,
            body: self.body,
        }
    }
}

/// 生成 TwiML；无回复时返回空 `<Response>`
pub fn twiml(reply: Option<&str>) -> String {
    let inner = reply
        .map(|r| format!("<Message>{}</Message>", escape_xml(r)))
        .unwrap_or_default();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Response>{}</Response>"#, inner)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// POST /webhook/twilio - 接收 Twilio 消息并以 TwiML 回复
pub async fn webhook_receive(
    State(state): State<Arc<AppState>>,
    form: Result<Form<TwilioForm>, FormRejection>,
) -> impl IntoResponse {
    let xml = [(header::CONTENT_TYPE, "text/xml")];
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Twilio webhook: unreadable form ignored: {}", e);
            return (xml, twiml(None));
        }
    };

    let msg = form.into_message();
    tracing::info!("Twilio webhook: message from {:?}", msg.identity);

    let outcome = state.router.handle_turn(&msg).await;
    let body = twiml(outcome.as_ref().map(|o| o.reply.as_str()));

    (xml, body)
}
