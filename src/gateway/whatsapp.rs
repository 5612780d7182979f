//! WhatsApp Cloud API 出站发送

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::message::{Delivery, MessageGateway};
use crate::config::WhatsappSection;

/// WhatsApp 单条消息上限 4096 字符，留出余量
const MAX_CHUNK_CHARS: usize = 4000;

/// WhatsApp 发送消息 API 请求体
#[derive(Debug, Serialize)]
struct SendMessageRequest {
    messaging_product: String,
    to: String,
    #[serde(rename = "type")]
    msg_type: String,
    text: SendMessageText,
}

#[derive(Debug, Serialize)]
struct SendMessageText {
    body: String,
}

/// 通过 Cloud API（`{api_base}/{phone_number_id}/messages`）发送文本
pub struct WhatsappCloudGateway {
    client: reqwest::Client,
    access_token: String,
    messages_url: String,
}

impl WhatsappCloudGateway {
    pub fn new(section: &WhatsappSection) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            access_token: section.access_token.clone(),
            messages_url: format!(
                "{}/{}/messages",
                section.api_base.trim_end_matches('/'),
                section.phone_number_id
            ),
        })
    }

    async fn post_chunk(&self, to: &str, chunk: String) -> anyhow::Result<()> {
        let req = SendMessageRequest {
            messaging_product: "whatsapp".to_string(),
            to: to.replace('+', ""),
            msg_type: "text".to_string(),
            text: SendMessageText { body: chunk },
        };

        let resp = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("WhatsApp API error ({}): {}", status, text);
        }
        Ok(())
    }
}

#[async_trait]
impl MessageGateway for WhatsappCloudGateway {
    async fn send(&self, to: &str, body: &str) -> Delivery {
        for chunk in split_chunks(body, MAX_CHUNK_CHARS) {
            if let Err(e) = self.post_chunk(to, chunk).await {
                return Delivery::Failed(e.to_string());
            }
        }
        Delivery::Delivered
    }
}

/// 按字符（而非字节）分段
fn split_chunks(body: &str, max_len: usize) -> Vec<String> {
    if body.chars().count() <= max_len {
        return vec![body.to_string()];
    }
    body.chars()
        .collect::<Vec<_>>()
        .chunks(max_len)
        .map(|c| c.iter().collect())
        .collect()
}
