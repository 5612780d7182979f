//! 网关消息与发送结果

use async_trait::async_trait;
use tokio::sync::RwLock;

/// 归一化后的入站消息（两种 Webhook 格式都转换成它）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// 发送者标识（电话号码）
    pub identity: String,
    /// 发送者昵称
    pub name: Option<String>,
    pub body: String,
}

/// 出站发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(String),
}

/// 出站发送接口
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// 向 `to` 发送文本；不重试
    async fn send(&self, to: &str, body: &str) -> Delivery;
}

/// 不走网络、只记录发送内容的网关（本地调试与测试用）
#[derive(Default)]
pub struct RecordingGateway {
    sent: RwLock<Vec<(String, String)>>,
    fail_with: Option<String>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次发送都返回 `Failed(reason)`，不记录
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// 已发送的 (to, body)，按发送顺序
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl MessageGateway for RecordingGateway {
    async fn send(&self, to: &str, body: &str) -> Delivery {
        if let Some(reason) = &self.fail_with {
            return Delivery::Failed(reason.clone());
        }
        tracing::info!("Recorded outbound message to {} ({} chars)", to, body.chars().count());
        self.sent.write().await.push((to.to_string(), body.to_string()));
        Delivery::Delivered
    }
}
