//! 预约账本：只追加，插入顺序即到达顺序

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// 已确认的预约（创建后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// 客户标识（WhatsApp 号码）
    pub client: String,
    /// 客户昵称（WhatsApp profile name）
    pub name: Option<String>,
    /// 期望为 YYYY-MM-DD，但不做校验
    pub date: String,
    pub time: String,
    pub service: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        client: impl Into<String>,
        name: Option<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        service: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client: client.into(),
            name,
            date: date.into(),
            time: time.into(),
            service: service.into(),
            created_at,
        }
    }

    /// 展示用名称：有昵称用昵称，否则用号码
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.client)
    }
}

/// 账本接口
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn append(&self, booking: Booking);

    /// 某客户的全部预约（插入顺序）
    async fn for_client(&self, client: &str) -> Vec<Booking>;

    /// 日期字段与 `date` 完全相等的预约（字符串比较，插入顺序）
    async fn on_date(&self, date: &str) -> Vec<Booking>;

    async fn len(&self) -> usize;
}

/// 内存账本
#[derive(Default)]
pub struct MemoryLedger {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, pred: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .filter(|b| pred(b))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingLedger for MemoryLedger {
    async fn append(&self, booking: Booking) {
        self.bookings.write().await.push(booking);
    }

    async fn for_client(&self, client: &str) -> Vec<Booking> {
        self.filtered(|b| b.client == client).await
    }

    async fn on_date(&self, date: &str) -> Vec<Booking> {
        self.filtered(|b| b.date == date).await
    }

    async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }
}
