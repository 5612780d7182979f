//! 每日日程：按日期筛选账本并推送给运营者
//!
//! 日期按字符串精确比较，不做日历解析；"2025-1-1" 之类的格式不会匹配 "2025-01-01"。

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use super::format::format_bookings;
use super::ledger::BookingLedger;
use crate::core::BookingError;
use crate::gateway::{Delivery, MessageGateway};

pub struct AgendaReporter {
    ledger: Arc<dyn BookingLedger>,
    gateway: Arc<dyn MessageGateway>,
    operator: Option<String>,
    utc_offset_minutes: i32,
}

impl AgendaReporter {
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        gateway: Arc<dyn MessageGateway>,
        operator: Option<String>,
        utc_offset_minutes: i32,
    ) -> Self {
        Self {
            ledger,
            gateway,
            operator: operator.filter(|o| !o.trim().is_empty()),
            utc_offset_minutes,
        }
    }

    /// 当前时区下今天的日期（YYYY-MM-DD）
    pub fn today(&self) -> String {
        let offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!("Invalid utc_offset_minutes {}, using UTC", self.utc_offset_minutes);
                Utc.fix()
            });
        Utc::now().with_timezone(&offset).format("%Y-%m-%d").to_string()
    }

    /// 渲染某日日程
    pub async fn agenda_for(&self, date: &str) -> String {
        let bookings = self.ledger.on_date(date).await;
        if bookings.is_empty() {
            format!("No bookings for {}.", date)
        } else {
            format!("📅 Agenda for {}:\n{}", date, format_bookings(&bookings))
        }
    }

    /// 把某日日程发给运营者；未配置运营者号码时返回错误
    pub async fn send_agenda(&self, date: &str) -> Result<Delivery, BookingError> {
        let operator = self.operator.as_deref().ok_or(BookingError::MissingOperator)?;
        let body = self.agenda_for(date).await;
        let delivery = self.gateway.send(operator, &body).await;
        match &delivery {
            Delivery::Delivered => tracing::info!("Agenda for {} sent to operator", date),
            Delivery::Failed(reason) => {
                tracing::error!("Failed to send agenda for {}: {}", date, reason)
            }
        }
        Ok(delivery)
    }
}
