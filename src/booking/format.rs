//! 回复文本
//!
//! 预约列表渲染是纯函数；FAQ 类静态文本由 [`Replies`] 根据商家配置生成。

use crate::config::BusinessSection;

use super::ledger::Booking;

/// 预约列表：每行 `"{n}. {date} at {time} — {service} ({name})"`，保持输入顺序
pub fn format_bookings(bookings: &[Booking]) -> String {
    bookings
        .iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                "{}. {} at {} — {} ({})",
                i + 1,
                b.date,
                b.time,
                b.service,
                b.display_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 预约成功确认
pub fn confirmation(booking: &Booking) -> String {
    format!(
        "✅ Booking confirmed!\n\nDate: {}\nTime: {}\nService: {}\nName: {}\n\nReply \"my bookings\" to see all your bookings.",
        booking.date,
        booking.time,
        booking.service,
        booking.display_name()
    )
}

pub const DATE_PROMPT: &str = "📅 Great! Which date would you like? (format: YYYY-MM-DD)";
pub const TIME_PROMPT: &str = "⏰ What time works for you? (e.g. 10:30)";
pub const NO_BOOKINGS: &str = "You have no bookings yet. Reply \"book\" to make one.";

/// 依赖商家信息的回复
#[derive(Debug, Clone)]
pub struct Replies {
    business: BusinessSection,
}

impl Replies {
    pub fn new(business: BusinessSection) -> Self {
        Self { business }
    }

    pub fn menu(&self) -> String {
        format!(
            "👋 Welcome to {}!\n\n\
             Reply with:\n\
             • book — make a booking\n\
             • my bookings — see your bookings\n\
             • prices — services and packages\n\
             • location — how to find us\n\
             • hours — opening hours\n\
             • payment — payment options\n\
             • change — edit or cancel a booking",
            self.business.name
        )
    }

    pub fn my_bookings(&self, bookings: &[Booking]) -> String {
        if bookings.is_empty() {
            NO_BOOKINGS.to_string()
        } else {
            format!("📋 Your bookings:\n{}", format_bookings(bookings))
        }
    }

    pub fn prices(&self) -> String {
        format!("💰 Prices:\n{}", self.price_lines())
    }

    /// 询问服务项目，同时列出价目
    pub fn service_prompt(&self) -> String {
        format!(
            "💼 Which service or package would you like?\n{}",
            self.price_lines()
        )
    }

    pub fn location(&self) -> String {
        format!("📍 {} is at {}.", self.business.name, self.business.address)
    }

    pub fn hours(&self) -> String {
        format!("🕘 Opening hours: {}", self.business.hours)
    }

    pub fn edits(&self) -> String {
        "✏️ To change or cancel a booking, reply with the booking details and our team will \
         follow up. You can also make a new booking with \"book\"."
            .to_string()
    }

    pub fn payment(&self) -> String {
        format!("💳 {}", self.business.payment)
    }

    pub fn fallback(&self) -> String {
        "🤔 Sorry, I didn't get that. Reply \"menu\" to see what I can do, or \"book\" to make a booking."
            .to_string()
    }

    fn price_lines(&self) -> String {
        self.business
            .prices
            .iter()
            .map(|p| format!("• {}", p))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
