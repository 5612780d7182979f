//! 消息网关：入站消息归一化与出站发送
//!
//! 预约核心只依赖 [`MessageGateway`] 与 [`InboundMessage`]，不关心 Webhook 的具体格式与发送通道。

mod message;
mod whatsapp;

pub use message::{Delivery, InboundMessage, MessageGateway, RecordingGateway};
pub use whatsapp::WhatsappCloudGateway;
