//! 外部集成：WhatsApp Cloud API 与 Twilio WhatsApp Webhook（需公网 Webhook 域名）

pub mod twilio;
pub mod whatsapp;
