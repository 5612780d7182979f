//! Bee Booking - WhatsApp 预约助手
//!
//! 模块划分：
//! - **booking**: 会话状态机、预约账本、回复文本、每日日程
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与优雅关闭
//! - **gateway**: 入站消息归一化与出站发送（WhatsApp Cloud API）
//! - **integrations**: WhatsApp / Twilio Webhook 处理器
//! - **observability**: 日志初始化
//! - **server**: axum 路由与运营者日程接口

pub mod booking;
pub mod config;
pub mod core;
pub mod gateway;
pub mod integrations;
pub mod observability;
pub mod server;
