//! 预约服务错误类型
//!
//! 应用层错误在 Webhook 边界被记录并吞掉（始终回 200），只有运营者日程接口把错误显式返回给调用方。

use thiserror::Error;

/// 预约、日程推送与出站发送过程中可能出现的错误
#[derive(Error, Debug)]
pub enum BookingError {
    /// 未配置运营者号码时无法推送日程
    #[error("Operator identity is not configured (set agenda.operator_identity)")]
    MissingOperator,

    #[error("Config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for BookingError {
    fn from(err: config::ConfigError) -> Self {
        BookingError::Config(err.to_string())
    }
}
