//! 优雅关闭
//!
//! 收到 Ctrl+C 或 SIGTERM 后，axum 停止接收新连接并等待进行中的 Webhook 处理完成。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// 关闭信号：任一系统信号到达即触发，只触发一次
#[derive(Clone, Default)]
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发关闭；`signal` 只用于日志
    pub fn trigger(&self, signal: &str) {
        if !self.token.is_cancelled() {
            tracing::info!("Received {}, initiating graceful shutdown...", signal);
            self.token.cancel();
        }
    }

    /// 等待关闭信号（交给 `axum::serve(..).with_graceful_shutdown`）
    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }

    /// 安装系统信号处理器 (Ctrl+C, SIGTERM)
    pub fn install_signal_handlers(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                manager.trigger("Ctrl+C");
            }
        });

        #[cfg(unix)]
        {
            let manager = Arc::clone(self);
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                        manager.trigger("SIGTERM");
                    }
                    Err(e) => tracing::warn!("Failed to install SIGTERM handler: {}", e),
                }
            });
        }
    }
}
