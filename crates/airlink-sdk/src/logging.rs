//! 日志初始化

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 安装全局 tracing 订阅者
///
/// - 默认级别 `info`，可通过 `RUST_LOG` 覆盖
/// - 同时将 `log` 记录桥接到 tracing
/// - 多次调用无副作用；已有其他全局订阅者时保持不变
pub fn init_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        let _ = tracing_log::LogTracer::init();
    });
}
