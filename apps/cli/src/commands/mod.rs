//! 命令定义和实现
//!
//! 每个命令独立执行：合并配置 → 创建客户端 → 执行操作 → 客户端 drop 时断开。

pub mod car;
pub mod image;
pub mod serve;
pub mod vehicle;

pub use car::CarCommand;
pub use image::{ImageCommand, ImagesCommand};
pub use serve::ServeMockCommand;
pub use vehicle::{ApiCommand, PoseCommand};

use airlink_sdk::{CarClient, ClientBuilder, EndpointConfig, VehicleClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 创建通用车辆客户端
pub fn connect_vehicle(endpoint: &EndpointConfig) -> Result<VehicleClient> {
    ClientBuilder::new()
        .endpoint(endpoint.clone())
        .build_vehicle()
        .with_context(|| format!("无法创建到 {} 的客户端", endpoint))
}

/// 创建小车客户端
pub fn connect_car(endpoint: &EndpointConfig) -> Result<CarClient> {
    ClientBuilder::new()
        .endpoint(endpoint.clone())
        .build_car()
        .with_context(|| format!("无法创建到 {} 的客户端", endpoint))
}

/// 安装 Ctrl-C 处理器，返回运行标志
pub fn install_ctrlc() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .context("无法设置 Ctrl-C 处理器")?;
    Ok(running)
}
