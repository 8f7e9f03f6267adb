//! 运行模拟器（离线调试用）

use super::install_ctrlc;
use airlink_sdk::ImageType;
use airlink_sim::{CameraConfig, SimServer};
use anyhow::{Context, Result};
use clap::Args;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ServeMockCommand {
    /// 监听地址
    #[arg(short, long, default_value = "127.0.0.1:42451")]
    pub bind: String,

    /// 每次应答前的延迟（毫秒）
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

impl ServeMockCommand {
    pub fn execute(&self) -> Result<()> {
        let sim = SimServer::builder()
            .camera(CameraConfig::new(0, 256, 144).with_types(&[
                ImageType::Scene,
                ImageType::DepthPlanar,
                ImageType::Segmentation,
            ]))
            .camera(CameraConfig::new(1, 128, 72).with_types(&[ImageType::Scene]))
            .response_delay(Duration::from_millis(self.delay_ms))
            .start(self.bind.as_str())
            .with_context(|| format!("无法监听 {}", self.bind))?;

        let running = install_ctrlc()?;
        println!("🚗 模拟器运行于 {}，按 Ctrl-C 停止", sim.local_addr());

        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
        }

        println!("🛑 模拟器已停止");
        Ok(())
    }
}
