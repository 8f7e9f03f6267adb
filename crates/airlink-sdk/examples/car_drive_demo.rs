//! 小车驾驶演示 - 加速、转向、刹停
//!
//! 默认在进程内启动模拟器；设置 `AIRLINK_PORT` 后连接到已有的仿真器。
//!
//! # 运行
//!
//! ```bash
//! cargo run --example car_drive_demo
//! AIRLINK_PORT=42451 cargo run --example car_drive_demo
//! ```

use airlink_sdk::prelude::*;
use airlink_sdk::sim::SimServer;
use anyhow::Context;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    airlink_sdk::init_logger();

    println!("🚗 AirLink SDK - Car Drive Demo");
    println!("===============================\n");

    // 1. 连接（必要时启动进程内模拟器）
    let external_port = std::env::var("AIRLINK_PORT").ok().and_then(|p| p.parse::<u16>().ok());
    let sim = match external_port {
        Some(_) => None,
        None => Some(SimServer::builder().start("127.0.0.1:0").context("start mock simulator")?),
    };
    let port = external_port
        .or_else(|| sim.as_ref().map(|s| s.port()))
        .context("no simulator port")?;

    let car = ClientBuilder::new()
        .host("127.0.0.1")
        .port(port)
        .timeout(Duration::from_secs(5))
        .build_car()?;
    car.confirm_connection()?;
    car.enable_api_control(true)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
        .context("install Ctrl-C handler")?;

    // 2. 加速并右转
    println!("▶️  加速...");
    let mut controls = CarControls::default();
    controls.set_throttle(0.6, true);
    controls.steering = 0.2;
    car.set_car_controls(&controls)?;

    for _ in 0..20 {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let state = car.car_state()?;
        println!(
            "   speed={:6.2} m/s  gear={:2}  pos={}",
            state.speed, state.gear, state.position
        );
        thread::sleep(Duration::from_millis(50));
    }

    // 3. 刹停
    println!("\n⏹  刹车...");
    car.set_car_controls(&CarControls {
        brake: 1.0,
        ..Default::default()
    })?;
    loop {
        let state = car.car_state()?;
        if state.speed == 0.0 || !running.load(Ordering::SeqCst) {
            println!("   停止于 {}", state.position);
            break;
        }
    }

    car.enable_api_control(false)?;
    println!("\n✅ 完成");
    Ok(())
}
