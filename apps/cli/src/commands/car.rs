//! 小车命令：驾驶、遥测、监控

use super::{connect_car, install_ctrlc};
use crate::validation::{OutputFormat, build_controls};
use airlink_sdk::{CarState, EndpointConfig};
use anyhow::Result;
use clap::Subcommand;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

/// 小车命令
#[derive(Subcommand, Debug)]
pub enum CarCommand {
    /// 发送一次控制指令（会先开启 API 控制）
    #[command(allow_negative_numbers = true)]
    Drive {
        /// 油门 [0, 1]
        #[arg(long, default_value_t = 0.0)]
        throttle: f32,

        /// 转向 [-1, 1]
        #[arg(long, default_value_t = 0.0)]
        steering: f32,

        /// 刹车 [0, 1]
        #[arg(long, default_value_t = 0.0)]
        brake: f32,

        /// 拉手刹
        #[arg(long)]
        handbrake: bool,

        /// 倒车
        #[arg(long)]
        reverse: bool,

        /// 手动挡位
        #[arg(long)]
        gear: Option<i32>,
    },

    /// 读取一次遥测
    State {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 持续打印遥测，Ctrl-C 停止
    Monitor {
        /// 更新频率（Hz）
        #[arg(short, long, default_value_t = 10)]
        frequency: u32,

        /// 采样次数后退出（默认一直运行）
        #[arg(short, long)]
        samples: Option<u64>,
    },
}

impl CarCommand {
    pub fn execute(self, endpoint: &EndpointConfig) -> Result<()> {
        let car = connect_car(endpoint)?;
        match self {
            CarCommand::Drive {
                throttle,
                steering,
                brake,
                handbrake,
                reverse,
                gear,
            } => {
                let controls = build_controls(throttle, steering, brake, handbrake, reverse, gear)?;
                car.enable_api_control(true)?;
                car.set_car_controls(&controls)?;
                println!(
                    "✅ 已发送: throttle={:.2} steering={:.2} brake={:.2} handbrake={} gear={}",
                    controls.throttle,
                    controls.steering,
                    controls.brake,
                    controls.handbrake,
                    controls.manual_gear
                );
                Ok(())
            },

            CarCommand::State { format } => {
                let state = car.car_state()?;
                print_state(&state, format);
                Ok(())
            },

            CarCommand::Monitor { frequency, samples } => {
                if frequency == 0 {
                    anyhow::bail!("frequency must be positive");
                }
                let period = Duration::from_secs_f64(1.0 / frequency as f64);
                let running = install_ctrlc()?;

                println!("📊 监控中（{} Hz），按 Ctrl-C 停止", frequency);
                let mut taken = 0u64;
                while running.load(Ordering::SeqCst) {
                    if samples.is_some_and(|limit| taken >= limit) {
                        break;
                    }
                    let state = car.car_state()?;
                    println!(
                        "t={:>8.2}s speed={:>6.2} m/s gear={:>2} pos=({:.2}, {:.2}, {:.2}){}",
                        state.timestamp as f64 / 1e9,
                        state.speed,
                        state.gear,
                        state.position.x,
                        state.position.y,
                        state.position.z,
                        if state.collision.has_collided { " 💥" } else { "" }
                    );
                    taken += 1;
                    thread::sleep(period);
                }
                println!("🛑 已停止（{} 次采样）", taken);
                Ok(())
            },
        }
    }
}

fn print_state(state: &CarState, format: OutputFormat) {
    let c = &state.collision;
    match format {
        OutputFormat::Table => {
            println!("速度:   {:.3} m/s", state.speed);
            println!("挡位:   {}", state.gear);
            println!("位置:   {}", state.position);
            println!("速度矢量: {}", state.velocity);
            println!("姿态:   {}", state.orientation);
            println!("时间戳: {} ns", state.timestamp);
            if c.has_collided {
                println!(
                    "碰撞:   {} (id {}) depth={:.3}",
                    c.object_name, c.object_id, c.penetration_depth
                );
            } else {
                println!("碰撞:   无");
            }
        },
        OutputFormat::Json => println!(
            "{}",
            json!({
                "speed": state.speed,
                "gear": state.gear,
                "position": [state.position.x, state.position.y, state.position.z],
                "velocity": [state.velocity.x, state.velocity.y, state.velocity.z],
                "orientation": [
                    state.orientation.w,
                    state.orientation.x,
                    state.orientation.y,
                    state.orientation.z
                ],
                "timestamp": state.timestamp,
                "collision": {
                    "has_collided": c.has_collided,
                    "object_name": c.object_name,
                    "object_id": c.object_id,
                    "penetration_depth": c.penetration_depth,
                },
            })
        ),
    }
}
