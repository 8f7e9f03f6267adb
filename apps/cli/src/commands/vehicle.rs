//! 通用车辆命令：连接检查、API 控制、位姿、reset、home

use super::connect_vehicle;
use crate::validation::OutputFormat;
use airlink_sdk::{EndpointConfig, Pose, Quaternionr, Vector3r};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;
use std::time::{Duration, Instant};

/// 探测仿真器是否响应
pub fn ping(endpoint: &EndpointConfig) -> Result<()> {
    let client = connect_vehicle(endpoint)?;
    let started = Instant::now();
    client
        .ping()
        .with_context(|| format!("ping {} 失败", endpoint))?;
    println!("pong from {} ({:.1} ms)", endpoint, started.elapsed().as_secs_f64() * 1e3);
    Ok(())
}

/// 打印连接状态（不会失败）
pub fn status(endpoint: &EndpointConfig) -> Result<()> {
    let client = connect_vehicle(endpoint)?;
    println!("{}: {}", endpoint, client.connection_state());
    Ok(())
}

/// 等待连接建立
pub fn wait(endpoint: &EndpointConfig, timeout_secs: Option<u64>) -> Result<()> {
    let client = connect_vehicle(endpoint)?;
    match timeout_secs {
        Some(secs) => client.confirm_connection_timeout(Duration::from_secs(secs))?,
        None => client.confirm_connection()?,
    }
    Ok(())
}

pub fn reset(endpoint: &EndpointConfig) -> Result<()> {
    connect_vehicle(endpoint)?.reset().context("reset 失败")?;
    println!("✅ 车辆已重置");
    Ok(())
}

pub fn home(endpoint: &EndpointConfig, format: OutputFormat) -> Result<()> {
    let home = connect_vehicle(endpoint)?.home_geo_point()?;
    match format {
        OutputFormat::Table => println!("{}", home),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "latitude": home.latitude,
                "longitude": home.longitude,
                "altitude": home.altitude,
            })
        ),
    }
    Ok(())
}

/// API 控制命令
#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    /// 开启 API 控制
    Enable,
    /// 关闭 API 控制
    Disable,
    /// 查询 API 控制开关
    Status,
}

impl ApiCommand {
    pub fn execute(self, endpoint: &EndpointConfig) -> Result<()> {
        let client = connect_vehicle(endpoint)?;
        match self {
            ApiCommand::Enable => {
                client.enable_api_control(true)?;
                println!("✅ API 控制已开启");
            },
            ApiCommand::Disable => {
                client.enable_api_control(false)?;
                println!("✅ API 控制已关闭");
            },
            ApiCommand::Status => {
                let enabled = client.is_api_control_enabled()?;
                println!("{}", if enabled { "enabled" } else { "disabled" });
            },
        }
        Ok(())
    }
}

/// 位姿命令
#[derive(Subcommand, Debug)]
pub enum PoseCommand {
    /// 读取当前位姿
    Get {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 直接放置车辆
    Set(PoseSetArgs),
}

#[derive(Args, Debug)]
pub struct PoseSetArgs {
    /// 位置 x,y,z（米）
    #[arg(short, long, allow_hyphen_values = true)]
    pub position: Vector3r,

    /// 姿态 w,x,y,z（默认单位四元数）
    #[arg(short, long, allow_hyphen_values = true)]
    pub orientation: Option<Quaternionr>,

    /// 放置时忽略碰撞
    #[arg(long)]
    pub ignore_collision: bool,
}

impl PoseCommand {
    pub fn execute(self, endpoint: &EndpointConfig) -> Result<()> {
        let client = connect_vehicle(endpoint)?;
        match self {
            PoseCommand::Get { format } => {
                let pose = client.sim_get_pose()?;
                print_pose(&pose, format);
            },
            PoseCommand::Set(args) => {
                let orientation = args.orientation.unwrap_or(Quaternionr::IDENTITY);
                if !orientation.is_unit(1e-3) {
                    tracing::warn!("Orientation {} is not a unit quaternion", orientation);
                }
                let pose = Pose::new(args.position, orientation);
                client.sim_set_pose(&pose, args.ignore_collision)?;
                println!("✅ 位姿已设置: {}", pose);
            },
        }
        Ok(())
    }
}

fn print_pose(pose: &Pose, format: OutputFormat) {
    let (p, q) = (pose.position, pose.orientation);
    match format {
        OutputFormat::Table => {
            println!("📍 位置:  x={:.3} y={:.3} z={:.3}", p.x, p.y, p.z);
            println!("🧭 姿态:  w={:.4} x={:.4} y={:.4} z={:.4}", q.w, q.x, q.y, q.z);
        },
        OutputFormat::Json => println!(
            "{}",
            json!({
                "position": { "x": p.x, "y": p.y, "z": p.z },
                "orientation": { "w": q.w, "x": q.x, "y": q.y, "z": q.z },
            })
        ),
    }
}
