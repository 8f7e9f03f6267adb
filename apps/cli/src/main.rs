//! # AirLink CLI
//!
//! Command-line interface for AirLink simulator vehicles.
//!
//! 每个命令独立执行（连接 → 操作 → 断开），适合脚本和 CI。
//!
//! ```bash
//! # 配置默认端点
//! airlink-cli config set --default-host 192.168.1.20 --default-port 41451
//!
//! # 检查连接并读取位姿
//! airlink-cli wait --timeout-secs 30
//! airlink-cli pose get --format json
//!
//! # 驾驶小车
//! airlink-cli car drive --throttle 0.5 --steering -0.2
//! airlink-cli car monitor --frequency 5
//!
//! # 离线调试：本地模拟器
//! airlink-cli serve-mock --bind 127.0.0.1:42451
//! ```

use airlink_sdk::EndpointConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod validation;

use commands::{ApiCommand, CarCommand, ImageCommand, ImagesCommand, PoseCommand, ServeMockCommand};
use config::{CliConfig, ConfigCommand, EndpointArgs};
use validation::OutputFormat;

/// AirLink CLI - 仿真车辆命令行工具
#[derive(Parser, Debug)]
#[command(name = "airlink-cli")]
#[command(about = "Command-line interface for AirLink simulator vehicles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    endpoint: EndpointArgs,

    /// 配置文件路径（默认 <config_dir>/airlink/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 探测仿真器
    Ping,

    /// 查询连接状态
    Status,

    /// 等待连接建立
    Wait {
        /// 最长等待时间（秒），不指定时一直等待
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// API 控制开关
    #[command(subcommand)]
    Api(ApiCommand),

    /// 重置车辆
    Reset,

    /// 查询 home 地理坐标
    Home {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 读取或设置位姿
    #[command(subcommand)]
    Pose(PoseCommand),

    /// 获取单张图像
    Image(ImageCommand),

    /// 批量获取图像
    Images(ImagesCommand),

    /// 小车控制与遥测
    #[command(subcommand)]
    Car(CarCommand),

    /// 在本地运行模拟器
    ServeMock(ServeMockCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airlink_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_file()?,
    };

    let endpoint = || -> Result<EndpointConfig> {
        let endpoint = cli.endpoint.resolve(&CliConfig::load(&config_path)?);
        tracing::debug!("Using endpoint {}", endpoint);
        Ok(endpoint)
    };

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&config_path),

        Commands::Ping => commands::vehicle::ping(&endpoint()?),

        Commands::Status => commands::vehicle::status(&endpoint()?),

        Commands::Wait { timeout_secs } => commands::vehicle::wait(&endpoint()?, timeout_secs),

        Commands::Api(cmd) => cmd.execute(&endpoint()?),

        Commands::Reset => commands::vehicle::reset(&endpoint()?),

        Commands::Home { format } => commands::vehicle::home(&endpoint()?, format),

        Commands::Pose(cmd) => cmd.execute(&endpoint()?),

        Commands::Image(cmd) => cmd.execute(&endpoint()?),

        Commands::Images(cmd) => cmd.execute(&endpoint()?),

        Commands::Car(cmd) => cmd.execute(&endpoint()?),

        Commands::ServeMock(cmd) => cmd.execute(),
    }
}
