//! 配置管理
//!
//! 配置文件位于 `<config_dir>/airlink/config.toml`，可用全局 `--config` 覆盖路径。
//! 优先级：命令行参数 > 配置文件 > 内置默认值。

use airlink_client::EndpointConfig;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("airlink");
    path.push("config.toml");
    Ok(path)
}

/// 配置文件中的端点段（所有字段可选）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub endpoint: EndpointSection,
}

/// 未知配置项
#[derive(Debug, Error)]
#[error("unknown config key '{0}' (expected one of: host, port, timeout_ms, connect_timeout_ms)")]
pub struct UnknownKey(pub String);

impl CliConfig {
    /// 加载配置（文件不存在时返回默认配置）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("创建配置目录失败")?;
        }

        let body = toml::to_string_pretty(self).context("序列化配置失败")?;
        let content = format!("# AirLink CLI Configuration\n\n{}", body);
        fs::write(path, content).context("写入配置文件失败")?;
        Ok(())
    }

    /// 读取单个配置项（未设置为 `None`）
    pub fn get(&self, key: &str) -> Result<Option<String>, UnknownKey> {
        let e = &self.endpoint;
        Ok(match key {
            "host" => e.host.clone(),
            "port" => e.port.map(|v| v.to_string()),
            "timeout_ms" => e.timeout_ms.map(|v| v.to_string()),
            "connect_timeout_ms" => e.connect_timeout_ms.map(|v| v.to_string()),
            other => return Err(UnknownKey(other.to_string())),
        })
    }

    /// 与内置默认值合并后的端点
    pub fn effective(&self) -> EndpointConfig {
        EndpointArgs::default().resolve(self)
    }
}

/// 全局端点参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// 仿真器主机
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// 仿真器端口
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// 单次调用超时（毫秒）
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// 连接超时（毫秒）
    #[arg(long, global = true)]
    pub connect_timeout_ms: Option<u64>,
}

impl EndpointArgs {
    /// 按 参数 > 配置文件 > 默认值 合并
    pub fn resolve(&self, config: &CliConfig) -> EndpointConfig {
        let defaults = EndpointConfig::default();
        let file = &config.endpoint;
        EndpointConfig {
            host: self
                .host
                .clone()
                .or_else(|| file.host.clone())
                .unwrap_or(defaults.host),
            port: self.port.or(file.port).unwrap_or(defaults.port),
            timeout_ms: self
                .timeout_ms
                .or(file.timeout_ms)
                .unwrap_or(defaults.timeout_ms),
            connect_timeout_ms: self
                .connect_timeout_ms
                .or(file.connect_timeout_ms)
                .unwrap_or(defaults.connect_timeout_ms),
        }
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 默认主机
        #[arg(long)]
        default_host: Option<String>,

        /// 默认端口
        #[arg(long)]
        default_port: Option<u16>,

        /// 默认调用超时（毫秒）
        #[arg(long)]
        default_timeout_ms: Option<u64>,

        /// 默认连接超时（毫秒）
        #[arg(long)]
        default_connect_timeout_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置（打印合并后的端点）
    Check,

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Set {
                default_host,
                default_port,
                default_timeout_ms,
                default_connect_timeout_ms,
            } => {
                let mut config = CliConfig::load(path)?;
                let e = &mut config.endpoint;

                if let Some(host) = default_host {
                    println!("✅ 设置默认主机: {}", host);
                    e.host = Some(host);
                }
                if let Some(port) = default_port {
                    println!("✅ 设置默认端口: {}", port);
                    e.port = Some(port);
                }
                if let Some(ms) = default_timeout_ms {
                    println!("✅ 设置调用超时: {} ms", ms);
                    e.timeout_ms = Some(ms);
                }
                if let Some(ms) = default_connect_timeout_ms {
                    println!("✅ 设置连接超时: {} ms", ms);
                    e.connect_timeout_ms = Some(ms);
                }

                config.effective().validate().context("配置无效")?;
                config.save(path)
            },

            ConfigCommand::Get { key } => {
                let config = CliConfig::load(path)?;
                if key == "all" {
                    print!("{}", toml::to_string_pretty(&config)?);
                    return Ok(());
                }
                match config.get(&key)? {
                    Some(value) => println!("{}", value),
                    None => println!("(未设置)"),
                }
                Ok(())
            },

            ConfigCommand::Check => {
                let config = CliConfig::load(path)?;
                let effective = config.effective();

                println!("配置文件: {}", path.display());
                println!("  端点: {}", effective);
                println!("  调用超时: {} ms", effective.timeout_ms);
                println!("  连接超时: {} ms", effective.connect_timeout_ms);
                effective.validate().context("配置无效")?;
                println!("✅ 配置有效");
                Ok(())
            },

            ConfigCommand::Path => {
                println!("{}", path.display());
                Ok(())
            },
        }
    }
}
