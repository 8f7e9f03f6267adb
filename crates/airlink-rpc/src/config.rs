//! 端点配置

use crate::RpcError;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

/// 默认主机
pub const DEFAULT_HOST: &str = "localhost";
/// 默认端口
pub const DEFAULT_PORT: u16 = 42451;
/// 默认单次调用超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
/// 默认连接超时（毫秒）
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;

/// 远端端点配置
///
/// 构造后不可修改；调用超时对每次调用单独生效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    /// 单次调用超时（毫秒）
    pub timeout_ms: u64,
    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), RpcError> {
        if self.host.trim().is_empty() {
            return Err(RpcError::InvalidEndpoint("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(RpcError::InvalidEndpoint("port must not be 0".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(RpcError::InvalidEndpoint(
                "call timeout must be positive".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(RpcError::InvalidEndpoint(
                "connect timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// 解析为套接字地址（可能有多个）
    pub fn resolve(&self) -> Result<Vec<SocketAddr>, RpcError> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port).to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(RpcError::InvalidEndpoint(format!(
                "{}:{} did not resolve to any address",
                self.host, self.port
            )));
        }
        Ok(addrs)
    }
}

impl std::fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
