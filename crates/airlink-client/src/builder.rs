//! Client Builder
//!
//! 提供链式 API 创建 [`VehicleClient`] / [`CarClient`]。

use crate::car::CarClient;
use crate::connection::DEFAULT_POLL_INTERVAL;
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::vehicle::VehicleClient;
use airlink_rpc::{EndpointConfig, RpcClient, RpcError};
use std::time::Duration;
use tracing::{info, warn};

/// Client Builder
///
/// # 示例
///
/// ```rust,no_run
/// use airlink_client::ClientBuilder;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), airlink_client::ClientError> {
/// // 默认端点 localhost:42451
/// let client = ClientBuilder::new().build_vehicle()?;
///
/// // 完整配置
/// let car = ClientBuilder::new()
///     .host("192.168.1.20")
///     .port(41451)
///     .timeout(Duration::from_secs(10))
///     .connect_timeout(Duration::from_millis(500))
///     .build_car()?;
/// # Ok(())
/// # }
/// ```
///
/// 初次连接失败不会导致构造失败：之后的调用或状态查询会重新尝试连接。
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    endpoint: EndpointConfig,
    poll_interval: Duration,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置主机（默认: "localhost"）
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.endpoint.host = host.into();
        self
    }

    /// 设置端口（默认: 42451）
    pub fn port(mut self, port: u16) -> Self {
        self.endpoint.port = port;
        self
    }

    /// 设置单次调用超时（默认: 60 秒）
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 设置连接超时（默认: 2 秒）
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.connect_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 设置 `confirm_connection` 的轮询间隔（默认: 1 秒）
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 使用完整的端点配置
    pub fn endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// 构建通用车辆客户端
    pub fn build_vehicle(self) -> Result<VehicleClient> {
        Ok(VehicleClient::from_session(self.build_session()?))
    }

    /// 构建小车客户端
    pub fn build_car(self) -> Result<CarClient> {
        Ok(CarClient::from_session(self.build_session()?))
    }

    fn build_session(self) -> Result<Session> {
        if self.poll_interval.is_zero() {
            return Err(ClientError::InvalidConfig(
                "poll interval must be positive".to_string(),
            ));
        }

        let rpc = RpcClient::new(self.endpoint).map_err(|e| match e {
            RpcError::InvalidEndpoint(reason) => ClientError::InvalidConfig(reason),
            other => ClientError::Rpc(other),
        })?;

        match rpc.connect() {
            Ok(()) => info!("Client ready on {}", rpc.config()),
            Err(e) => warn!("Initial connection to {} failed: {}", rpc.config(), e),
        }

        Ok(Session::new(rpc, self.poll_interval))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new();
        assert_eq!(builder.endpoint.host, "localhost");
        assert_eq!(builder.endpoint.port, 42451);
        assert_eq!(builder.endpoint.timeout_ms, 60_000);
        assert_eq!(builder.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_chain() {
        let builder = ClientBuilder::new()
            .host("10.0.0.2")
            .port(41451)
            .timeout(Duration::from_millis(1500))
            .connect_timeout(Duration::from_millis(200))
            .poll_interval(Duration::from_millis(50));
        assert_eq!(builder.endpoint.host, "10.0.0.2");
        assert_eq!(builder.endpoint.port, 41451);
        assert_eq!(builder.endpoint.timeout_ms, 1500);
        assert_eq!(builder.endpoint.connect_timeout_ms, 200);
        assert_eq!(builder.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_builder_saturates_huge_timeouts() {
        let builder = ClientBuilder::new()
            .timeout(Duration::MAX)
            .connect_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(builder.endpoint.timeout_ms, u64::MAX);
        assert_eq!(builder.endpoint.connect_timeout_ms, u64::MAX);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        let err = ClientBuilder::new().host("").build_vehicle().unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));

        let err = ClientBuilder::new().port(0).build_car().unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));

        let err = ClientBuilder::new()
            .timeout(Duration::ZERO)
            .build_vehicle()
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));

        let err = ClientBuilder::new()
            .poll_interval(Duration::ZERO)
            .build_vehicle()
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
