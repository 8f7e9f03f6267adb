//! # AirLink RPC
//!
//! 同步请求/响应传输层：帧格式、调用分发器和链路状态
//!
//! ## 模块
//!
//! - `frame`: 12 字节消息头 + 消息体的帧格式
//! - `client`: 调用分发器 [`RpcClient`]（单连接、单次调用超时、隐藏重连）
//! - `status`: 原子链路状态 [`LinkStatus`]
//! - `config`: 端点配置 [`EndpointConfig`]
//! - `server`: 远端调用宿主 [`RpcServer`]（供模拟器和测试使用）
//!
//! ## 示例
//!
//! ```rust,no_run
//! use airlink_rpc::{EndpointConfig, RpcClient};
//!
//! let client = RpcClient::new(EndpointConfig::default())?;
//! let alive: bool = client.call("ping", &())?;
//! # Ok::<(), airlink_rpc::RpcError>(())
//! ```

pub mod client;
pub mod config;
pub mod frame;
pub mod server;
pub mod status;

pub use client::RpcClient;
pub use config::EndpointConfig;
pub use frame::{FrameError, Message, MessageType};
pub use server::{RpcServer, ServerHandle};
pub use status::{AtomicLinkStatus, LinkStatus};

use thiserror::Error;

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum RpcError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 无法建立连接
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// 调用超时（连接已被丢弃）
    #[error("Call '{method}' timed out after {timeout_ms} ms")]
    Timeout { method: String, timeout_ms: u64 },

    /// 对端关闭连接
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// 远端返回错误
    #[error("Remote fault in '{method}': {message}")]
    Remote { method: String, message: String },

    /// 参数或返回值编解码失败
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 帧格式错误
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// 端点配置无效
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// 服务端监听失败
    #[error("Failed to bind server socket: {0}")]
    Bind(#[source] std::io::Error),
}

impl RpcError {
    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        match self {
            RpcError::Timeout { .. } => true,
            RpcError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// 是否为对端重置连接
    pub fn is_reset(&self) -> bool {
        match self {
            RpcError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// 该错误之后连接是否已不可用（帧边界可能失步）
    pub fn breaks_stream(&self) -> bool {
        matches!(
            self,
            RpcError::Io(_) | RpcError::Timeout { .. } | RpcError::ConnectionClosed | RpcError::Frame(_)
        )
    }
}
