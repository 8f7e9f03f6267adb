//! 客户端错误类型
//!
//! 区分三类失败：传输/超时、远端错误、编解码不匹配（致命，不应重试）。
//! 已知的空图像缺陷在适配层静默处理，不会出现在这里。
//!
//! # 示例
//!
//! ```rust
//! use airlink_client::ClientError;
//!
//! fn handle_error(err: ClientError) {
//!     if err.is_fatal() {
//!         eprintln!("协议不匹配: {}", err);
//!     } else if err.is_timeout() {
//!         eprintln!("调用超时: {}", err);
//!     } else if err.is_remote_fault() {
//!         eprintln!("远端拒绝: {}", err);
//!     }
//! }
//! ```

use airlink_rpc::RpcError;
use thiserror::Error;

/// 客户端 Result 别名
pub type Result<T> = std::result::Result<T, ClientError>;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ClientError {
    /// 传输层错误（超时、断连、远端 Fault、编解码）
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// 构造参数无效
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 有界等待连接超时
    #[error("Connection not established within {waited_ms}ms")]
    ConnectionTimeout {
        /// 实际等待时间（毫秒）
        waited_ms: u64,
    },
}

impl ClientError {
    /// 是否为超时（调用超时或等待连接超时）
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Rpc(e) => e.is_timeout(),
            ClientError::ConnectionTimeout { .. } => true,
            ClientError::InvalidConfig(_) => false,
        }
    }

    /// 是否为远端返回的错误
    pub fn is_remote_fault(&self) -> bool {
        matches!(self, ClientError::Rpc(RpcError::Remote { .. }))
    }

    /// 远端错误信息
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ClientError::Rpc(RpcError::Remote { message, .. }) => Some(message),
            _ => None,
        }
    }

    /// 是否为致命错误（编解码不匹配或配置错误，重试无意义）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Rpc(RpcError::Serialization(_))
                | ClientError::Rpc(RpcError::Frame(_))
                | ClientError::InvalidConfig(_)
        )
    }
}
