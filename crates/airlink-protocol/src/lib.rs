//! # AirLink Protocol
//!
//! 仿真器远程控制协议的领域模型与线缆适配层（无传输依赖）
//!
//! ## 模块
//!
//! - `types`: 空间类型（向量、四元数、位姿、地理坐标、碰撞信息）
//! - `image`: 相机图像请求/响应
//! - `car`: 车辆控制指令与状态
//! - `adapters`: 领域类型 ↔ 线缆类型的双向适配器
//!
//! ## 在架构中的位置
//!
//! ```text
//! Facade (airlink-client)
//!     ↓ WireAdapter::from_domain() / to_domain()
//! Wire 类型 (此 crate 的 adapters 模块)
//!     ↓ bincode 编码
//! Call Dispatcher (airlink-rpc)
//! ```
//!
//! 只有 `adapters` 模块知道线缆表示；领域类型只有值语义。

pub mod adapters;
pub mod car;
pub mod image;
pub mod types;

// 重新导出常用类型
pub use adapters::*;
pub use car::{CarControls, CarState};
pub use image::{ImageRequest, ImageResponse, ImageType};
pub use types::{CollisionInfo, GeoPoint, Pose, Quaternionr, Vector3r};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 未知的图像类型编码
    #[error("Invalid image type code: {0}")]
    InvalidImageType(u8),

    /// 无法识别的图像类型名称
    #[error("Unknown image type name: {0}")]
    UnknownImageTypeName(String),

    /// 无效参数
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
