//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use airlink_sdk::prelude::*;
//! ```

// 客户端层
pub use crate::client::{
    CarClient, ClientBuilder, ClientError, ConnectionState, VehicleClient,
};

// 领域类型
pub use crate::protocol::{
    CarControls, CarState, CollisionInfo, GeoPoint, ImageRequest, ImageResponse, ImageType, Pose,
    Quaternionr, Vector3r,
};

// 端点配置
pub use crate::rpc::EndpointConfig;
