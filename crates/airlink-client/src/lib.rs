//! # AirLink Client
//!
//! 车辆控制门面：通用车辆客户端 [`VehicleClient`] 与小车客户端 [`CarClient`]
//!
//! ## 模块
//!
//! - `builder`: 链式构造
//! - `connection`: 连接状态机（`ConnectionState`、等待连接）
//! - `vehicle` / `car`: 门面，只暴露固定的车辆控制操作
//! - `error`: 错误类型与分类
//!
//! 门面持有唯一的连接句柄；底层 `RpcClient` 不对外暴露。
//! 客户端被 drop 时连接随之关闭。

mod builder;
mod car;
mod connection;
mod error;
mod session;
mod vehicle;

pub use builder::ClientBuilder;
pub use car::CarClient;
pub use connection::{ConnectionState, DEFAULT_POLL_INTERVAL};
pub use error::{ClientError, Result};
pub use vehicle::VehicleClient;

// 领域类型
pub use airlink_protocol::{
    CarControls, CarState, CollisionInfo, GeoPoint, ImageRequest, ImageResponse, ImageType, Pose,
    Quaternionr, Vector3r,
};
pub use airlink_rpc::EndpointConfig;
