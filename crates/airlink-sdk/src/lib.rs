//! AirLink SDK - 仿真车辆远程控制 Rust SDK
//!
//! 通过同步 RPC 控制运行在独立仿真进程中的车辆（旋翼或小车），并获取相机图像。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 领域类型与线缆适配器
//! - **传输层** (`rpc`): 帧格式、调用分发器、链路状态
//! - **客户端层** (`client`): 车辆控制门面与连接状态机
//! - **模拟器** (`sim`): 进程内模拟器，用于测试和离线演示
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use airlink_sdk::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), ClientError> {
//! airlink_sdk::init_logger();
//!
//! let car = CarClient::new("localhost", 42451, Duration::from_secs(60))?;
//! car.confirm_connection()?;
//! car.enable_api_control(true)?;
//!
//! let mut controls = CarControls::default();
//! controls.set_throttle(0.5, true);
//! car.set_car_controls(&controls)?;
//! # Ok(())
//! # }
//! ```

pub use airlink_client as client;
pub use airlink_protocol as protocol;
pub use airlink_rpc as rpc;
pub use airlink_sim as sim;

mod logging;
pub mod prelude;

pub use logging::init_logger;

// 客户端层（推荐入口）
pub use airlink_client::{
    CarClient, ClientBuilder, ClientError, ConnectionState, VehicleClient,
};

// 领域类型
pub use airlink_protocol::{
    CarControls, CarState, CollisionInfo, GeoPoint, ImageRequest, ImageResponse, ImageType, Pose,
    ProtocolError, Quaternionr, Vector3r,
};

// 传输层（高级用户使用）
pub use airlink_rpc::{EndpointConfig, RpcError};
