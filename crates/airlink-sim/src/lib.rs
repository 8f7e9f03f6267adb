//! # AirLink Sim
//!
//! 进程内模拟器：在本地端口上应答车辆控制调用，用于测试和离线演示。
//!
//! 遵循的远端约定：
//!
//! - API 控制未开启时 `setCarControls` 被忽略（不返回错误）
//! - `reset` 恢复初始位姿、控制和遥测，不改变 API 控制开关
//! - 相机不存在时返回远端错误
//! - 没有对应缓冲区的图像为空，以 1 个元素的占位数据传输
//! - 每次 `getCarState` 推进一个固定物理步长
//!
//! # 示例
//!
//! ```rust,no_run
//! use airlink_sim::SimServer;
//!
//! let sim = SimServer::builder().start("127.0.0.1:0")?;
//! let port = sim.port();
//! # Ok::<(), airlink_rpc::RpcError>(())
//! ```

mod camera;
mod server;
mod vehicle;

pub use camera::CameraConfig;
pub use server::{SimHandle, SimServer, SimServerBuilder};
pub use vehicle::{PHYSICS_STEP, SimVehicle};
