//! 模拟器服务端
//!
//! 把 [`SimVehicle`] 的操作注册为远端调用，按线缆类型收发。

use crate::camera::CameraConfig;
use crate::vehicle::SimVehicle;
use airlink_protocol::{
    GeoPoint, ImageType, Pose, WireAdapter, WireCarControls, WireCarState, WireGeoPoint,
    WireImageRequest, WireImageResponse, WirePose, from_domain_seq, pad_empty_placeholder,
    to_domain_seq,
};
use airlink_rpc::{RpcError, RpcServer, ServerHandle};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// 模拟器入口
pub struct SimServer;

impl SimServer {
    pub fn builder() -> SimServerBuilder {
        SimServerBuilder::default()
    }
}

/// 模拟器配置
///
/// # 示例
///
/// ```rust,no_run
/// use airlink_sim::{CameraConfig, SimServer};
/// use airlink_protocol::ImageType;
///
/// let sim = SimServer::builder()
///     .camera(CameraConfig::new(0, 256, 144).with_types(&[ImageType::Scene, ImageType::DepthPlanar]))
///     .start("127.0.0.1:0")?;
/// println!("mock simulator on {}", sim.local_addr());
/// # Ok::<(), airlink_rpc::RpcError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SimServerBuilder {
    cameras: Vec<CameraConfig>,
    home: GeoPoint,
    initial_pose: Pose,
    response_delay: Duration,
}

impl Default for SimServerBuilder {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            home: GeoPoint::new(47.641468, -122.140165, 122.0),
            initial_pose: Pose::IDENTITY,
            response_delay: Duration::ZERO,
        }
    }
}

impl SimServerBuilder {
    /// 添加相机（未添加任何相机时使用 0 号 640x480 场景相机）
    pub fn camera(mut self, camera: CameraConfig) -> Self {
        self.cameras.retain(|c| c.id != camera.id);
        self.cameras.push(camera);
        self
    }

    /// 设置 home 地理坐标
    pub fn home(mut self, home: GeoPoint) -> Self {
        self.home = home;
        self
    }

    /// 设置初始位姿（reset 时恢复到该位姿）
    pub fn initial_pose(mut self, pose: Pose) -> Self {
        self.initial_pose = pose;
        self
    }

    /// 每次应答前的延迟（用于测试超时）
    pub fn response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// 在后台开始服务
    pub fn start(self, addr: impl ToSocketAddrs) -> Result<SimHandle, RpcError> {
        let mut cameras = self.cameras;
        if cameras.is_empty() {
            cameras.push(CameraConfig::new(0, 640, 480));
        }
        let vehicle = Arc::new(SimVehicle::new(cameras, self.home, self.initial_pose));

        let mut server = RpcServer::new();
        register(&mut server, vehicle.clone(), self.response_delay);
        let handle = server.serve(addr)?;
        info!("Mock simulator listening on {}", handle.local_addr());

        Ok(SimHandle { handle, vehicle })
    }
}

/// 运行中的模拟器
///
/// 被 drop 时停止服务并关闭所有连接。
pub struct SimHandle {
    handle: ServerHandle,
    vehicle: Arc<SimVehicle>,
}

impl SimHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.handle.local_addr()
    }

    pub fn port(&self) -> u16 {
        self.handle.local_addr().port()
    }

    /// 模拟车辆（用于检查远端状态）
    pub fn vehicle(&self) -> &SimVehicle {
        &self.vehicle
    }

    /// 当前客户端连接数
    pub fn connection_count(&self) -> usize {
        self.handle.connection_count()
    }

    /// 断开所有客户端（服务继续运行）
    pub fn close_connections(&self) {
        self.handle.close_connections();
    }

    pub fn shutdown(&mut self) {
        self.handle.shutdown();
    }
}

fn register(server: &mut RpcServer, vehicle: Arc<SimVehicle>, delay: Duration) {
    let pause = move || {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    };

    server.bind("ping", move |(): ()| {
        pause();
        Ok(true)
    });

    let v = vehicle.clone();
    server.bind("enableApiControl", move |(enabled,): (bool,)| {
        pause();
        v.set_api_control(enabled);
        Ok(())
    });

    let v = vehicle.clone();
    server.bind("isApiControlEnabled", move |(): ()| {
        pause();
        Ok(v.is_api_control_enabled())
    });

    let v = vehicle.clone();
    server.bind("reset", move |(): ()| {
        pause();
        v.reset();
        Ok(())
    });

    let v = vehicle.clone();
    server.bind(
        "simSetPose",
        move |(pose, ignore_collision): (WirePose, bool)| {
            pause();
            v.set_pose(pose.to_domain(), ignore_collision);
            Ok(())
        },
    );

    let v = vehicle.clone();
    server.bind("simGetPose", move |(): ()| {
        pause();
        Ok(WirePose::from_domain(&v.pose()))
    });

    let v = vehicle.clone();
    server.bind("simGetImages", move |(requests,): (Vec<WireImageRequest>,)| {
        pause();
        let responses = v.capture(&to_domain_seq(&requests))?;
        Ok(from_domain_seq::<WireImageResponse>(&responses))
    });

    let v = vehicle.clone();
    server.bind(
        "simGetImage",
        move |(camera_id, image_type): (i32, ImageType)| {
            pause();
            // 空图像以 1 字节占位传输
            Ok(pad_empty_placeholder(v.single_image(camera_id, image_type)?))
        },
    );

    let v = vehicle.clone();
    server.bind("getHomeGeoPoint", move |(): ()| {
        pause();
        Ok(WireGeoPoint::from_domain(&v.home()))
    });

    let v = vehicle.clone();
    server.bind("setCarControls", move |(controls,): (WireCarControls,)| {
        pause();
        v.apply_controls(controls.to_domain());
        Ok(())
    });

    let v = vehicle;
    server.bind("getCarState", move |(): ()| {
        pause();
        Ok(WireCarState::from_domain(&v.step()))
    });
}
