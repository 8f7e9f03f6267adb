//! 模拟车辆状态
//!
//! 所有远端调用共享一个 `SimVehicle`。状态位于一把互斥锁之后；
//! 测试可以直接读取状态来验证门控和 reset 语义。

use crate::camera::CameraConfig;
use airlink_protocol::{
    CarControls, CarState, CollisionInfo, GeoPoint, ImageRequest, ImageResponse, ImageType, Pose,
    Quaternionr, Vector3r,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// 每次查询遥测推进的物理步长
pub const PHYSICS_STEP: Duration = Duration::from_millis(50);

/// 油门满开时的加速度（m/s²）
const MAX_ACCEL: f32 = 4.0;
/// 刹车满踩时的减速度（m/s²）
const BRAKE_DECEL: f32 = 8.0;
const MAX_SPEED: f32 = 30.0;
/// 满舵时每米行驶的转角（rad）
const STEER_RATE: f32 = 0.5;

#[derive(Debug, Clone)]
struct VehicleState {
    api_enabled: bool,
    pose: Pose,
    /// 有符号速度（倒车为负）
    velocity: f32,
    yaw: f32,
    controls: CarControls,
    collision: CollisionInfo,
    clock_ns: u64,
}

impl VehicleState {
    fn new(pose: Pose) -> Self {
        Self {
            api_enabled: false,
            pose,
            velocity: 0.0,
            yaw: yaw_of(&pose.orientation),
            controls: CarControls::default(),
            collision: CollisionInfo::default(),
            clock_ns: 0,
        }
    }

    fn car_state(&self) -> CarState {
        let heading = Vector3r::new(self.yaw.cos(), self.yaw.sin(), 0.0);
        CarState {
            speed: self.velocity.abs(),
            gear: gear_for(self.velocity),
            position: self.pose.position,
            velocity: Vector3r::new(
                heading.x * self.velocity,
                heading.y * self.velocity,
                0.0,
            ),
            orientation: self.pose.orientation,
            collision: self.collision.clone(),
            timestamp: self.clock_ns,
        }
    }

    fn step(&mut self, dt: f32) {
        let c = self.controls;
        let brake = if c.handbrake {
            1.0
        } else {
            c.brake.clamp(0.0, 1.0)
        };

        self.velocity += c.throttle.clamp(-1.0, 1.0) * MAX_ACCEL * dt;
        let decel = brake * BRAKE_DECEL * dt;
        if self.velocity.abs() <= decel {
            self.velocity = 0.0;
        } else {
            self.velocity -= decel * self.velocity.signum();
        }
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);

        let distance = self.velocity * dt;
        if distance != 0.0 {
            let turn = c.steering.clamp(-1.0, 1.0) * STEER_RATE * distance;
            if turn != 0.0 {
                self.yaw += turn;
                self.pose.orientation = yaw_quaternion(self.yaw);
            }
            self.pose.position.x += self.yaw.cos() * distance;
            self.pose.position.y += self.yaw.sin() * distance;
        }

        self.clock_ns += (dt as f64 * 1e9) as u64;
    }
}

/// 模拟车辆
#[derive(Debug)]
pub struct SimVehicle {
    state: Mutex<VehicleState>,
    initial_pose: Pose,
    cameras: Vec<CameraConfig>,
    home: GeoPoint,
    ignored_commands: AtomicU64,
}

impl SimVehicle {
    pub(crate) fn new(cameras: Vec<CameraConfig>, home: GeoPoint, initial_pose: Pose) -> Self {
        Self {
            state: Mutex::new(VehicleState::new(initial_pose)),
            initial_pose,
            cameras,
            home,
            ignored_commands: AtomicU64::new(0),
        }
    }

    pub fn is_api_control_enabled(&self) -> bool {
        self.state.lock().api_enabled
    }

    pub fn set_api_control(&self, enabled: bool) {
        self.state.lock().api_enabled = enabled;
        debug!("API control {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn pose(&self) -> Pose {
        self.state.lock().pose
    }

    /// 直接放置车辆，速度清零
    ///
    /// 模拟器没有碰撞检测，`ignore_collision` 只记录在日志中；
    /// 已有的碰撞记录保持不变，只有 `reset` 会清除。
    pub fn set_pose(&self, pose: Pose, ignore_collision: bool) {
        let mut state = self.state.lock();
        state.pose = pose;
        state.yaw = yaw_of(&pose.orientation);
        state.velocity = 0.0;
        debug!(ignore_collision, "pose set to {:?}", pose.position);
    }

    pub fn controls(&self) -> CarControls {
        self.state.lock().controls
    }

    /// 应用控制指令；API 控制未开启时忽略并返回 `false`
    pub fn apply_controls(&self, controls: CarControls) -> bool {
        let mut state = self.state.lock();
        if !state.api_enabled {
            self.ignored_commands.fetch_add(1, Ordering::Relaxed);
            warn!("setCarControls ignored: API control is disabled");
            return false;
        }
        state.controls = controls;
        true
    }

    /// 被门控忽略的控制指令数
    pub fn ignored_commands(&self) -> u64 {
        self.ignored_commands.load(Ordering::Relaxed)
    }

    /// 推进一个物理步长并返回遥测
    pub fn step(&self) -> CarState {
        let mut state = self.state.lock();
        state.step(PHYSICS_STEP.as_secs_f32());
        state.car_state()
    }

    /// 当前遥测（不推进物理）
    pub fn car_state(&self) -> CarState {
        self.state.lock().car_state()
    }

    /// 注入一次碰撞（下次 reset 前一直保留）
    pub fn inject_collision(&self, mut info: CollisionInfo) {
        let mut state = self.state.lock();
        info.has_collided = true;
        info.time_stamp = state.clock_ns;
        state.collision = info;
    }

    /// 恢复初始位姿、控制和遥测；API 控制开关与时钟保持不变
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let api_enabled = state.api_enabled;
        let clock_ns = state.clock_ns;
        *state = VehicleState::new(self.initial_pose);
        state.api_enabled = api_enabled;
        state.clock_ns = clock_ns;
        debug!("Vehicle reset");
    }

    pub fn home(&self) -> GeoPoint {
        self.home
    }

    pub fn camera(&self, id: u8) -> Option<&CameraConfig> {
        self.cameras.iter().find(|c| c.id == id)
    }

    /// 批量采集，任何一个相机不存在时整个调用失败
    pub fn capture(&self, requests: &[ImageRequest]) -> Result<Vec<ImageResponse>, String> {
        let (pose, clock_ns) = {
            let state = self.state.lock();
            (state.pose, state.clock_ns)
        };
        requests
            .iter()
            .map(|request| {
                self.camera(request.camera_id)
                    .map(|camera| camera.capture(request, &pose, clock_ns))
                    .ok_or_else(|| camera_not_found(request.camera_id as i32))
            })
            .collect()
    }

    /// 单张未压缩图像数据，没有对应缓冲区时为空
    pub fn single_image(&self, camera_id: i32, image_type: ImageType) -> Result<Vec<u8>, String> {
        let camera = u8::try_from(camera_id)
            .ok()
            .and_then(|id| self.camera(id))
            .ok_or_else(|| camera_not_found(camera_id))?;
        if camera.has_buffer(image_type) {
            Ok(camera.uint8_pixels(image_type))
        } else {
            Ok(Vec::new())
        }
    }
}

fn camera_not_found(camera_id: i32) -> String {
    format!("camera {} not found", camera_id)
}

fn yaw_of(q: &Quaternionr) -> f32 {
    (2.0 * (q.w * q.z + q.x * q.y)).atan2(1.0 - 2.0 * (q.y * q.y + q.z * q.z))
}

fn yaw_quaternion(yaw: f32) -> Quaternionr {
    Quaternionr::new((yaw / 2.0).cos(), 0.0, 0.0, (yaw / 2.0).sin())
}

fn gear_for(velocity: f32) -> i32 {
    if velocity < 0.0 {
        -1
    } else if velocity == 0.0 {
        0
    } else {
        1 + ((velocity / 6.0) as i32).min(4)
    }
}
