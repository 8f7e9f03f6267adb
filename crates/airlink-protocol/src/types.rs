//! 空间类型
//!
//! 位置、姿态、位姿、地理坐标和碰撞信息。全部为纯值类型，没有传输相关逻辑。
//!
//! # 坐标约定
//!
//! 与仿真器一致使用 NED（北-东-地）坐标系，单位为米；四元数按 `(w, x, y, z)` 排列。
//!
//! # 示例
//!
//! ```rust
//! use airlink_protocol::{Pose, Quaternionr, Vector3r};
//!
//! let pose = Pose::new(Vector3r::new(1.0, 2.0, 3.0), Quaternionr::IDENTITY);
//! assert_eq!(pose.position.z, 3.0);
//! ```

use crate::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// 三维向量（米 / 米每秒）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3r {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3r {
    /// 零向量
    pub const ZERO: Self = Vector3r::new(0.0, 0.0, 0.0);

    /// 创建新的三维向量
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3r { x, y, z }
    }

    /// 向量长度（范数）
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl fmt::Display for Vector3r {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// 从 `"x,y,z"` 解析
impl FromStr for Vector3r {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z] = parse_components::<3>(s)?;
        Ok(Vector3r::new(x, y, z))
    }
}

/// 四元数（姿态）
///
/// 约定为单位四元数，但传输层不做强制归一化。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternionr {
    /// 实部
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternionr {
    /// 单位四元数（无旋转）
    pub const IDENTITY: Self = Quaternionr::new(1.0, 0.0, 0.0, 0.0);

    /// 创建新的四元数
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Quaternionr { w, x, y, z }
    }

    /// 模长
    pub fn norm(&self) -> f32 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// 是否为单位四元数（容差 `eps`）
    pub fn is_unit(&self, eps: f32) -> bool {
        (self.norm() - 1.0).abs() <= eps
    }
}

impl Default for Quaternionr {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Quaternionr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Q({:.4}, {:.4}, {:.4}, {:.4})",
            self.w, self.x, self.y, self.z
        )
    }
}

/// 从 `"w,x,y,z"` 解析
impl FromStr for Quaternionr {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [w, x, y, z] = parse_components::<4>(s)?;
        Ok(Quaternionr::new(w, x, y, z))
    }
}

/// 刚体位姿（位置 + 姿态）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Vector3r,
    pub orientation: Quaternionr,
}

impl Pose {
    /// 原点、无旋转
    pub const IDENTITY: Self = Pose::new(Vector3r::ZERO, Quaternionr::IDENTITY);

    pub const fn new(position: Vector3r, orientation: Quaternionr) -> Self {
        Pose {
            position,
            orientation,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position, self.orientation)
    }
}

/// 地理坐标（WGS84）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// 纬度（度）
    pub latitude: f64,
    /// 经度（度）
    pub longitude: f64,
    /// 海拔（米）
    pub altitude: f32,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64, altitude: f32) -> Self {
        GeoPoint {
            latitude,
            longitude,
            altitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat={:.7}, lon={:.7}, alt={:.2}m",
            self.latitude, self.longitude, self.altitude
        )
    }
}

/// 最近一次碰撞的摘要
///
/// 仅当上次 reset 之后发生过碰撞时才会被填充；否则 `has_collided == false`，其余字段为默认值。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionInfo {
    pub has_collided: bool,
    /// 接触面法向量
    pub normal: Vector3r,
    /// 接触点
    pub impact_point: Vector3r,
    /// 碰撞时车辆位置
    pub position: Vector3r,
    /// 穿透深度（米）
    pub penetration_depth: f32,
    /// 碰撞时间戳（纳秒）
    pub time_stamp: u64,
    /// 被撞物体名称
    pub object_name: String,
    /// 被撞物体 ID
    pub object_id: i32,
}

fn parse_components<const N: usize>(s: &str) -> Result<[f32; N], ProtocolError> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(ProtocolError::InvalidArgument(format!(
            "expected {} comma-separated components, got {} in '{}'",
            N,
            parts.len(),
            s
        )));
    }

    let mut out = [0.0f32; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<f32>().map_err(|e| {
            ProtocolError::InvalidArgument(format!("invalid component '{}': {}", part, e))
        })?;
    }
    Ok(out)
}
