//! 线缆适配器
//!
//! 每个领域类型都有一个对应的 `Wire*` 类型，负责：
//! - `from_domain()`：由领域值构造线缆值（发送前）
//! - `to_domain()`：由线缆值还原领域值（接收后）
//!
//! 对所有字段满足 `to_domain(from_domain(x)) == x`。本模块是唯一知道线缆表示的代码，
//! 字段名与仿真器服务端保持一致（`x_val`、`w_val` 等）。
//!
//! # 空数据缺陷
//!
//! 远端图像管线无法传输长度为 0 的序列：空图像会以 **恰好 1 个元素** 的占位数据传输。
//! `WireImageResponse` 在 `from_domain()` 中补齐占位元素，在 `to_domain()` 中将长度为 1
//! 的数据还原为空；单相机接口的返回值使用 [`strip_empty_placeholder`] 做同样的处理。
//! 调用方永远只会看到长度 0 的空图像。

use crate::car::{CarControls, CarState};
use crate::image::{ImageRequest, ImageResponse, ImageType};
use crate::types::{CollisionInfo, GeoPoint, Pose, Quaternionr, Vector3r};
use serde::{Deserialize, Serialize};

/// 领域类型 ↔ 线缆类型的双向转换
pub trait WireAdapter: Sized {
    /// 对应的领域类型
    type Domain;

    /// 由领域值构造线缆值
    fn from_domain(value: &Self::Domain) -> Self;

    /// 还原为领域值
    fn to_domain(&self) -> Self::Domain;
}

/// 逐元素转换为线缆序列（保持顺序）
pub fn from_domain_seq<W: WireAdapter>(values: &[W::Domain]) -> Vec<W> {
    values.iter().map(W::from_domain).collect()
}

/// 逐元素还原为领域序列（保持顺序）
pub fn to_domain_seq<W: WireAdapter>(values: &[W]) -> Vec<W::Domain> {
    values.iter().map(W::to_domain).collect()
}

/// 空数据补齐为 1 个占位元素（发送端）
pub fn pad_empty_placeholder<T: Default>(mut data: Vec<T>) -> Vec<T> {
    if data.is_empty() {
        data.push(T::default());
    }
    data
}

/// 长度恰好为 1 的数据视为空图像占位，还原为空（接收端）
pub fn strip_empty_placeholder<T>(mut data: Vec<T>) -> Vec<T> {
    if data.len() == 1 {
        data.clear();
    }
    data
}

// ============================================================================
// 空间类型
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WireVector3r {
    pub x_val: f32,
    pub y_val: f32,
    pub z_val: f32,
}

impl WireAdapter for WireVector3r {
    type Domain = Vector3r;

    fn from_domain(value: &Vector3r) -> Self {
        Self {
            x_val: value.x,
            y_val: value.y,
            z_val: value.z,
        }
    }

    fn to_domain(&self) -> Vector3r {
        Vector3r::new(self.x_val, self.y_val, self.z_val)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireQuaternionr {
    pub w_val: f32,
    pub x_val: f32,
    pub y_val: f32,
    pub z_val: f32,
}

impl Default for WireQuaternionr {
    fn default() -> Self {
        Self::from_domain(&Quaternionr::IDENTITY)
    }
}

impl WireAdapter for WireQuaternionr {
    type Domain = Quaternionr;

    fn from_domain(value: &Quaternionr) -> Self {
        Self {
            w_val: value.w,
            x_val: value.x,
            y_val: value.y,
            z_val: value.z,
        }
    }

    fn to_domain(&self) -> Quaternionr {
        Quaternionr::new(self.w_val, self.x_val, self.y_val, self.z_val)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WirePose {
    pub position: WireVector3r,
    pub orientation: WireQuaternionr,
}

impl WireAdapter for WirePose {
    type Domain = Pose;

    fn from_domain(value: &Pose) -> Self {
        Self {
            position: WireVector3r::from_domain(&value.position),
            orientation: WireQuaternionr::from_domain(&value.orientation),
        }
    }

    fn to_domain(&self) -> Pose {
        Pose::new(self.position.to_domain(), self.orientation.to_domain())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WireGeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
}

impl WireAdapter for WireGeoPoint {
    type Domain = GeoPoint;

    fn from_domain(value: &GeoPoint) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
            altitude: value.altitude,
        }
    }

    fn to_domain(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude, self.altitude)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireCollisionInfo {
    pub has_collided: bool,
    pub normal: WireVector3r,
    pub impact_point: WireVector3r,
    pub position: WireVector3r,
    pub penetration_depth: f32,
    pub time_stamp: u64,
    pub object_name: String,
    pub object_id: i32,
}

impl WireAdapter for WireCollisionInfo {
    type Domain = CollisionInfo;

    fn from_domain(value: &CollisionInfo) -> Self {
        Self {
            has_collided: value.has_collided,
            normal: WireVector3r::from_domain(&value.normal),
            impact_point: WireVector3r::from_domain(&value.impact_point),
            position: WireVector3r::from_domain(&value.position),
            penetration_depth: value.penetration_depth,
            time_stamp: value.time_stamp,
            object_name: value.object_name.clone(),
            object_id: value.object_id,
        }
    }

    fn to_domain(&self) -> CollisionInfo {
        CollisionInfo {
            has_collided: self.has_collided,
            normal: self.normal.to_domain(),
            impact_point: self.impact_point.to_domain(),
            position: self.position.to_domain(),
            penetration_depth: self.penetration_depth,
            time_stamp: self.time_stamp,
            object_name: self.object_name.clone(),
            object_id: self.object_id,
        }
    }
}

// ============================================================================
// 图像
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireImageRequest {
    pub camera_id: u8,
    pub image_type: ImageType,
    pub pixels_as_float: bool,
    pub compress: bool,
}

impl WireAdapter for WireImageRequest {
    type Domain = ImageRequest;

    fn from_domain(value: &ImageRequest) -> Self {
        Self {
            camera_id: value.camera_id,
            image_type: value.image_type,
            pixels_as_float: value.pixels_as_float,
            compress: value.compress,
        }
    }

    fn to_domain(&self) -> ImageRequest {
        ImageRequest {
            camera_id: self.camera_id,
            image_type: self.image_type,
            pixels_as_float: self.pixels_as_float,
            compress: self.compress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireImageResponse {
    /// 空图像以 1 字节占位传输
    pub image_data_uint8: Vec<u8>,
    /// 空图像以 1 个元素占位传输
    pub image_data_float: Vec<f32>,
    pub camera_id: u8,
    pub camera_position: WireVector3r,
    pub camera_orientation: WireQuaternionr,
    pub time_stamp: u64,
    pub message: String,
    pub pixels_as_float: bool,
    pub compress: bool,
    pub width: i32,
    pub height: i32,
    pub image_type: ImageType,
}

impl WireAdapter for WireImageResponse {
    type Domain = ImageResponse;

    fn from_domain(value: &ImageResponse) -> Self {
        Self {
            image_data_uint8: pad_empty_placeholder(value.image_data_uint8.clone()),
            image_data_float: pad_empty_placeholder(value.image_data_float.clone()),
            camera_id: value.camera_id,
            camera_position: WireVector3r::from_domain(&value.camera_position),
            camera_orientation: WireQuaternionr::from_domain(&value.camera_orientation),
            time_stamp: value.time_stamp,
            message: value.message.clone(),
            pixels_as_float: value.pixels_as_float,
            compress: value.compress,
            width: value.width,
            height: value.height,
            image_type: value.image_type,
        }
    }

    fn to_domain(&self) -> ImageResponse {
        ImageResponse {
            image_data_uint8: strip_empty_placeholder(self.image_data_uint8.clone()),
            image_data_float: strip_empty_placeholder(self.image_data_float.clone()),
            camera_id: self.camera_id,
            camera_position: self.camera_position.to_domain(),
            camera_orientation: self.camera_orientation.to_domain(),
            time_stamp: self.time_stamp,
            message: self.message.clone(),
            pixels_as_float: self.pixels_as_float,
            compress: self.compress,
            width: self.width,
            height: self.height,
            image_type: self.image_type,
        }
    }
}

// ============================================================================
// 车辆
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireCarControls {
    pub throttle: f32,
    pub steering: f32,
    pub brake: f32,
    pub handbrake: bool,
    pub is_manual_gear: bool,
    pub manual_gear: i32,
    pub gear_immediate: bool,
}

impl WireAdapter for WireCarControls {
    type Domain = CarControls;

    fn from_domain(value: &CarControls) -> Self {
        Self {
            throttle: value.throttle,
            steering: value.steering,
            brake: value.brake,
            handbrake: value.handbrake,
            is_manual_gear: value.is_manual_gear,
            manual_gear: value.manual_gear,
            gear_immediate: value.gear_immediate,
        }
    }

    fn to_domain(&self) -> CarControls {
        CarControls {
            throttle: self.throttle,
            steering: self.steering,
            brake: self.brake,
            handbrake: self.handbrake,
            is_manual_gear: self.is_manual_gear,
            manual_gear: self.manual_gear,
            gear_immediate: self.gear_immediate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireCarState {
    pub speed: f32,
    pub gear: i32,
    pub position: WireVector3r,
    pub velocity: WireVector3r,
    pub orientation: WireQuaternionr,
    pub collision: WireCollisionInfo,
    pub timestamp: u64,
}

impl WireAdapter for WireCarState {
    type Domain = CarState;

    fn from_domain(value: &CarState) -> Self {
        Self {
            speed: value.speed,
            gear: value.gear,
            position: WireVector3r::from_domain(&value.position),
            velocity: WireVector3r::from_domain(&value.velocity),
            orientation: WireQuaternionr::from_domain(&value.orientation),
            collision: WireCollisionInfo::from_domain(&value.collision),
            timestamp: value.timestamp,
        }
    }

    fn to_domain(&self) -> CarState {
        CarState {
            speed: self.speed,
            gear: self.gear,
            position: self.position.to_domain(),
            velocity: self.velocity.to_domain(),
            orientation: self.orientation.to_domain(),
            collision: self.collision.to_domain(),
            timestamp: self.timestamp,
        }
    }
}
