//! 相机图像类型
//!
//! `ImageRequest` 描述一次相机采集，`ImageResponse` 携带采集结果。
//! 批量请求与响应按位置一一对应（没有显式 ID）。

use crate::ProtocolError;
use crate::types::{Quaternionr, Vector3r};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::str::FromStr;

/// 图像类型
///
/// 数值编码与仿真器一致（0..=6）。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(u8)]
pub enum ImageType {
    /// 彩色场景图
    Scene = 0,
    /// 平面深度（到相机平面的距离）
    DepthPlanar = 1,
    /// 透视深度（到相机光心的距离）
    DepthPerspective = 2,
    /// 深度可视化
    DepthVis = 3,
    /// 归一化视差
    DisparityNormalized = 4,
    /// 语义分割
    Segmentation = 5,
    /// 表面法向
    SurfaceNormals = 6,
}

// 不使用 #[default]：num_enum 会把它当作未知编码的兜底分支
impl Default for ImageType {
    fn default() -> Self {
        ImageType::Scene
    }
}

impl ImageType {
    /// 全部图像类型（按编码顺序）
    pub const ALL: [ImageType; 7] = [
        ImageType::Scene,
        ImageType::DepthPlanar,
        ImageType::DepthPerspective,
        ImageType::DepthVis,
        ImageType::DisparityNormalized,
        ImageType::Segmentation,
        ImageType::SurfaceNormals,
    ];

    /// 从数值编码创建
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        Self::try_from_primitive(code).map_err(|e| ProtocolError::InvalidImageType(e.number))
    }

    /// 数值编码
    pub fn code(self) -> u8 {
        self.into()
    }

    /// kebab-case 名称（CLI 和日志使用）
    pub fn name(self) -> &'static str {
        match self {
            ImageType::Scene => "scene",
            ImageType::DepthPlanar => "depth-planar",
            ImageType::DepthPerspective => "depth-perspective",
            ImageType::DepthVis => "depth-vis",
            ImageType::DisparityNormalized => "disparity-normalized",
            ImageType::Segmentation => "segmentation",
            ImageType::SurfaceNormals => "surface-normals",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 接受 kebab-case、snake_case 名称或数值编码
impl FromStr for ImageType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if let Ok(code) = normalized.parse::<u8>() {
            return Self::from_code(code);
        }
        ImageType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| ProtocolError::UnknownImageTypeName(s.to_string()))
    }
}

/// 相机采集请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRequest {
    /// 相机 ID（必须是远端车辆上存在的相机）
    pub camera_id: u8,
    pub image_type: ImageType,
    /// 以 f32 像素返回（深度图常用）
    pub pixels_as_float: bool,
    /// 是否压缩（PNG）
    pub compress: bool,
}

impl ImageRequest {
    /// 创建请求（默认：uint8 像素、压缩）
    pub fn new(camera_id: u8, image_type: ImageType) -> Self {
        Self {
            camera_id,
            image_type,
            pixels_as_float: false,
            compress: true,
        }
    }

    /// 设置是否以浮点像素返回
    pub fn pixels_as_float(mut self, pixels_as_float: bool) -> Self {
        self.pixels_as_float = pixels_as_float;
        self
    }

    /// 设置是否压缩
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// 相机采集结果
///
/// `pixels_as_float == true` 时数据位于 `image_data_float`，否则位于 `image_data_uint8`。
/// 没有图像时对应的数据为空（长度 0）。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageResponse {
    pub image_data_uint8: Vec<u8>,
    pub image_data_float: Vec<f32>,
    pub camera_id: u8,
    /// 采集时相机位置
    pub camera_position: Vector3r,
    /// 采集时相机姿态
    pub camera_orientation: Quaternionr,
    /// 时间戳（纳秒）
    pub time_stamp: u64,
    /// 远端附带的说明信息
    pub message: String,
    pub pixels_as_float: bool,
    pub compress: bool,
    pub width: i32,
    pub height: i32,
    pub image_type: ImageType,
}

impl ImageResponse {
    /// 是否不含任何像素数据
    pub fn is_empty(&self) -> bool {
        self.image_data_uint8.is_empty() && self.image_data_float.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type_codes() {
        for (i, t) in ImageType::ALL.iter().enumerate() {
            assert_eq!(t.code() as usize, i);
            assert_eq!(ImageType::from_code(i as u8).unwrap(), *t);
        }
    }

    #[test]
    fn test_image_type_invalid_code() {
        assert_eq!(
            ImageType::from_code(7),
            Err(ProtocolError::InvalidImageType(7))
        );
    }

    #[test]
    fn test_image_type_from_str() {
        assert_eq!("scene".parse::<ImageType>().unwrap(), ImageType::Scene);
        assert_eq!(
            "depth_planar".parse::<ImageType>().unwrap(),
            ImageType::DepthPlanar
        );
        assert_eq!(
            "Depth-Perspective".parse::<ImageType>().unwrap(),
            ImageType::DepthPerspective
        );
        assert_eq!("5".parse::<ImageType>().unwrap(), ImageType::Segmentation);
        assert!("thermal".parse::<ImageType>().is_err());
    }

    #[test]
    fn test_image_type_name_roundtrip() {
        for t in ImageType::ALL {
            assert_eq!(t.name().parse::<ImageType>().unwrap(), t);
        }
    }

    #[test]
    fn test_image_request_defaults() {
        let req = ImageRequest::new(0, ImageType::Scene);
        assert!(!req.pixels_as_float);
        assert!(req.compress);

        let req = req.pixels_as_float(true).compress(false);
        assert!(req.pixels_as_float);
        assert!(!req.compress);
    }

    #[test]
    fn test_image_response_is_empty() {
        let mut resp = ImageResponse::default();
        assert!(resp.is_empty());
        resp.image_data_float.push(1.0);
        assert!(!resp.is_empty());
    }
}
