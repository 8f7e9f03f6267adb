//! 模拟相机
//!
//! 每个相机只为配置过的图像类型生成数据，其他类型返回空图像。

use airlink_protocol::{ImageRequest, ImageResponse, ImageType, Pose};

/// 相机配置
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub id: u8,
    pub width: i32,
    pub height: i32,
    /// 有数据的图像类型
    pub image_types: Vec<ImageType>,
}

impl CameraConfig {
    /// 创建相机（默认只有 Scene 图像）
    pub fn new(id: u8, width: i32, height: i32) -> Self {
        Self {
            id,
            width: width.max(0),
            height: height.max(0),
            image_types: vec![ImageType::Scene],
        }
    }

    /// 设置有数据的图像类型
    pub fn with_types(mut self, image_types: &[ImageType]) -> Self {
        self.image_types = image_types.to_vec();
        self
    }

    pub fn has_buffer(&self, image_type: ImageType) -> bool {
        self.image_types.contains(&image_type)
    }

    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 按请求生成一帧
    pub(crate) fn capture(
        &self,
        request: &ImageRequest,
        vehicle_pose: &Pose,
        time_stamp: u64,
    ) -> ImageResponse {
        let mut response = ImageResponse {
            camera_id: self.id,
            camera_position: vehicle_pose.position,
            camera_orientation: vehicle_pose.orientation,
            time_stamp,
            pixels_as_float: request.pixels_as_float,
            compress: request.compress,
            image_type: request.image_type,
            ..Default::default()
        };

        if !self.has_buffer(request.image_type) {
            response.message = format!("no {} buffer on camera {}", request.image_type, self.id);
            return response;
        }

        response.width = self.width;
        response.height = self.height;
        if request.pixels_as_float {
            response.image_data_float = self.float_pixels();
        } else {
            response.image_data_uint8 = self.uint8_pixels(request.image_type);
        }
        response
    }

    /// 单通道 uint8 负载（Scene 为 RGB 三通道）
    pub(crate) fn uint8_pixels(&self, image_type: ImageType) -> Vec<u8> {
        let channels = if image_type == ImageType::Scene { 3 } else { 1 };
        (0..self.pixel_count() * channels)
            .map(|i| ((i + image_type.code() as usize) % 256) as u8)
            .collect()
    }

    fn float_pixels(&self) -> Vec<f32> {
        let width = self.width.max(1) as usize;
        (0..self.pixel_count())
            .map(|i| 1.0 + (i % width) as f32 * 0.1)
            .collect()
    }
}
