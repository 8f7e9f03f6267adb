//! 图像采集命令

use super::connect_vehicle;
use crate::validation::parse_image_request;
use airlink_sdk::{EndpointConfig, ImageRequest, ImageResponse, ImageType};
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// 单张图像（未压缩 uint8）
#[derive(Args, Debug)]
pub struct ImageCommand {
    /// 相机 ID
    #[arg(short, long, default_value_t = 0)]
    pub camera: i32,

    /// 图像类型（名称或编码，如 scene、depth-planar、5）
    #[arg(short = 't', long = "type", default_value = "scene")]
    pub image_type: ImageType,

    /// 输出文件
    #[arg(short, long)]
    pub output: PathBuf,
}

impl ImageCommand {
    pub fn execute(&self, endpoint: &EndpointConfig) -> Result<()> {
        let client = connect_vehicle(endpoint)?;
        let data = client
            .sim_get_image(self.camera, self.image_type)
            .with_context(|| format!("获取相机 {} 的 {} 图像失败", self.camera, self.image_type))?;

        if data.is_empty() {
            println!(
                "⚠️ 相机 {} 没有 {} 图像，未写入文件",
                self.camera, self.image_type
            );
            return Ok(());
        }

        write_file(&self.output, &data)?;
        println!("✅ {} 字节 → {}", data.len(), self.output.display());
        Ok(())
    }
}

/// 批量图像
#[derive(Args, Debug)]
pub struct ImagesCommand {
    /// 请求 cam:type[:float][:raw]，可重复
    #[arg(short, long = "request", required = true, value_parser = parse_image_request)]
    pub requests: Vec<ImageRequest>,

    /// 输出目录（不指定时只打印摘要）
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

impl ImagesCommand {
    pub fn execute(&self, endpoint: &EndpointConfig) -> Result<()> {
        let client = connect_vehicle(endpoint)?;
        let responses = client.sim_get_images(&self.requests)?;

        if let Some(dir) = &self.out_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("创建输出目录失败: {}", dir.display()))?;
        }

        println!(
            "{:>3}  {:>6}  {:<22} {:>5}x{:<5} {:>10}",
            "#", "camera", "type", "w", "h", "bytes"
        );
        for (index, response) in responses.iter().enumerate() {
            let payload = payload_bytes(response);
            println!(
                "{:>3}  {:>6}  {:<22} {:>5}x{:<5} {:>10}",
                index,
                response.camera_id,
                response.image_type.name(),
                response.width,
                response.height,
                payload.len()
            );

            if let Some(dir) = &self.out_dir {
                if payload.is_empty() {
                    continue;
                }
                let path = dir.join(file_name(index, response));
                write_file(&path, &payload)?;
            }
        }
        Ok(())
    }
}

/// 输出文件名：浮点数据为小端 f32 原始数据
fn file_name(index: usize, response: &ImageResponse) -> String {
    let ext = if response.pixels_as_float { "f32" } else { "bin" };
    format!(
        "{:02}_cam{}_{}.{}",
        index,
        response.camera_id,
        response.image_type.name(),
        ext
    )
}

fn payload_bytes(response: &ImageResponse) -> Vec<u8> {
    if response.pixels_as_float {
        response
            .image_data_float
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    } else {
        response.image_data_uint8.clone()
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("写入文件失败: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let response = ImageResponse {
            camera_id: 1,
            image_type: ImageType::DepthPlanar,
            pixels_as_float: true,
            ..Default::default()
        };
        assert_eq!(file_name(2, &response), "02_cam1_depth-planar.f32");
    }

    #[test]
    fn test_float_payload_is_little_endian() {
        let response = ImageResponse {
            pixels_as_float: true,
            image_data_float: vec![1.0, 2.5],
            ..Default::default()
        };
        let bytes = payload_bytes(&response);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    }
}
