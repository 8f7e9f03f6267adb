//! 图像采集演示 - 批量请求与空图像处理
//!
//! # 运行
//!
//! ```bash
//! cargo run --example image_capture_demo
//! ```

use airlink_sdk::prelude::*;
use airlink_sdk::sim::{CameraConfig, SimServer};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    airlink_sdk::init_logger();

    println!("📷 AirLink SDK - Image Capture Demo");
    println!("===================================\n");

    let sim = SimServer::builder()
        .camera(CameraConfig::new(0, 320, 240).with_types(&[ImageType::Scene, ImageType::DepthPlanar]))
        .camera(CameraConfig::new(1, 160, 120))
        .start("127.0.0.1:0")?;

    let client = VehicleClient::new("127.0.0.1", sim.port(), Duration::from_secs(5))?;
    client.confirm_connection()?;

    let requests = [
        ImageRequest::new(0, ImageType::Scene),
        ImageRequest::new(0, ImageType::DepthPlanar).pixels_as_float(true),
        // 1 号相机没有深度缓冲区，返回空图像
        ImageRequest::new(1, ImageType::DepthPlanar),
    ];
    let responses = client.sim_get_images(&requests)?;

    for (request, response) in requests.iter().zip(&responses) {
        let len = if response.pixels_as_float {
            response.image_data_float.len()
        } else {
            response.image_data_uint8.len()
        };
        println!(
            "   camera {} {:<14} {}x{} ({} values){}",
            request.camera_id,
            request.image_type.to_string(),
            response.width,
            response.height,
            len,
            if response.is_empty() { "  [empty]" } else { "" }
        );
    }

    let single = client.sim_get_image(1, ImageType::DepthPlanar)?;
    println!("\n   单张深度图长度: {}", single.len());

    println!("\n✅ 完成");
    Ok(())
}
