//! 输入解析与验证

use airlink_protocol::{CarControls, ImageRequest, ImageType};
use anyhow::Result;
use clap::ValueEnum;

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// 解析 `cam:type[:float][:raw]` 形式的图像请求
///
/// - `float`: 以浮点像素返回
/// - `raw`: 不压缩
///
/// # 示例
/// * `0:scene`
/// * `1:depth-planar:float:raw`
pub fn parse_image_request(s: &str) -> Result<ImageRequest, String> {
    let mut parts = s.split(':');
    let camera = parts.next().unwrap_or_default();
    let camera_id: u8 = camera
        .trim()
        .parse()
        .map_err(|_| format!("invalid camera id '{}' in '{}'", camera, s))?;

    let image_type: ImageType = parts
        .next()
        .ok_or_else(|| format!("missing image type in '{}' (expected cam:type)", s))?
        .parse()
        .map_err(|e| format!("{}", e))?;

    let mut request = ImageRequest::new(camera_id, image_type);
    for flag in parts {
        match flag.trim() {
            "float" => request = request.pixels_as_float(true),
            "raw" => request = request.compress(false),
            other => return Err(format!("unknown request flag '{}' in '{}'", other, s)),
        }
    }
    Ok(request)
}

/// 由命令行参数构造控制指令
pub fn build_controls(
    throttle: f32,
    steering: f32,
    brake: f32,
    handbrake: bool,
    reverse: bool,
    gear: Option<i32>,
) -> Result<CarControls> {
    let mut controls = CarControls {
        steering,
        brake,
        handbrake,
        ..Default::default()
    };
    controls.set_throttle(throttle, !reverse);

    if let Some(gear) = gear {
        controls.is_manual_gear = true;
        controls.manual_gear = gear;
    }

    if !controls.is_within_range() {
        anyhow::bail!(
            "throttle/steering/brake 必须位于 [-1, 1]（得到 {:.2}/{:.2}/{:.2}）",
            throttle,
            steering,
            brake
        );
    }
    Ok(controls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_request() {
        let req = parse_image_request("0:scene").unwrap();
        assert_eq!(req, ImageRequest::new(0, ImageType::Scene));

        let req = parse_image_request("3:depth_planar:float:raw").unwrap();
        assert_eq!(req.camera_id, 3);
        assert_eq!(req.image_type, ImageType::DepthPlanar);
        assert!(req.pixels_as_float);
        assert!(!req.compress);

        let req = parse_image_request("1:5").unwrap();
        assert_eq!(req.image_type, ImageType::Segmentation);
    }

    #[test]
    fn test_parse_image_request_errors() {
        assert!(parse_image_request("").is_err());
        assert!(parse_image_request("0").is_err());
        assert!(parse_image_request("x:scene").is_err());
        assert!(parse_image_request("0:sky").is_err());
        assert!(parse_image_request("0:scene:png").is_err());
        assert!(parse_image_request("300:scene").is_err());
    }

    #[test]
    fn test_build_controls() {
        let c = build_controls(0.5, -0.2, 0.0, false, false, None).unwrap();
        assert_eq!(c.throttle, 0.5);
        assert_eq!(c.manual_gear, 0);
        assert!(!c.is_manual_gear);

        let c = build_controls(0.5, 0.0, 0.0, false, true, None).unwrap();
        assert_eq!(c.throttle, -0.5);
        assert_eq!(c.manual_gear, -1);

        let c = build_controls(0.3, 0.0, 0.0, true, false, Some(2)).unwrap();
        assert!(c.is_manual_gear);
        assert_eq!(c.manual_gear, 2);
        assert!(c.handbrake);
    }

    #[test]
    fn test_build_controls_out_of_range() {
        assert!(build_controls(1.5, 0.0, 0.0, false, false, None).is_err());
        assert!(build_controls(0.0, -2.0, 0.0, false, false, None).is_err());
    }
}
