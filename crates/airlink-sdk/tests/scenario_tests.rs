//! 端到端场景测试
//!
//! 通过 SDK 的统一入口驱动模拟器，覆盖典型的使用流程。

use airlink_sdk::prelude::*;
use airlink_sdk::sim::{CameraConfig, SimHandle, SimServer};
use approx::assert_relative_eq;
use std::time::Duration;

fn start_sim() -> SimHandle {
    airlink_sdk::init_logger();
    SimServer::builder()
        .camera(
            CameraConfig::new(0, 16, 9).with_types(&[
                ImageType::Scene,
                ImageType::DepthPerspective,
                ImageType::Segmentation,
            ]),
        )
        .home(GeoPoint::new(31.2304, 121.4737, 4.0))
        .initial_pose(Pose::new(Vector3r::new(0.0, 0.0, -1.0), Quaternionr::IDENTITY))
        .start("127.0.0.1:0")
        .unwrap()
}

fn builder_for(sim: &SimHandle) -> ClientBuilder {
    ClientBuilder::new()
        .host("127.0.0.1")
        .port(sim.port())
        .timeout(Duration::from_secs(2))
        .poll_interval(Duration::from_millis(20))
}

/// 连接 → 接管 → 设位姿 → 采图 → reset
#[test]
fn vehicle_session_walkthrough() {
    let sim = start_sim();
    let client = builder_for(&sim).build_vehicle().unwrap();

    client.confirm_connection().unwrap();
    assert!(client.ping().unwrap());
    client.enable_api_control(true).unwrap();

    let home = client.home_geo_point().unwrap();
    assert_relative_eq!(home.latitude, 31.2304);
    assert_relative_eq!(home.altitude, 4.0);

    let target = Pose::new(Vector3r::new(10.0, -4.0, -2.5), Quaternionr::new(0.0, 0.0, 0.0, 1.0));
    client.sim_set_pose(&target, true).unwrap();
    assert_eq!(client.sim_get_pose().unwrap(), target);

    let responses = client
        .sim_get_images(&[
            ImageRequest::new(0, ImageType::Scene),
            ImageRequest::new(0, ImageType::DepthPerspective).pixels_as_float(true),
            ImageRequest::new(0, ImageType::SurfaceNormals),
        ])
        .unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].image_data_uint8.len(), 16 * 9 * 3);
    assert_eq!(responses[1].image_data_float.len(), 16 * 9);
    assert!(responses[2].is_empty());
    assert_eq!(responses[0].camera_position, target.position);

    client.reset().unwrap();
    assert_eq!(
        client.sim_get_pose().unwrap().position,
        Vector3r::new(0.0, 0.0, -1.0)
    );
}

/// 小车：加速、转向、刹停
#[test]
fn car_drive_walkthrough() {
    let sim = start_sim();
    let car = builder_for(&sim).build_car().unwrap();
    car.confirm_connection_timeout(Duration::from_secs(5)).unwrap();
    car.enable_api_control(true).unwrap();

    let mut controls = CarControls::default();
    controls.set_throttle(0.8, true);
    controls.steering = 0.3;
    car.set_car_controls(&controls).unwrap();

    let mut last = car.car_state().unwrap();
    for _ in 0..10 {
        let state = car.car_state().unwrap();
        assert!(state.timestamp > last.timestamp);
        assert!(state.speed >= last.speed);
        last = state;
    }
    assert!(last.speed > 0.0);
    assert!(last.orientation.is_unit(1e-4));

    car.set_car_controls(&CarControls {
        brake: 1.0,
        ..Default::default()
    })
    .unwrap();
    let mut stopped = false;
    for _ in 0..50 {
        if car.car_state().unwrap().speed == 0.0 {
            stopped = true;
            break;
        }
    }
    assert!(stopped);
}

/// 同一模拟器上的两个客户端各自持有独立连接
#[test]
fn independent_clients() {
    let sim = start_sim();
    let vehicle = builder_for(&sim).build_vehicle().unwrap();
    let car = builder_for(&sim).build_car().unwrap();

    vehicle.enable_api_control(true).unwrap();
    assert!(car.is_api_control_enabled().unwrap());
    assert_eq!(sim.connection_count(), 2);

    drop(vehicle);
    assert!(car.ping().unwrap());
}

/// 错误分类经由 SDK 类型可见
#[test]
fn error_taxonomy() {
    let sim = start_sim();
    let car = builder_for(&sim).build_car().unwrap();

    let err = car.sim_get_image(42, ImageType::Scene).unwrap_err();
    assert!(err.is_remote_fault());
    assert!(!err.is_fatal());
    assert!(matches!(
        err,
        ClientError::Rpc(airlink_sdk::RpcError::Remote { .. })
    ));
}
