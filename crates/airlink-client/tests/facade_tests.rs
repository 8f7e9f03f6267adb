//! 门面集成测试
//!
//! 每个测试在临时端口上启动一个模拟器。

use airlink_client::{
    CarClient, CarControls, ClientBuilder, ConnectionState, ImageRequest, ImageType, Pose,
    Quaternionr, Vector3r, VehicleClient,
};
use airlink_protocol::{CollisionInfo, WireImageRequest, WireImageResponse};
use airlink_rpc::RpcServer;
use airlink_sim::{CameraConfig, SimHandle, SimServer};
use approx::assert_relative_eq;
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

fn start_sim() -> SimHandle {
    SimServer::builder()
        .camera(CameraConfig::new(0, 8, 6))
        .camera(CameraConfig::new(1, 4, 4).with_types(&[ImageType::DepthPlanar, ImageType::Scene]))
        .start("127.0.0.1:0")
        .unwrap()
}

fn vehicle_for(sim: &SimHandle) -> VehicleClient {
    ClientBuilder::new()
        .host("127.0.0.1")
        .port(sim.port())
        .timeout(Duration::from_secs(2))
        .poll_interval(Duration::from_millis(20))
        .build_vehicle()
        .unwrap()
}

fn car_for(sim: &SimHandle) -> CarClient {
    ClientBuilder::new()
        .host("127.0.0.1")
        .port(sim.port())
        .timeout(Duration::from_secs(2))
        .build_car()
        .unwrap()
}

fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

// ==================== 连接 ====================

#[test]
fn ping_and_state_when_connected() {
    let sim = start_sim();
    let client = vehicle_for(&sim);
    assert!(client.ping().unwrap());
    assert_eq!(client.connection_state(), ConnectionState::Connected);
    client.confirm_connection().unwrap();
}

#[test]
fn construction_succeeds_without_server() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = VehicleClient::new("127.0.0.1", port, Duration::from_secs(1)).unwrap();
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);

    let err = client.ping().unwrap_err();
    assert!(!err.is_fatal());
    assert!(!err.is_remote_fault());
}

#[test]
fn confirm_connection_waits_for_server() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ClientBuilder::new()
        .host("127.0.0.1")
        .port(port)
        .poll_interval(Duration::from_millis(50))
        .build_vehicle()
        .unwrap();
    assert_ne!(client.connection_state(), ConnectionState::Connected);

    let starter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        SimServer::builder()
            .start(("127.0.0.1", port))
            .unwrap()
    });

    let started = Instant::now();
    client
        .confirm_connection_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(client.connection_state(), ConnectionState::Connected);

    let _sim = starter.join().unwrap();
    assert!(client.ping().unwrap());
}

#[test]
fn confirm_connection_timeout_gives_up() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ClientBuilder::new()
        .host("127.0.0.1")
        .port(port)
        .poll_interval(Duration::from_millis(20))
        .build_car()
        .unwrap();

    let err = client
        .confirm_connection_timeout(Duration::from_millis(150))
        .unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn server_restart_is_hidden_from_calls() {
    let sim = start_sim();
    let client = vehicle_for(&sim);
    assert!(client.ping().unwrap());

    sim.close_connections();
    thread::sleep(Duration::from_millis(100));

    // 不经过状态查询，调用本身透明重连
    assert!(client.ping().unwrap());
    assert!(client.ping().unwrap());
    assert_eq!(client.connection_state(), ConnectionState::Connected);
}

#[test]
fn drop_releases_connection() {
    let sim = start_sim();
    let client = vehicle_for(&sim);
    assert!(client.ping().unwrap());
    assert!(wait_until(Duration::from_secs(1), || sim.connection_count() == 1));

    drop(client);
    assert!(wait_until(Duration::from_secs(2), || sim.connection_count() == 0));
}

// ==================== 调用语义 ====================

#[test]
fn pose_round_trip() {
    let sim = start_sim();
    let client = vehicle_for(&sim);

    let pose = Pose::new(
        Vector3r::new(1.0, 2.0, 3.0),
        Quaternionr::new(1.0, 0.0, 0.0, 0.0),
    );
    client.sim_set_pose(&pose, true).unwrap();
    assert_eq!(client.sim_get_pose().unwrap(), pose);
}

#[test]
fn api_control_flag() {
    let sim = start_sim();
    let client = vehicle_for(&sim);

    client.enable_api_control(true).unwrap();
    assert!(client.is_api_control_enabled().unwrap());
    client.enable_api_control(false).unwrap();
    assert!(!client.is_api_control_enabled().unwrap());
    assert!(!sim.vehicle().is_api_control_enabled());
}

#[test]
fn reset_restores_initial_pose() {
    let sim = start_sim();
    let client = vehicle_for(&sim);
    client.enable_api_control(true).unwrap();
    client
        .sim_set_pose(&Pose::new(Vector3r::new(5.0, 5.0, 0.0), Quaternionr::IDENTITY), true)
        .unwrap();

    client.reset().unwrap();
    assert_eq!(client.sim_get_pose().unwrap(), Pose::IDENTITY);
    assert!(client.is_api_control_enabled().unwrap());
}

#[test]
fn home_geo_point() {
    let sim = start_sim();
    let client = vehicle_for(&sim);
    let home = client.home_geo_point().unwrap();
    assert_eq!(home, sim.vehicle().home());
}

// ==================== 图像 ====================

#[test]
fn single_empty_image_has_length_zero() {
    let sim = start_sim();
    let client = vehicle_for(&sim);

    let data = client.sim_get_image(0, ImageType::DepthPlanar).unwrap();
    assert!(data.is_empty());

    let data = client.sim_get_image(1, ImageType::DepthPlanar).unwrap();
    assert_eq!(data.len(), 16);
}

#[test]
fn images_keep_request_order() {
    let sim = start_sim();
    let client = vehicle_for(&sim);

    let requests = [
        ImageRequest::new(1, ImageType::DepthPlanar).pixels_as_float(true),
        ImageRequest::new(0, ImageType::Scene).compress(false),
        ImageRequest::new(0, ImageType::Segmentation),
        ImageRequest::new(1, ImageType::Scene),
    ];
    let responses = client.sim_get_images(&requests).unwrap();
    assert_eq!(responses.len(), requests.len());

    for (request, response) in requests.iter().zip(&responses) {
        assert_eq!(response.camera_id, request.camera_id);
        assert_eq!(response.image_type, request.image_type);
        assert_eq!(response.pixels_as_float, request.pixels_as_float);
    }
    assert_eq!(responses[0].image_data_float.len(), 16);
    assert_eq!(responses[1].image_data_uint8.len(), 8 * 6 * 3);
    assert!(responses[2].is_empty());
    assert_eq!(responses[3].width, 4);
}

#[test]
fn response_count_mismatch_is_fatal() {
    let mut server = RpcServer::new();
    server.bind("simGetImages", |(_requests,): (Vec<WireImageRequest>,)| {
        Ok(Vec::<WireImageResponse>::new())
    });
    let handle = server.serve("127.0.0.1:0").unwrap();
    let client = ClientBuilder::new()
        .host("127.0.0.1")
        .port(handle.local_addr().port())
        .timeout(Duration::from_secs(2))
        .build_vehicle()
        .unwrap();

    let requests = [
        ImageRequest::new(0, ImageType::Scene),
        ImageRequest::new(1, ImageType::DepthPlanar),
    ];
    let err = client.sim_get_images(&requests).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("0 responses for 2 requests"));
}

#[test]
fn no_requests_no_responses() {
    let sim = start_sim();
    let client = vehicle_for(&sim);
    assert!(client.sim_get_images(&[]).unwrap().is_empty());
}

#[test]
fn unknown_camera_is_remote_fault() {
    let sim = start_sim();
    let client = vehicle_for(&sim);

    let err = client.sim_get_image(9, ImageType::Scene).unwrap_err();
    assert!(err.is_remote_fault());
    assert!(err.remote_message().unwrap().contains("camera 9"));

    // 远端错误不影响后续调用
    assert!(client.ping().unwrap());
}

// ==================== 超时 ====================

#[test]
fn slow_remote_times_out_within_bound() {
    let sim = SimServer::builder()
        .response_delay(Duration::from_millis(800))
        .start("127.0.0.1:0")
        .unwrap();
    let client = ClientBuilder::new()
        .host("127.0.0.1")
        .port(sim.port())
        .timeout(Duration::from_millis(150))
        .build_vehicle()
        .unwrap();

    let started = Instant::now();
    let err = client.ping().unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(140));
    assert!(elapsed < Duration::from_millis(150 + 700));
}

// ==================== 小车 ====================

#[test]
fn car_controls_move_the_car() {
    let sim = start_sim();
    let car = car_for(&sim);
    car.enable_api_control(true).unwrap();

    let mut controls = CarControls::default();
    controls.set_throttle(1.0, true);
    car.set_car_controls(&controls).unwrap();
    assert_eq!(sim.vehicle().controls(), controls);

    let first = car.car_state().unwrap();
    let second = car.car_state().unwrap();
    assert!(second.speed > first.speed);
    assert!(second.position.x > first.position.x);
    assert!(second.timestamp > first.timestamp);
    assert_eq!(second.gear, 1);
}

#[test]
fn car_controls_ignored_without_api_control() {
    let sim = start_sim();
    let car = car_for(&sim);
    car.enable_api_control(false).unwrap();
    let before = car.car_state().unwrap();

    let mut controls = CarControls::default();
    controls.set_throttle(1.0, true);
    controls.steering = 0.5;
    car.set_car_controls(&controls).unwrap();

    let after = car.car_state().unwrap();
    assert_eq!(after.speed, before.speed);
    assert_eq!(after.position, before.position);
    assert_eq!(after.orientation, before.orientation);
    assert_eq!(sim.vehicle().ignored_commands(), 1);
}

#[test]
fn car_state_carries_collision() {
    let sim = start_sim();
    let car = car_for(&sim);
    sim.vehicle().inject_collision(CollisionInfo {
        normal: Vector3r::new(0.0, 0.0, -1.0),
        penetration_depth: 0.05,
        object_name: "Fence_3".to_string(),
        object_id: 3,
        ..Default::default()
    });

    let state = car.car_state().unwrap();
    assert!(state.collision.has_collided);
    assert_eq!(state.collision.object_name, "Fence_3");
    assert_eq!(state.collision.object_id, 3);
    assert_relative_eq!(state.collision.penetration_depth, 0.05);
}

#[test]
fn concurrent_callers_are_serialized() {
    let sim = start_sim();
    let client = std::sync::Arc::new(vehicle_for(&sim));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    assert!(client.ping().unwrap());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(sim.connection_count(), 1);
}
