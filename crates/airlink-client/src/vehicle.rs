//! 通用车辆客户端

use crate::builder::ClientBuilder;
use crate::connection::ConnectionState;
use crate::error::Result;
use crate::session::Session;
use airlink_protocol::{GeoPoint, ImageRequest, ImageResponse, ImageType, Pose, WireAdapter, WirePose};
use std::time::Duration;

/// 通用车辆客户端
///
/// 每个操作是一次同步远程调用，不自动重试。同一实例上的并发调用按到达顺序串行执行。
///
/// # 示例
///
/// ```rust,no_run
/// use airlink_client::VehicleClient;
/// use airlink_protocol::{ImageRequest, ImageType, Pose, Quaternionr, Vector3r};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), airlink_client::ClientError> {
/// let client = VehicleClient::new("localhost", 42451, Duration::from_secs(60))?;
/// client.confirm_connection()?;
/// client.enable_api_control(true)?;
///
/// let pose = Pose::new(Vector3r::new(1.0, 2.0, 3.0), Quaternionr::IDENTITY);
/// client.sim_set_pose(&pose, true)?;
///
/// let responses = client.sim_get_images(&[
///     ImageRequest::new(0, ImageType::Scene),
///     ImageRequest::new(0, ImageType::DepthPlanar).pixels_as_float(true),
/// ])?;
/// # Ok(())
/// # }
/// ```
pub struct VehicleClient {
    session: Session,
}

impl VehicleClient {
    /// 使用指定端点创建客户端（连接超时等其他参数使用默认值）
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Result<Self> {
        ClientBuilder::new()
            .host(host)
            .port(port)
            .timeout(timeout)
            .build_vehicle()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// 远端存活检查（返回 false 不代表链路断开）
    pub fn ping(&self) -> Result<bool> {
        self.session.ping()
    }

    /// 当前链路状态（实时查询）
    pub fn connection_state(&self) -> ConnectionState {
        self.session.connection_state()
    }

    /// 阻塞直到链路连通（无超时）
    pub fn confirm_connection(&self) -> Result<()> {
        self.session.confirm_connection(None)
    }

    /// 阻塞直到链路连通，超过 `limit` 返回 [`ClientError::ConnectionTimeout`](crate::ClientError::ConnectionTimeout)
    pub fn confirm_connection_timeout(&self, limit: Duration) -> Result<()> {
        self.session.confirm_connection(Some(limit))
    }

    /// 开启/关闭 API 控制（由远端执行门控）
    pub fn enable_api_control(&self, enabled: bool) -> Result<()> {
        self.session.enable_api_control(enabled)
    }

    pub fn is_api_control_enabled(&self) -> Result<bool> {
        self.session.is_api_control_enabled()
    }

    /// 将车辆恢复到初始状态
    pub fn reset(&self) -> Result<()> {
        self.session.call("reset", &())
    }

    /// 直接设置车辆位姿
    pub fn sim_set_pose(&self, pose: &Pose, ignore_collision: bool) -> Result<()> {
        self.session
            .call("simSetPose", &(WirePose::from_domain(pose), ignore_collision))
    }

    pub fn sim_get_pose(&self) -> Result<Pose> {
        let wire: WirePose = self.session.call("simGetPose", &())?;
        Ok(wire.to_domain())
    }

    /// 批量采集图像，响应与请求按位置一一对应
    pub fn sim_get_images(&self, requests: &[ImageRequest]) -> Result<Vec<ImageResponse>> {
        self.session.sim_get_images(requests)
    }

    /// 采集单张图像，没有图像时返回空数据
    pub fn sim_get_image(&self, camera_id: i32, image_type: ImageType) -> Result<Vec<u8>> {
        self.session.sim_get_image(camera_id, image_type)
    }

    pub fn home_geo_point(&self) -> Result<GeoPoint> {
        self.session.home_geo_point()
    }
}

impl std::fmt::Debug for VehicleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleClient")
            .field("endpoint", &self.session.endpoint())
            .finish()
    }
}
