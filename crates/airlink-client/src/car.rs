//! 小车客户端
//!
//! 与通用客户端共享连接和通用调用，额外提供控制指令和遥测；不提供 `reset` 和位姿覆盖。

use crate::builder::ClientBuilder;
use crate::connection::ConnectionState;
use crate::error::Result;
use crate::session::Session;
use airlink_protocol::{
    CarControls, CarState, GeoPoint, ImageRequest, ImageResponse, ImageType, WireAdapter,
    WireCarControls, WireCarState,
};
use std::time::Duration;

/// 小车客户端
///
/// # 示例
///
/// ```rust,no_run
/// use airlink_client::CarClient;
/// use airlink_protocol::CarControls;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), airlink_client::ClientError> {
/// let car = CarClient::new("localhost", 42451, Duration::from_secs(60))?;
/// car.confirm_connection()?;
/// car.enable_api_control(true)?;
///
/// let mut controls = CarControls::default();
/// controls.set_throttle(0.5, true);
/// car.set_car_controls(&controls)?;
///
/// let state = car.car_state()?;
/// println!("speed = {:.2} m/s", state.speed);
/// # Ok(())
/// # }
/// ```
pub struct CarClient {
    session: Session,
}

impl CarClient {
    /// 使用指定端点创建客户端（连接超时等其他参数使用默认值）
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Result<Self> {
        ClientBuilder::new()
            .host(host)
            .port(port)
            .timeout(timeout)
            .build_car()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_session(session: Session) -> Self {
        Self { session }
    }

    pub fn ping(&self) -> Result<bool> {
        self.session.ping()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session.connection_state()
    }

    /// 阻塞直到链路连通（无超时）
    pub fn confirm_connection(&self) -> Result<()> {
        self.session.confirm_connection(None)
    }

    pub fn confirm_connection_timeout(&self, limit: Duration) -> Result<()> {
        self.session.confirm_connection(Some(limit))
    }

    pub fn enable_api_control(&self, enabled: bool) -> Result<()> {
        self.session.enable_api_control(enabled)
    }

    pub fn is_api_control_enabled(&self) -> Result<bool> {
        self.session.is_api_control_enabled()
    }

    pub fn sim_get_images(&self, requests: &[ImageRequest]) -> Result<Vec<ImageResponse>> {
        self.session.sim_get_images(requests)
    }

    pub fn sim_get_image(&self, camera_id: i32, image_type: ImageType) -> Result<Vec<u8>> {
        self.session.sim_get_image(camera_id, image_type)
    }

    pub fn home_geo_point(&self) -> Result<GeoPoint> {
        self.session.home_geo_point()
    }

    /// 发送控制指令
    ///
    /// API 控制未开启时远端会忽略该指令（不返回错误）。
    pub fn set_car_controls(&self, controls: &CarControls) -> Result<()> {
        self.session
            .call("setCarControls", &(WireCarControls::from_domain(controls),))
    }

    /// 获取遥测快照
    pub fn car_state(&self) -> Result<CarState> {
        let wire: WireCarState = self.session.call("getCarState", &())?;
        Ok(wire.to_domain())
    }
}

impl std::fmt::Debug for CarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarClient")
            .field("endpoint", &self.session.endpoint())
            .finish()
    }
}
