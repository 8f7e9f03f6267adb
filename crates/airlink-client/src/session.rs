//! 共享会话
//!
//! 调用分发器 + 连接状态机 + 所有车辆共有的调用。
//! 两个门面都组合一个 `Session`，互不继承。

use crate::connection::{self, ConnectionState};
use crate::error::Result;
use airlink_protocol::{
    GeoPoint, ImageRequest, ImageResponse, ImageType, WireAdapter, WireGeoPoint,
    WireImageRequest, WireImageResponse, from_domain_seq, strip_empty_placeholder, to_domain_seq,
};
use airlink_rpc::{RpcClient, RpcError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) struct Session {
    rpc: RpcClient,
    poll_interval: Duration,
}

impl Session {
    pub(crate) fn new(rpc: RpcClient, poll_interval: Duration) -> Self {
        Self { rpc, poll_interval }
    }

    pub(crate) fn endpoint(&self) -> String {
        self.rpc.config().to_string()
    }

    pub(crate) fn call<A, R>(&self, method: &str, args: &A) -> Result<R>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        Ok(self.rpc.call(method, args)?)
    }

    pub(crate) fn ping(&self) -> Result<bool> {
        self.call("ping", &())
    }

    pub(crate) fn connection_state(&self) -> ConnectionState {
        self.rpc.status().into()
    }

    pub(crate) fn confirm_connection(&self, limit: Option<Duration>) -> Result<()> {
        let mut out = std::io::stdout();
        connection::wait_for_connected(
            || self.connection_state(),
            &mut out,
            self.poll_interval,
            limit,
        )
    }

    pub(crate) fn enable_api_control(&self, enabled: bool) -> Result<()> {
        self.call("enableApiControl", &(enabled,))
    }

    pub(crate) fn is_api_control_enabled(&self) -> Result<bool> {
        self.call("isApiControlEnabled", &())
    }

    pub(crate) fn sim_get_images(&self, requests: &[ImageRequest]) -> Result<Vec<ImageResponse>> {
        let wire_requests: Vec<WireImageRequest> = from_domain_seq(requests);
        let wire_responses: Vec<WireImageResponse> =
            self.call("simGetImages", &(wire_requests,))?;
        // 请求与响应按位置对应，数量不符时无法对齐
        if wire_responses.len() != requests.len() {
            return Err(RpcError::Serialization(format!(
                "simGetImages returned {} responses for {} requests",
                wire_responses.len(),
                requests.len()
            ))
            .into());
        }
        Ok(to_domain_seq(&wire_responses))
    }

    pub(crate) fn sim_get_image(&self, camera_id: i32, image_type: ImageType) -> Result<Vec<u8>> {
        let data: Vec<u8> = self.call("simGetImage", &(camera_id, image_type))?;
        Ok(strip_empty_placeholder(data))
    }

    pub(crate) fn home_geo_point(&self) -> Result<GeoPoint> {
        let wire: WireGeoPoint = self.call("getHomeGeoPoint", &())?;
        Ok(wire.to_domain())
    }
}
