//! 车辆控制指令与遥测状态

use crate::types::{CollisionInfo, Quaternionr, Vector3r};

/// 车辆控制指令
///
/// `throttle`、`steering`、`brake` 约定取值 [-1, 1]（协议层不做裁剪）。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarControls {
    pub throttle: f32,
    pub steering: f32,
    pub brake: f32,
    pub handbrake: bool,
    /// 是否使用手动挡位
    pub is_manual_gear: bool,
    /// 手动挡位（-1 为倒挡）
    pub manual_gear: i32,
    /// 立即换挡
    pub gear_immediate: bool,
}

impl Default for CarControls {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            steering: 0.0,
            brake: 0.0,
            handbrake: false,
            is_manual_gear: false,
            manual_gear: 0,
            gear_immediate: true,
        }
    }
}

impl CarControls {
    /// 按前进/倒车方向设置油门
    ///
    /// - 前进：`manual_gear = 0`，`throttle = |value|`
    /// - 倒车：`manual_gear = -1`，`throttle = -|value|`
    ///
    /// 两种情况下 `is_manual_gear` 都被置为 `false`。
    pub fn set_throttle(&mut self, value: f32, forward: bool) {
        self.is_manual_gear = false;
        if forward {
            self.manual_gear = 0;
            self.throttle = value.abs();
        } else {
            self.manual_gear = -1;
            self.throttle = -value.abs();
        }
    }

    /// `throttle`/`steering`/`brake` 是否都在 [-1, 1] 内
    pub fn is_within_range(&self) -> bool {
        [self.throttle, self.steering, self.brake]
            .iter()
            .all(|v| (-1.0..=1.0).contains(v))
    }
}

/// 车辆遥测快照
///
/// 每次调用由远端生成，对客户端只读。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarState {
    /// 速度（米/秒）
    pub speed: f32,
    pub gear: i32,
    pub position: Vector3r,
    pub velocity: Vector3r,
    pub orientation: Quaternionr,
    pub collision: CollisionInfo,
    /// 时间戳（纳秒）
    pub timestamp: u64,
}
