//! 链路状态
//!
//! 传输层发布的原始链路状态，以 `u8` 编码存放在原子变量中，
//! 查询方无需获取连接锁即可读取最近一次发布的状态。

use num_enum::{FromPrimitive, IntoPrimitive};
use std::sync::atomic::{AtomicU8, Ordering};

/// 传输层链路状态
///
/// 上层必须为未知取值保留兜底分支（`#[non_exhaustive]`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[non_exhaustive]
pub enum LinkStatus {
    /// 尚未尝试连接
    Initial = 0,
    /// 已连接
    Connected = 1,
    /// 对端有序关闭或连接失败
    Disconnected = 2,
    /// 对端重置连接
    Reset = 3,
    /// 正在连接
    Connecting = 4,
    /// 无法识别的编码
    #[num_enum(default)]
    Unknown = 0xFF,
}

impl LinkStatus {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

/// 链路状态（原子版本，用于线程间共享）
#[derive(Debug)]
pub struct AtomicLinkStatus {
    inner: AtomicU8,
}

impl AtomicLinkStatus {
    pub fn new(status: LinkStatus) -> Self {
        Self {
            inner: AtomicU8::new(status.into()),
        }
    }

    /// 读取最近一次发布的状态
    pub fn get(&self) -> LinkStatus {
        LinkStatus::from_primitive(self.inner.load(Ordering::Acquire))
    }

    /// 发布新状态
    pub fn set(&self, status: LinkStatus) {
        self.inner.store(status.into(), Ordering::Release);
    }
}

impl Default for AtomicLinkStatus {
    fn default() -> Self {
        Self::new(LinkStatus::Initial)
    }
}
