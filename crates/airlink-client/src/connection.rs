//! 连接状态机
//!
//! 连接状态每次查询时从传输层实时获取（不缓存）。
//! `confirm_connection` 按固定间隔轮询，直到观察到 `Connected`。

use crate::error::{ClientError, Result};
use airlink_rpc::LinkStatus;
use std::fmt;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// 链路状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 尚未连接
    Initial,
    Connected,
    /// 对端关闭或连接失败
    Disconnected,
    /// 对端重置连接
    Reset,
    /// 无法确定
    Unknown,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl From<LinkStatus> for ConnectionState {
    fn from(status: LinkStatus) -> Self {
        match status {
            LinkStatus::Initial => ConnectionState::Initial,
            LinkStatus::Connected => ConnectionState::Connected,
            LinkStatus::Disconnected => ConnectionState::Disconnected,
            LinkStatus::Reset => ConnectionState::Reset,
            // Connecting 是瞬态；以及传输层将来新增的状态
            _ => ConnectionState::Unknown,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Initial => "Initial",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Reset => "Reset",
            ConnectionState::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// 轮询直到 `probe()` 返回 `Connected`
///
/// 进度输出：`Waiting for connection - `，每次失败的轮询追加一个 `X`，成功后输出 `Connected!`。
/// `limit` 为 `None` 时无限等待。输出失败不影响等待。
pub(crate) fn wait_for_connected<P, W>(
    mut probe: P,
    out: &mut W,
    interval: Duration,
    limit: Option<Duration>,
) -> Result<()>
where
    P: FnMut() -> ConnectionState,
    W: Write,
{
    let started = Instant::now();
    let _ = write!(out, "Waiting for connection - ");
    let _ = out.flush();

    loop {
        if probe().is_connected() {
            break;
        }
        let _ = write!(out, "X");
        let _ = out.flush();

        let mut sleep_for = interval;
        if let Some(limit) = limit {
            let elapsed = started.elapsed();
            if elapsed >= limit {
                let _ = writeln!(out);
                return Err(ClientError::ConnectionTimeout {
                    waited_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                });
            }
            sleep_for = sleep_for.min(limit - elapsed);
        }
        thread::sleep(sleep_for);
    }

    let _ = writeln!(out, "\nConnected!");
    let _ = out.flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_link_status() {
        assert_eq!(
            ConnectionState::from(LinkStatus::Connected),
            ConnectionState::Connected
        );
        assert_eq!(
            ConnectionState::from(LinkStatus::Reset),
            ConnectionState::Reset
        );
        assert_eq!(
            ConnectionState::from(LinkStatus::Connecting),
            ConnectionState::Unknown
        );
        assert_eq!(
            ConnectionState::from(LinkStatus::Unknown),
            ConnectionState::Unknown
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
    }

    #[test]
    fn test_wait_returns_on_poll_after_connected() {
        let mut polls = 0;
        let mut out = Vec::new();
        let result = wait_for_connected(
            || {
                polls += 1;
                if polls >= 4 {
                    ConnectionState::Connected
                } else {
                    ConnectionState::Disconnected
                }
            },
            &mut out,
            Duration::from_millis(1),
            None,
        );

        assert!(result.is_ok());
        assert_eq!(polls, 4);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Waiting for connection - XXX\nConnected!\n");
    }

    #[test]
    fn test_wait_connected_immediately() {
        let mut out = Vec::new();
        wait_for_connected(
            || ConnectionState::Connected,
            &mut out,
            Duration::from_secs(10),
            None,
        )
        .unwrap();
        assert!(!String::from_utf8(out).unwrap().contains('X'));
    }

    #[test]
    fn test_wait_never_returns_early_on_other_states() {
        let states = [
            ConnectionState::Initial,
            ConnectionState::Reset,
            ConnectionState::Unknown,
            ConnectionState::Disconnected,
            ConnectionState::Connected,
        ];
        let mut iter = states.iter();
        let mut seen = Vec::new();
        wait_for_connected(
            || {
                let state = *iter.next().unwrap();
                seen.push(state);
                state
            },
            &mut Vec::<u8>::new(),
            Duration::from_millis(1),
            None,
        )
        .unwrap();
        assert_eq!(seen.len(), states.len());
    }

    #[test]
    fn test_wait_with_limit_times_out() {
        let mut out: Vec<u8> = Vec::new();
        let started = Instant::now();
        let result = wait_for_connected(
            || ConnectionState::Disconnected,
            &mut out,
            Duration::from_millis(20),
            Some(Duration::from_millis(100)),
        );

        assert!(matches!(result, Err(ClientError::ConnectionTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
