//! 调用分发器
//!
//! [`RpcClient`] 持有唯一的 TCP 连接（位于互斥锁之后），每次调用是一次阻塞往返：
//!
//! 1. 已持有的连接先做一次非阻塞探测，对端已关闭则丢弃
//! 2. 链路断开时先做一次有界的连接尝试，失败则返回 [`RpcError::NotConnected`]
//! 3. 发送 Call 帧，按序列号等待匹配的 Reply/Fault（过期回复直接丢弃），
//!    整条回复共享同一个截止时间
//! 4. 超时或连接损坏时丢弃连接，下一次调用或状态查询时重新连接
//!
//! 调用本身从不重试。

use crate::config::EndpointConfig;
use crate::frame::{self, FrameError, Message, MessageType};
use crate::status::{AtomicLinkStatus, LinkStatus};
use crate::RpcError;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// 调用分发器
pub struct RpcClient {
    config: EndpointConfig,
    stream: Mutex<Option<TcpStream>>,
    status: AtomicLinkStatus,
    seq: AtomicU32,
}

/// 连接探测结果
enum Probe {
    Alive,
    Closed,
    Reset,
}

impl RpcClient {
    /// 创建分发器（不立即连接）
    pub fn new(config: EndpointConfig) -> Result<Self, RpcError> {
        config.validate()?;
        Ok(Self {
            config,
            stream: Mutex::new(None),
            status: AtomicLinkStatus::new(LinkStatus::Initial),
            seq: AtomicU32::new(0),
        })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// 立即尝试建立连接（已连接时直接返回）
    pub fn connect(&self) -> Result<(), RpcError> {
        let mut slot = self.stream.lock();
        self.ensure_connected(&mut slot).map(|_| ())
    }

    /// 当前链路状态
    ///
    /// - 有连接时探测套接字：对端有序关闭 → `Disconnected`，对端重置 → `Reset`
    /// - 没有连接时做一次有界的重连尝试
    /// - 其他线程正在调用时不探测，直接返回最近发布的状态
    pub fn status(&self) -> LinkStatus {
        let Some(mut slot) = self.stream.try_lock() else {
            return self.status.get();
        };

        if slot.is_some() {
            self.check_kept_stream(&mut slot);
            return self.status.get();
        }

        if let Err(e) = self.ensure_connected(&mut slot) {
            trace!("{}: reconnect attempt failed: {}", self.config, e);
        }
        self.status.get()
    }

    /// 最近一次发布的状态（不探测、不重连）
    pub fn last_status(&self) -> LinkStatus {
        self.status.get()
    }

    /// 执行一次远程调用
    ///
    /// `args` 为位置参数元组（无参数用 `()`，单参数用 `(value,)`）。
    pub fn call<A, R>(&self, method: &str, args: &A) -> Result<R, RpcError>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params =
            bincode::serialize(args).map_err(|e| RpcError::Serialization(e.to_string()))?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

        let mut slot = self.stream.lock();
        // 对端已关闭的连接在调用前丢弃，由 ensure_connected 重新打开
        self.check_kept_stream(&mut slot);
        let stream = self.ensure_connected(&mut slot)?;

        let started = Instant::now();
        let result = self.exchange(stream, seq, method, params);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let body = match result {
            Ok(body) => {
                debug!(method, seq, elapsed_ms, "call completed");
                body
            },
            Err(e) => {
                if e.breaks_stream() {
                    let status = if e.is_reset() {
                        LinkStatus::Reset
                    } else {
                        LinkStatus::Disconnected
                    };
                    self.discard(&mut slot, status);
                }
                warn!(method, seq, elapsed_ms, "call failed: {}", e);
                return Err(e);
            },
        };
        drop(slot);

        bincode::deserialize(&body).map_err(|e| {
            RpcError::Serialization(format!("failed to decode result of '{}': {}", method, e))
        })
    }

    /// 探测已持有的连接，对端关闭或重置时丢弃
    fn check_kept_stream(&self, slot: &mut Option<TcpStream>) {
        let Some(stream) = slot.as_ref() else {
            return;
        };
        match probe(stream) {
            Probe::Alive => {
                self.status.set(LinkStatus::Connected);
            },
            Probe::Closed => {
                debug!("{}: peer closed the connection", self.config);
                self.discard(slot, LinkStatus::Disconnected);
            },
            Probe::Reset => {
                debug!("{}: connection reset by peer", self.config);
                self.discard(slot, LinkStatus::Reset);
            },
        }
    }

    fn ensure_connected<'a>(
        &self,
        slot: &'a mut Option<TcpStream>,
    ) -> Result<&'a mut TcpStream, RpcError> {
        if slot.is_none() {
            self.status.set(LinkStatus::Connecting);
            match self.open_stream() {
                Ok(stream) => {
                    info!("Connected to {}", self.config);
                    *slot = Some(stream);
                    self.status.set(LinkStatus::Connected);
                },
                Err(e) => {
                    self.status.set(LinkStatus::Disconnected);
                    return Err(e);
                },
            }
        }
        slot.as_mut()
            .ok_or_else(|| RpcError::NotConnected(self.config.to_string()))
    }

    fn open_stream(&self) -> Result<TcpStream, RpcError> {
        let addrs = self
            .config
            .resolve()
            .map_err(|e| RpcError::NotConnected(format!("{}: {}", self.config, e)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout()) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                },
                Err(e) => last_error = Some(e),
            }
        }

        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(RpcError::NotConnected(format!("{}: {}", self.config, reason)))
    }

    fn exchange(
        &self,
        stream: &mut TcpStream,
        seq: u32,
        method: &str,
        params: Vec<u8>,
    ) -> Result<Vec<u8>, RpcError> {
        let timeout = self.config.timeout();
        let timed_out = || RpcError::Timeout {
            method: method.to_string(),
            timeout_ms: self.config.timeout_ms,
        };
        let map_timeout = |e: RpcError| if e.is_timeout() { timed_out() } else { e };

        stream.set_write_timeout(Some(timeout))?;
        let call = Message::Call {
            method: method.to_string(),
            params,
        };
        frame::write_message(stream, seq, &call).map_err(map_timeout)?;

        let mut reader = DeadlineReader {
            stream,
            deadline: Instant::now().checked_add(timeout),
        };
        loop {
            let (reply_seq, message) = frame::read_message(&mut reader).map_err(map_timeout)?;
            if reply_seq != seq {
                warn!(
                    method,
                    expected = seq,
                    got = reply_seq,
                    "discarding stale reply"
                );
                continue;
            }

            return match message {
                Message::Reply(body) => Ok(body),
                Message::Fault(message) => Err(RpcError::Remote {
                    method: method.to_string(),
                    message,
                }),
                Message::Call { .. } => Err(RpcError::Frame(FrameError::InvalidMessageType(
                    MessageType::Call.into(),
                ))),
            };
        }
    }

    fn discard(&self, slot: &mut Option<TcpStream>, status: LinkStatus) {
        if let Some(stream) = slot.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.status.set(status);
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.get_mut().take() {
            let _ = stream.shutdown(Shutdown::Both);
            debug!("{}: connection released", self.config);
        }
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.config.to_string())
            .field("status", &self.status.get())
            .finish()
    }
}

/// 整条消息共享一个截止时间的读取器
///
/// `read_exact` 会多次调用 `read`，每次调用前按剩余时间重设套接字读超时，
/// 对端逐字节慢发也不会超过截止时间。`deadline` 为 `None` 表示不限时。
struct DeadlineReader<'a> {
    stream: &'a mut TcpStream,
    deadline: Option<Instant>,
}

impl Read for DeadlineReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(io::Error::from(io::ErrorKind::TimedOut));
                }
                Some(remaining)
            },
            None => None,
        };
        self.stream.set_read_timeout(remaining)?;
        self.stream.read(buf)
    }
}

/// 非阻塞 peek 探测连接（不消费数据）
fn probe(stream: &TcpStream) -> Probe {
    if stream.set_nonblocking(true).is_err() {
        return Probe::Closed;
    }
    let mut buf = [0u8; 1];
    let result = stream.peek(&mut buf);
    if stream.set_nonblocking(false).is_err() {
        return Probe::Closed;
    }

    match result {
        Ok(0) => Probe::Closed,
        // 有未读数据（例如超时后到达的过期回复）
        Ok(_) => Probe::Alive,
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Probe::Alive,
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
            ) =>
        {
            Probe::Reset
        },
        Err(_) => Probe::Closed,
    }
}
