//! 远端调用宿主
//!
//! 只用于承载固定的车辆控制调用（模拟器和测试），不是通用 RPC 框架。
//!
//! - 接收线程：非阻塞 `accept`，每 10ms 检查一次停止标志
//! - 每个连接一个工作线程，按序处理该连接上的调用
//! - [`ServerHandle`] 被 drop 时停止接收并关闭所有连接

use crate::frame::{self, Message};
use crate::RpcError;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

type Handler = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, String> + Send + Sync>;

/// 接收循环的轮询间隔
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 远端调用宿主
#[derive(Default)]
pub struct RpcServer {
    handlers: HashMap<String, Handler>,
}

impl RpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册方法
    ///
    /// `A` 为位置参数元组，处理函数返回 `Err(message)` 时向调用方发送 Fault。
    pub fn bind<A, R, F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(A) -> Result<R, String> + Send + Sync + 'static,
    {
        let method = name.to_string();
        let wrapped: Handler = Box::new(move |params: &[u8]| {
            let args: A = bincode::deserialize(params)
                .map_err(|e| format!("invalid arguments for '{}': {}", method, e))?;
            let result = handler(args)?;
            bincode::serialize(&result).map_err(|e| e.to_string())
        });
        self.handlers.insert(name.to_string(), wrapped);
        self
    }

    /// 是否注册了该方法
    pub fn has_method(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// 在后台开始服务
    ///
    /// 绑定端口 0 时由系统分配端口，可通过 [`ServerHandle::local_addr`] 获取。
    pub fn serve(self, addr: impl ToSocketAddrs) -> Result<ServerHandle, RpcError> {
        let listener = TcpListener::bind(addr).map_err(RpcError::Bind)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let shared = Arc::new(Shared {
            handlers: self.handlers,
            stop: AtomicBool::new(false),
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        });

        let accept_shared = shared.clone();
        let accept_thread = thread::Builder::new()
            .name("airlink-rpc-accept".to_string())
            .spawn(move || accept_loop(listener, accept_shared))?;

        info!("RPC server listening on {}", local_addr);
        Ok(ServerHandle {
            local_addr,
            shared,
            accept_thread: Some(accept_thread),
        })
    }
}

struct Shared {
    handlers: HashMap<String, Handler>,
    stop: AtomicBool,
    /// 活动连接（用于停止时主动关闭）
    connections: Mutex<HashMap<u64, TcpStream>>,
    next_id: AtomicU64,
}

/// 后台服务句柄
pub struct ServerHandle {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    accept_thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 当前活动连接数
    pub fn connection_count(&self) -> usize {
        self.shared.connections.lock().len()
    }

    /// 关闭所有已建立的连接（继续接收新连接）
    pub fn close_connections(&self) {
        let mut connections = self.shared.connections.lock();
        for (_, stream) in connections.drain() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// 停止服务并关闭所有连接
    pub fn shutdown(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }
        self.close_connections();
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    while !shared.stop.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = register_connection(stream, peer, &shared) {
                    warn!("Failed to set up connection from {}: {}", peer, e);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            },
            Err(e) => {
                warn!("Accept failed: {}", e);
                thread::sleep(ACCEPT_POLL_INTERVAL);
            },
        }
    }
    debug!("Accept loop stopped");
}

fn register_connection(
    stream: TcpStream,
    peer: SocketAddr,
    shared: &Arc<Shared>,
) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_nodelay(true)?;

    let id = shared.next_id.fetch_add(1, Ordering::Relaxed);
    shared.connections.lock().insert(id, stream.try_clone()?);

    let worker_shared = shared.clone();
    thread::Builder::new()
        .name(format!("airlink-rpc-conn-{}", id))
        .spawn(move || {
            debug!("Client {} connected", peer);
            serve_connection(stream, &worker_shared);
            worker_shared.connections.lock().remove(&id);
            debug!("Client {} disconnected", peer);
        })?;
    Ok(())
}

fn serve_connection(mut stream: TcpStream, shared: &Shared) {
    loop {
        let (seq, message) = match frame::read_message(&mut stream) {
            Ok(frame) => frame,
            Err(RpcError::ConnectionClosed) => return,
            Err(e) => {
                if !shared.stop.load(Ordering::Acquire) {
                    debug!("Connection error: {}", e);
                }
                return;
            },
        };

        let reply = match message {
            Message::Call { method, params } => match shared.handlers.get(&method) {
                Some(handler) => match handler(&params) {
                    Ok(body) => Message::Reply(body),
                    Err(message) => {
                        debug!(method = %method, "call faulted: {}", message);
                        Message::Fault(message)
                    },
                },
                None => {
                    warn!("Unknown method '{}'", method);
                    Message::Fault(format!("unknown method '{}'", method))
                },
            },
            other => {
                warn!("Ignoring unexpected {:?} frame from client", other.msg_type());
                continue;
            },
        };

        if let Err(e) = frame::write_message(&mut stream, seq, &reply) {
            debug!("Failed to write reply: {}", e);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EndpointConfig, LinkStatus, RpcClient};
    use std::sync::atomic::AtomicI32;

    fn client_for(handle: &ServerHandle) -> RpcClient {
        RpcClient::new(EndpointConfig {
            host: "127.0.0.1".to_string(),
            port: handle.local_addr().port(),
            timeout_ms: 2_000,
            connect_timeout_ms: 1_000,
        })
        .unwrap()
    }

    fn echo_server() -> ServerHandle {
        let counter = Arc::new(AtomicI32::new(0));
        let mut server = RpcServer::new();
        server
            .bind("ping", |(): ()| Ok(true))
            .bind("add", |(a, b): (i32, i32)| Ok(a + b))
            .bind("bump", move |(): ()| {
                Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
            })
            .bind("fail", |(): ()| -> Result<(), String> { Err("boom".to_string()) })
            .bind("slow", |(ms,): (u64,)| {
                thread::sleep(Duration::from_millis(ms));
                Ok(ms)
            });
        assert!(server.has_method("add"));
        server.serve("127.0.0.1:0").unwrap()
    }

    #[test]
    fn test_call_roundtrip() {
        let handle = echo_server();
        let client = client_for(&handle);

        let alive: bool = client.call("ping", &()).unwrap();
        assert!(alive);
        let sum: i32 = client.call("add", &(40, 2)).unwrap();
        assert_eq!(sum, 42);
        assert_eq!(client.status(), LinkStatus::Connected);
    }

    #[test]
    fn test_calls_are_ordered() {
        let handle = echo_server();
        let client = client_for(&handle);
        for expected in 1..=5 {
            let value: i32 = client.call("bump", &()).unwrap();
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn test_remote_fault() {
        let handle = echo_server();
        let client = client_for(&handle);

        let err = client.call::<_, ()>("fail", &()).unwrap_err();
        assert!(matches!(err, RpcError::Remote { ref message, .. } if message == "boom"));

        // Fault 不破坏连接
        let alive: bool = client.call("ping", &()).unwrap();
        assert!(alive);
    }

    #[test]
    fn test_unknown_method() {
        let handle = echo_server();
        let client = client_for(&handle);
        let err = client.call::<_, ()>("fly", &()).unwrap_err();
        assert!(matches!(err, RpcError::Remote { ref message, .. } if message.contains("fly")));
    }

    #[test]
    fn test_bad_arguments_fault() {
        let handle = echo_server();
        let client = client_for(&handle);
        let err = client.call::<_, i32>("add", &(1u8,)).unwrap_err();
        assert!(matches!(err, RpcError::Remote { .. }));
    }

    #[test]
    fn test_timeout_discards_connection() {
        let handle = echo_server();
        let client = RpcClient::new(EndpointConfig {
            host: "127.0.0.1".to_string(),
            port: handle.local_addr().port(),
            timeout_ms: 100,
            connect_timeout_ms: 1_000,
        })
        .unwrap();

        let err = client.call::<_, u64>("slow", &(400u64,)).unwrap_err();
        assert!(err.is_timeout());

        // 超时后连接被丢弃，下一次调用重新连接
        thread::sleep(Duration::from_millis(400));
        let sum: i32 = client.call("add", &(1, 2)).unwrap();
        assert_eq!(sum, 3);
    }

    #[test]
    fn test_peer_close_reported_then_reconnect() {
        let handle = echo_server();
        let client = client_for(&handle);
        let _: bool = client.call("ping", &()).unwrap();

        handle.close_connections();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(client.status(), LinkStatus::Disconnected);

        // 链路断开时查询会尝试重连
        assert_eq!(client.status(), LinkStatus::Connected);
    }

    #[test]
    fn test_shutdown_stops_server() {
        let mut handle = echo_server();
        let client = client_for(&handle);
        let _: bool = client.call("ping", &()).unwrap();

        handle.shutdown();
        let result: Result<bool, _> = client.call("ping", &());
        assert!(result.is_err());
    }
}
