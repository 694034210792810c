// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 服务器主循环
//!
//! 单线程的就绪复用循环。每个 tick：
//! 1. 通过 [`Activity::wait`] 等待任一 Socket 可读；
//! 2. 监听 Socket 可读则接受新连接并加入连接集合；
//! 3. 客户端 Socket 可读则读入共享的接收缓冲区并解析请求；
//! 4. 解析成功的请求交给应用回调，回调返回 `false` 时关闭该连接。
//!
//! 接收缓冲区在同一 tick 内被所有客户端复用，请求在解析时已经复制出全部数据，
//! 因此不会有两个请求同时引用同一份缓冲区。

use crate::{
    buffer::ByteBuffer,
    config::Config,
    connection::{ConnectionSet, SocketHandle},
    exception::Exception,
    multiplexer::Activity,
    request::Request,
};

use log::{debug, error, info, warn};

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

/// 应用回调。返回 `true` 表示保持连接，等待后续 tick 上的新请求。
pub trait Handler {
    fn on_request(&mut self, request: &Request, client: &mut TcpStream) -> bool;
}

impl<F> Handler for F
where
    F: FnMut(&Request, &mut TcpStream) -> bool,
{
    fn on_request(&mut self, request: &Request, client: &mut TcpStream) -> bool {
        self(request, client)
    }
}

pub struct Server<H: Handler> {
    server: SocketHandle,
    active_sockets: ConnectionSet,
    activity: Activity,
    inbuf: ByteBuffer,
    handler: H,
    max_header_lines: usize,
    write_timeout: Option<Duration>,
    tick_timeout_us: u64,
    trace: bool,
    active_clients: Arc<AtomicUsize>,
}

impl<H: Handler> Server<H> {
    /// 绑定端口并开始监听。操作系统拒绝时返回 `BindFailed`，调用方不应继续。
    pub fn open(config: &Config, handler: H) -> Result<Self, Exception> {
        let address = match config.local() {
            true => Ipv4Addr::new(127, 0, 0, 1),
            false => Ipv4Addr::new(0, 0, 0, 0),
        };
        let socket = SocketAddrV4::new(address, config.port());

        let listener = match TcpListener::bind(socket) {
            Ok(listener) => listener,
            Err(e) => {
                error!("无法绑定端口：{}，错误：{}", config.port(), e);
                return Err(Exception::BindFailed);
            }
        };
        // 监听 Socket 就绪但连接已消失时，accept 应立即返回而不是阻塞
        if let Err(e) = listener.set_nonblocking(true) {
            error!("无法将监听Socket设为非阻塞：{}", e);
            return Err(Exception::BindFailed);
        }
        info!("服务端在{}上监听Socket连接", socket);

        let mut active_sockets = ConnectionSet::with_capacity(8);
        let server = active_sockets.add_listener(listener);

        let write_timeout = match config.write_timeout_ms() {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        Ok(Self {
            server,
            active_sockets,
            activity: Activity::with_capacity(8),
            inbuf: ByteBuffer::with_capacity(config.recv_buffer_size()),
            handler,
            max_header_lines: config.max_header_lines(),
            write_timeout,
            tick_timeout_us: config.tick_timeout_us(),
            trace: config.trace(),
            active_clients: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// 实际监听的地址，端口为 0 时可以由此得知系统分配的端口
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.active_sockets
            .listener(self.server)
            .and_then(|l| l.local_addr().ok())
    }

    /// 连接集合的大小（包括监听 Socket）
    pub fn connection_count(&self) -> usize {
        self.active_sockets.len()
    }

    /// 当前客户端连接数的共享计数，供控制台查询
    pub fn active_connections(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active_clients)
    }

    /// 是否记录新连接与请求等诊断信息
    pub fn trace(&self) -> bool {
        self.trace
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// 最多阻塞 `timeout_us` 微秒，0 表示只轮询一次。没有任何 Socket 就绪时返回 `false`。
    pub fn tick(&mut self, timeout_us: u64) -> bool {
        if !self.activity.wait(&self.active_sockets, timeout_us) {
            return false;
        }

        let ready = self.activity.take_ready();
        for &s in &ready {
            if s == self.server {
                self.accept_client();
            } else {
                self.serve_client(s);
            }
        }
        self.activity.restore_ready(ready);

        true
    }

    fn accept_client(&mut self) -> Option<SocketHandle> {
        let listener = self.active_sockets.listener(self.server)?;
        let (stream, addr) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if self.trace {
                    debug!("监听Socket就绪但没有待接受的连接");
                }
                return None;
            }
            Err(e) => {
                warn!("接受新连接失败：{}", e);
                return None;
            }
        };

        if let Err(e) = stream.set_nonblocking(false) {
            warn!("无法将客户端Socket设为阻塞模式：{}", e);
        }
        if let Err(e) = stream.set_write_timeout(self.write_timeout) {
            warn!("无法设置客户端写超时：{}", e);
        }

        let client = self.active_sockets.add(stream);
        self.active_clients.fetch_add(1, Ordering::Relaxed);
        if self.trace {
            debug!("[fd{}]New client {}", client, addr);
        }
        Some(client)
    }

    fn serve_client(&mut self, s: SocketHandle) {
        let stream = match self.active_sockets.client_mut(s) {
            Some(stream) => stream,
            None => return,
        };

        match self.inbuf.recv(stream) {
            Ok(0) => {
                debug!("[fd{}]客户端关闭了连接", s);
                self.remove(s);
                return;
            }
            Ok(n) => {
                if self.trace {
                    debug!("[fd{}]读入{}字节", s, n);
                }
            }
            Err(e)
                if e.kind() == io::ErrorKind::Interrupted
                    || e.kind() == io::ErrorKind::WouldBlock =>
            {
                return;
            }
            Err(e) => {
                debug!("[fd{}]读取失败：{}", s, e);
                self.remove(s);
                return;
            }
        }

        let request = match Request::try_from(&self.inbuf, s, self.max_header_lines) {
            Ok(r) => r,
            Err(e) => {
                if self.trace {
                    debug!("[fd{}]{}，本次忽略", s, e);
                }
                return;
            }
        };
        if self.trace {
            debug!("[fd{}]{} {}", s, request.method(), request.url());
        }

        let keep_open = match self.active_sockets.client_mut(s) {
            Some(stream) => self.handler.on_request(&request, stream),
            None => false,
        };
        if !keep_open {
            self.remove(s);
        }
    }

    fn remove(&mut self, s: SocketHandle) {
        if self.active_sockets.remove(s) && s != self.server {
            self.active_clients.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// 以配置的超时不停地 tick
    pub fn run_forever(&mut self) -> ! {
        loop {
            if !self.tick(self.tick_timeout_us) && self.trace {
                debug!(".");
            }
        }
    }

    /// 不停地 tick，直到 `stop` 被置位。每个 tick 之间检查一次。
    pub fn run_until(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            if !self.tick(self.tick_timeout_us) && self.trace {
                debug!(".");
            }
        }
        info!("主循环接收到停机指令，正在退出...");
    }

    /// 关闭全部连接，包括监听 Socket
    pub fn close(&mut self) {
        self.active_sockets.close_all();
        self.active_clients.store(0, Ordering::Relaxed);
    }
}

impl<H: Handler> Drop for Server<H> {
    fn drop(&mut self) {
        self.close();
    }
}
