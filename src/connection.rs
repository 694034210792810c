// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接集合
//!
//! 保存当前打开的全部 Socket：一个监听 Socket 加上若干已接受的客户端 Socket。
//! 集合拥有底层的操作系统资源，移除即关闭。

use log::{debug, error};

use std::{
    fmt,
    net::{TcpListener, TcpStream},
    os::fd::{AsRawFd, RawFd},
};

/// 指向某个 TCP 端点的不透明句柄，在集合内唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(RawFd);

impl SocketHandle {
    pub fn of<S: AsRawFd>(socket: &S) -> Self {
        Self(socket.as_raw_fd())
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

impl fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

enum Endpoint {
    Listening(TcpListener),
    Client(TcpStream),
}

struct Connection {
    handle: SocketHandle,
    endpoint: Endpoint,
}

#[derive(Default)]
pub struct ConnectionSet {
    connections: Vec<Connection>,
}

impl ConnectionSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            connections: Vec::with_capacity(capacity),
        }
    }

    pub fn add_listener(&mut self, listener: TcpListener) -> SocketHandle {
        let handle = SocketHandle::of(&listener);
        self.insert(handle, Endpoint::Listening(listener))
    }

    pub fn add(&mut self, stream: TcpStream) -> SocketHandle {
        let handle = SocketHandle::of(&stream);
        self.insert(handle, Endpoint::Client(stream))
    }

    fn insert(&mut self, handle: SocketHandle, endpoint: Endpoint) -> SocketHandle {
        // 同一个描述符在关闭之前不会被操作系统再次分配
        debug_assert!(!self.contains(handle), "[fd{}]重复加入连接集合", handle);
        self.connections.push(Connection { handle, endpoint });
        handle
    }

    /// 关闭并移除一个句柄。句柄必须存在于集合中，否则属于编程错误。
    pub fn remove(&mut self, handle: SocketHandle) -> bool {
        match self.connections.iter().position(|c| c.handle == handle) {
            Some(index) => {
                let connection = self.connections.remove(index);
                drop(connection.endpoint);
                debug!("[fd{}]连接已关闭", handle);
                true
            }
            None => {
                error!("[fd{}]试图移除不在连接集合中的Socket", handle);
                debug_assert!(false, "[fd{}]不在连接集合中", handle);
                false
            }
        }
    }

    /// 关闭全部连接（包括监听 Socket）
    pub fn close_all(&mut self) {
        while let Some(first) = self.connections.first().map(|c| c.handle) {
            self.remove(first);
        }
    }

    pub fn contains(&self, handle: SocketHandle) -> bool {
        self.connections.iter().any(|c| c.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// 按加入顺序返回全部句柄
    pub fn handles(&self) -> impl Iterator<Item = SocketHandle> + '_ {
        self.connections.iter().map(|c| c.handle)
    }

    pub fn listener(&self, handle: SocketHandle) -> Option<&TcpListener> {
        self.connections
            .iter()
            .find(|c| c.handle == handle)
            .and_then(|c| match &c.endpoint {
                Endpoint::Listening(l) => Some(l),
                Endpoint::Client(_) => None,
            })
    }

    pub fn client_mut(&mut self, handle: SocketHandle) -> Option<&mut TcpStream> {
        self.connections
            .iter_mut()
            .find(|c| c.handle == handle)
            .and_then(|c| match &mut c.endpoint {
                Endpoint::Client(s) => Some(s),
                Endpoint::Listening(_) => None,
            })
    }
}

impl Drop for ConnectionSet {
    fn drop(&mut self) {
        self.close_all();
    }
}
