// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 就绪复用器
//!
//! 对 `poll(2)` 的一层包装：给定一组 Socket，阻塞至多 `timeout_us` 微秒，
//! 找出其中当前可读的子集。监听 Socket 可读意味着有新的连接等待接受。

use crate::connection::{ConnectionSet, SocketHandle};

use log::error;

use std::io;

/// 可读、对端挂断或出错都意味着下一次 read 不会阻塞
const READABLE: libc::c_short = libc::POLLIN | libc::POLLHUP | libc::POLLERR;

#[derive(Default)]
pub struct Activity {
    fds: Vec<libc::pollfd>,
    ready_to_read: Vec<SocketHandle>,
}

impl Activity {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fds: Vec::with_capacity(capacity),
            ready_to_read: Vec::with_capacity(capacity),
        }
    }

    /// 等待集合中任一 Socket 可读。
    ///
    /// 集合为空、超时或被信号打断时返回 `false`；否则按集合顺序把就绪的 Socket
    /// 放入 [`Activity::ready`] 并返回 `true`。
    pub fn wait(&mut self, sockets: &ConnectionSet, timeout_us: u64) -> bool {
        self.ready_to_read.clear();
        if sockets.is_empty() {
            return false;
        }

        self.fds.clear();
        self.fds.extend(sockets.handles().map(|h| libc::pollfd {
            fd: h.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }));

        // SAFETY: `fds` 是当前独占借用的 `Vec<pollfd>`，调用期间不会被修改或释放，
        // 传入的 nfds 与其长度一致。
        let nready = unsafe {
            libc::poll(
                self.fds.as_mut_ptr(),
                self.fds.len() as libc::nfds_t,
                micros_to_millis(timeout_us),
            )
        };
        if nready < 0 {
            let e = io::Error::last_os_error();
            if e.kind() != io::ErrorKind::Interrupted {
                error!("poll失败：{}", e);
            }
            return false;
        }
        if nready == 0 {
            return false;
        }

        let mut remaining = nready as usize;
        for (handle, pfd) in sockets.handles().zip(self.fds.iter()) {
            if pfd.revents == 0 {
                continue;
            }
            if pfd.revents & READABLE != 0 {
                self.ready_to_read.push(handle);
            }
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
        true
    }

    /// 上一次 `wait` 找到的可读 Socket
    pub fn ready(&self) -> &[SocketHandle] {
        &self.ready_to_read
    }

    pub(crate) fn take_ready(&mut self) -> Vec<SocketHandle> {
        std::mem::take(&mut self.ready_to_read)
    }

    pub(crate) fn restore_ready(&mut self, mut ready: Vec<SocketHandle>) {
        ready.clear();
        self.ready_to_read = ready;
    }
}

/// 向上取整到毫秒，0 仍为 0（纯轮询）
fn micros_to_millis(timeout_us: u64) -> libc::c_int {
    let millis = timeout_us.div_ceil(1000);
    millis.min(libc::c_int::MAX as u64) as libc::c_int
}
