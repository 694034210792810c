// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 集成测试共用的辅助函数：在后台线程上运行一个真实的服务器，
//! 并通过回环地址上的阻塞 Socket 发送原始请求。

#![allow(dead_code)]

use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use flate2::read::{GzDecoder, ZlibDecoder};
use tinyhttp::{Config, Handler, Server};

pub const INDEX: &[u8] =
    b"<!DOCTYPE html><html><body><h1>tinyhttp index, tinyhttp index</h1></body></html>";
pub const STAR: &[u8] = b"\x89PNG\r\n\x1a\n-not-really-a-star-";

/// 在后台线程上运行的服务器，析构时停机并等待线程退出
pub struct TestServer {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start<H>(handler: H) -> Self
    where
        H: Handler + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            let config =
                Config::from_toml_str("port = 0\nlocal = true\ntick_timeout_us = 20000\n").unwrap();
            let mut server = Server::open(&config, handler).unwrap();
            tx.send(server.local_addr().unwrap()).unwrap();
            server.run_until(&stop_flag);
        });

        Self {
            addr: rx.recv().unwrap(),
            stop,
            thread: Some(thread),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream
    }

    /// 发送一个原始请求并读到服务器关闭连接为止
    pub fn send_request(&self, request: &[u8]) -> io::Result<Vec<u8>> {
        let mut stream = self.connect();
        stream.write_all(request)?;
        let mut response = Vec::new();
        stream.read_to_end(&mut response)?;
        Ok(response)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub struct ParsedResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    pub fn header(&self, title: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse_response(raw: &[u8]) -> ParsedResponse {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = String::from_utf8(raw[..end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default().to_string();
    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    ParsedResponse {
        status_line,
        headers,
        body: raw[end + 4..].to_vec(),
    }
}

pub fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

pub fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}
