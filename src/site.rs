// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 演示站点
//!
//! 一个只服务三份静态内容的应用回调：
//! - `/` 返回首页，经过内容协商，客户端支持时以 deflate 压缩；
//! - `/gidx` 返回离线预压缩好的首页，总是 `Content-Encoding: gzip`；
//! - 其余任何路径都以 200 返回兜底内容，没有 404。
//!
//! 每次回应之后都关闭连接。

use crate::{
    buffer::ByteBuffer,
    compression::compress_and_send_answer,
    param::*,
    request::Request,
    response::{send_answer, send_precompressed},
    server::Handler,
};

use bytes::Bytes;
use log::{info, warn};

use std::{net::TcpStream, path::Path};

#[derive(Debug, Clone)]
pub struct StaticSite {
    index: Bytes,
    fallback: Bytes,
    fallback_type: String,
    precompressed_index: Option<Bytes>,
    trace: bool,
}

impl StaticSite {
    pub fn new(index: impl Into<Bytes>, fallback: impl Into<Bytes>, fallback_type: &str) -> Self {
        Self {
            index: index.into(),
            fallback: fallback.into(),
            fallback_type: fallback_type.to_string(),
            precompressed_index: None,
            trace: false,
        }
    }

    pub fn with_precompressed_index(mut self, gz: impl Into<Bytes>) -> Self {
        self.precompressed_index = Some(gz.into());
        self
    }

    /// 打开后记录每次回应的压缩率
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// 从 `root` 目录载入资源，缺失的文件以内置占位内容代替
    pub fn load(root: &str) -> Self {
        let root = Path::new(root);

        let index = match ByteBuffer::read_file(root.join(INDEX_FILE)) {
            Ok(b) => b.freeze(),
            Err(e) => {
                warn!("无法读取{}：{}，使用占位首页", INDEX_FILE, e);
                Bytes::from_static(INDEX_PLACEHOLDER.as_bytes())
            }
        };
        let (fallback, fallback_type) = match ByteBuffer::read_file(root.join(FALLBACK_FILE)) {
            Ok(b) => (b.freeze(), mime_for(FALLBACK_FILE)),
            Err(e) => {
                warn!("无法读取{}：{}，使用占位内容", FALLBACK_FILE, e);
                (
                    Bytes::from_static(FALLBACK_PLACEHOLDER.as_bytes()),
                    "text/html",
                )
            }
        };

        let mut site = Self::new(index, fallback, fallback_type);
        match ByteBuffer::read_file(root.join(PRECOMPRESSED_FILE)) {
            Ok(b) => site = site.with_precompressed_index(b.freeze()),
            Err(_) => info!(
                "没有找到{}，{}将返回兜底内容",
                PRECOMPRESSED_FILE, PRECOMPRESSED_PATH
            ),
        }
        site
    }

    pub fn index(&self) -> &Bytes {
        &self.index
    }

    pub fn fallback(&self) -> &Bytes {
        &self.fallback
    }
}

impl Handler for StaticSite {
    fn on_request(&mut self, request: &Request, client: &mut TcpStream) -> bool {
        let result = match (request.url_path(), &self.precompressed_index) {
            ("/", _) => {
                compress_and_send_answer(client, request, &self.index, "text/html", self.trace)
            }
            (PRECOMPRESSED_PATH, Some(gz)) => send_precompressed(client, gz, "text/html"),
            _ => send_answer(client, &self.fallback, &self.fallback_type, None),
        };
        if let Err(e) = result {
            warn!("[fd{}]回应{}失败：{}", request.client(), request.url(), e);
        }
        false
    }
}
