// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `tinyhttp` 内核所遵循的 HTTP 协议常量和数据结构，包括：
//! - 固定的状态行与换行符。
//! - 接收缓冲区、请求头容量等默认尺寸。
//! - 演示站点使用的资源文件名与 MIME 类型映射表。
//! - HTTP 方法及编码格式的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 内核唯一会发出的状态行。找不到资源属于应用层的决定，内核不产生 404。
pub const STATUS_LINE: &str = "HTTP/1.1 200 OK";

/// 请求行中 GET 方法的前缀（包含分隔空格）
pub const GET_PREFIX: &[u8] = b"GET ";

/// 接收缓冲区的默认容量（字节）
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 2048;

/// 单个请求最多保存的请求头行数
pub const DEFAULT_MAX_HEADER_LINES: usize = 16;

/// 每次 tick 的默认超时（微秒）
pub const DEFAULT_TICK_TIMEOUT_US: u64 = 1_000_000;

/// 客户端写超时的默认值（毫秒）
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5000;

/// 演示站点：首页文件
pub const INDEX_FILE: &str = "index.html";

/// 演示站点：兜底资源文件（任何未识别路径都返回它）
pub const FALLBACK_FILE: &str = "star.png";

/// 演示站点：离线预先 gzip 压缩好的首页
pub const PRECOMPRESSED_FILE: &str = "index.html.gz";

/// 预压缩资源对应的逻辑路径
pub const PRECOMPRESSED_PATH: &str = "/gidx";

/// 找不到首页文件时使用的占位内容
pub const INDEX_PLACEHOLDER: &str = concat!(
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>tinyhttp</title></head>",
    "<body><h1>It works!</h1></body></html>"
);

/// 找不到兜底文件时使用的占位内容
pub const FALLBACK_PLACEHOLDER: &str = concat!(
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>tinyhttp</title></head>",
    "<body><p>Nothing here.</p></body></html>"
);

lazy_static! {
    /// 文件后缀名到 MIME 类型（Media Type）的映射表。
    ///
    /// 用于演示站点载入资源时决定 `Content-Type`。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("bmp", "image/bmp");
        map.insert("css", "text/css");
        map.insert("csv", "text/csv");
        map.insert("gif", "image/gif");
        map.insert("gz", "application/gzip");
        map.insert("htm", "text/html");
        map.insert("html", "text/html");
        map.insert("ico", "image/x-icon");
        map.insert("jpg", "image/jpeg");
        map.insert("jpeg", "image/jpeg");
        map.insert("js", "text/javascript");
        map.insert("json", "application/json");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("txt", "text/plain");
        map.insert("wasm", "application/wasm");
        map.insert("webp", "image/webp");
        map.insert("xml", "text/xml");
        map
    };
}

/// 根据文件名后缀查找 MIME 类型，无法识别时返回 `application/octet-stream`
pub fn mime_for(filename: &str) -> &'static str {
    let extension = match filename.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return "application/octet-stream",
    };
    match MIME_TYPES.get(extension.to_ascii_lowercase().as_str()) {
        Some(v) => *v,
        None => "application/octet-stream",
    }
}

/// 内核识别的 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    /// 获取资源，唯一被识别的方法
    Get,
    /// 其余所有方法
    Unsupported,
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpEncoding {
    /// GNU zip 压缩，仅用于离线预压缩的资源
    Gzip,
    /// zlib 压缩（HTTP 语义下的 deflate）
    Deflate,
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Unsupported => write!(f, "UNSUPPORTED"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// 将枚举格式化为 `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
        }
    }
}
