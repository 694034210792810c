// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求解析模块
//!
//! 将一次读取得到的原始字节解析为 `Request`。解析只看这一次读到的数据：
//! 1. 按 CRLF 切行，遇到空行或缓冲区末尾没有 CRLF 时结束。
//! 2. 第一行是请求行，只识别 `GET `，其后到最后一个空格之前的部分是 URL。
//! 3. 其余每行在第一个 `:` 处拆成（标题，值），值最多去掉一个前导空格。
//!
//! 请求头的标题和值都会被复制出来，`Request` 不借用接收缓冲区。

use crate::{connection::SocketHandle, exception::Exception, param::*};
use log::debug;

/// 一个解析完成的 GET 请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP 请求方法
    method: HttpRequestMethod,
    /// 请求的资源路径（包含查询字符串）
    url: String,
    /// 按出现顺序保存的请求头
    headers: Vec<(String, String)>,
    /// 超出容量而被丢弃的请求头行数
    dropped_headers: usize,
    /// 请求来自的客户端
    client: SocketHandle,
}

impl Request {
    /// 从一次读取得到的缓冲区构建 `Request`。
    ///
    /// 最多保存 `max_header_lines` 行请求头，多出的行被丢弃并计数。
    /// 如果没有得到非空的 URL，返回 `Exception::IncompleteRequest`。
    pub fn try_from(
        buffer: &[u8],
        client: SocketHandle,
        max_header_lines: usize,
    ) -> Result<Self, Exception> {
        let mut method = HttpRequestMethod::Unsupported;
        let mut url = String::new();
        let mut headers = Vec::new();
        let mut dropped_headers = 0;

        let mut first_line = true;
        let mut bol = 0;
        while let Some(eol) = find_crlf(buffer, bol) {
            // 空行表示请求头结束
            if eol == bol {
                break;
            }
            let line = &buffer[bol..eol];

            if first_line {
                first_line = false;
                if let Some(rest) = line.strip_prefix(GET_PREFIX) {
                    method = HttpRequestMethod::Get;
                    url = parse_url(rest);
                    debug!("[fd{}]request.get: {}", client, url);
                }
            } else {
                let (title, value) = split_header(line);
                debug!("[fd{}]request.header: '{}' => '{}'", client, title, value);
                if headers.len() < max_header_lines {
                    headers.push((title, value));
                } else {
                    dropped_headers += 1;
                }
            }

            bol = eol + CRLF.len();
        }

        if dropped_headers > 0 {
            debug!(
                "[fd{}]请求头超过{}行，丢弃了{}行",
                client, max_header_lines, dropped_headers
            );
        }

        if url.is_empty() {
            return Err(Exception::IncompleteRequest);
        }

        Ok(Self {
            method,
            url,
            headers,
            dropped_headers,
            client,
        })
    }
}

/// 从 `from` 开始查找下一个 CRLF 的位置
fn find_crlf(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(2)
        .position(|w| w == CRLF.as_bytes())
        .map(|p| from + p)
}

/// 去掉结尾的协议版本。找不到空格时保持原样。
fn parse_url(rest: &[u8]) -> String {
    let url = match rest.iter().rposition(|&b| b == b' ') {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    String::from_utf8_lossy(url).into_owned()
}

fn split_header(line: &[u8]) -> (String, String) {
    match line.iter().position(|&b| b == b':') {
        Some(colon) => {
            let title = String::from_utf8_lossy(&line[..colon]).trim().to_string();
            let value = &line[colon + 1..];
            let value = value.strip_prefix(b" ").unwrap_or(value);
            (title, String::from_utf8_lossy(value).into_owned())
        }
        None => (
            String::from_utf8_lossy(line).trim().to_string(),
            String::new(),
        ),
    }
}

impl Request {
    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取原始 URL（含查询参数）
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 获取全部请求头
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn dropped_headers(&self) -> usize {
        self.dropped_headers
    }

    pub fn client(&self) -> SocketHandle {
        self.client
    }

    /// 按标题查找请求头。标题区分大小写，必须完全相同。
    pub fn header(&self, title: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, v)| v.as_str())
    }

    /// 请求头 `title` 存在且其值包含 `text`
    pub fn header_contains(&self, title: &str, text: &str) -> bool {
        self.header(title).map_or(false, |v| v.contains(text))
    }

    /// `/path/to/doc?id=23&q=str` => `/path/to/doc`
    pub fn url_path(&self) -> &str {
        match self.url.find('?') {
            Some(c) => &self.url[..c],
            None => &self.url,
        }
    }

    /// 查询字符串中名为 `name` 的参数值
    pub fn uri_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}
