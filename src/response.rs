// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{buffer::ByteBuffer, exception::Exception, param::*};

use chrono::prelude::*;
use log::{debug, error};

use std::io::Write;

/// 一次性的 200 响应：状态行、固定的几个响应头以及响应体。
#[derive(Debug, Clone)]
pub struct Response<'a> {
    content_type: &'a str,
    content_encoding: Option<HttpEncoding>,
    date: DateTime<Utc>,
    content: &'a [u8],
}

impl<'a> Response<'a> {
    pub fn new(content: &'a [u8], content_type: &'a str) -> Self {
        Self {
            content_type,
            content_encoding: None,
            date: Utc::now(),
            content,
        }
    }

    pub fn with_encoding(mut self, encoding: Option<HttpEncoding>) -> Self {
        self.content_encoding = encoding;
        self
    }

    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    /// 格式化完整的响应头（以空行结束）
    pub fn header(&self) -> ByteBuffer {
        let mut header = ByteBuffer::with_capacity(256);
        header.format(format_args!(
            concat!(
                "{status}{crlf}",
                "Content-Length: {length}{crlf}",
                "Content-Type: {ctype}{crlf}",
                "Date: {date}{crlf}",
                "{encoding}{crlf}"
            ),
            status = STATUS_LINE,
            crlf = CRLF,
            length = self.content.len(),
            ctype = self.content_type,
            date = format_date(&self.date),
            encoding = match self.content_encoding {
                Some(e) => format!("Content-Encoding: {}{}", e, CRLF),
                None => String::new(),
            },
        ));
        header
    }

    /// 先写响应头，再写响应体。任何一次写入失败都返回 `WriteFailed`。
    pub fn send<W: Write>(&self, client: &mut W) -> Result<(), Exception> {
        let header = self.header();
        if let Err(e) = header.send(client) {
            error!("发送响应头失败: {}", e);
            return Err(Exception::WriteFailed);
        }
        if let Err(e) = client.write_all(self.content) {
            error!("发送响应体失败({} bytes): {}", self.content.len(), e);
            return Err(Exception::WriteFailed);
        }
        debug!(
            "响应已发送: {} bytes, Content-Type: {}, 编码: {:?}",
            self.content.len(),
            self.content_type,
            self.content_encoding
        );
        Ok(())
    }
}

/// 发送一个 200 响应，`encoding` 不为空时附带 `Content-Encoding` 头。
pub fn send_answer<W: Write>(
    client: &mut W,
    body: &[u8],
    content_type: &str,
    encoding: Option<HttpEncoding>,
) -> Result<(), Exception> {
    Response::new(body, content_type)
        .with_encoding(encoding)
        .send(client)
}

/// 发送离线压缩好的资源，不做协商，总是 `Content-Encoding: gzip`。
pub fn send_precompressed<W: Write>(
    client: &mut W,
    body: &[u8],
    content_type: &str,
) -> Result<(), Exception> {
    send_answer(client, body, content_type, Some(HttpEncoding::Gzip))
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
