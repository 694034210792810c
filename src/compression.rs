// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 内容协商与压缩
//!
//! 客户端在 `Accept-Encoding` 中声明了 `deflate` 时尝试压缩响应体，
//! 压缩失败或客户端不支持时原样发送。

use crate::{exception::Exception, param::*, request::Request, response::send_answer};

use flate2::{
    write::{GzEncoder, ZlibEncoder},
    Compression,
};
use log::{debug, error};

use std::io::{self, Write};

/// 决定对该请求使用的编码。只有 deflate 参与协商，标题必须是 `Accept-Encoding`。
pub fn negotiate(request: &Request) -> Option<HttpEncoding> {
    if request.header_contains("Accept-Encoding", "deflate") {
        Some(HttpEncoding::Deflate)
    } else {
        None
    }
}

pub fn compress(data: &[u8], mode: HttpEncoding) -> io::Result<Vec<u8>> {
    match mode {
        HttpEncoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        HttpEncoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
    }
}

/// 按协商结果压缩后发送；不支持压缩或压缩失败时发送原始内容且不带编码头。
///
/// `trace` 打开时记录压缩率。
pub fn compress_and_send_answer<W: Write>(
    client: &mut W,
    request: &Request,
    body: &[u8],
    content_type: &str,
    trace: bool,
) -> Result<(), Exception> {
    compress_and_send_with(client, request, body, content_type, trace, compress)
}

fn compress_and_send_with<W, C>(
    client: &mut W,
    request: &Request,
    body: &[u8],
    content_type: &str,
    trace: bool,
    compressor: C,
) -> Result<(), Exception>
where
    W: Write,
    C: FnOnce(&[u8], HttpEncoding) -> io::Result<Vec<u8>>,
{
    let encoding = match negotiate(request) {
        Some(e) => e,
        None => {
            if trace {
                debug!("[fd{}]客户端不支持deflate，不进行压缩", request.client());
            }
            return send_answer(client, body, content_type, None);
        }
    };

    match compressor(body, encoding) {
        Ok(compressed) => {
            if trace {
                debug!(
                    "[fd{}]Compressing answer from {} to {} bytes, 压缩率: {:.1}%",
                    request.client(),
                    body.len(),
                    compressed.len(),
                    ratio(body.len(), compressed.len())
                );
            }
            send_answer(client, &compressed, content_type, Some(encoding))
        }
        Err(e) => {
            error!(
                "[fd{}]{}: {}，返回未压缩内容",
                request.client(),
                Exception::CompressFailed,
                e
            );
            send_answer(client, body, content_type, None)
        }
    }
}

fn ratio(original_size: usize, compressed_size: usize) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as i64 - compressed_size as i64) as f64 / original_size as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SocketHandle;
    use crate::response::tests::{header_value, split_response};
    use flate2::read::{GzDecoder, ZlibDecoder};
    use std::io::Read;
    use std::net::TcpListener;

    const INDEX: &[u8] =
        b"<!DOCTYPE html><html><body><h1>Hello, Hello, Hello, Hello!</h1></body></html>";

    fn request(text: &str) -> Request {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        Request::try_from(text.as_bytes(), SocketHandle::of(&listener), 16).unwrap()
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_negotiate_deflate() {
        let r = request("GET / HTTP/1.1\r\nAccept-Encoding: gzip, deflate, br\r\n\r\n");
        assert_eq!(negotiate(&r), Some(HttpEncoding::Deflate));
    }

    /// 只声明 gzip 时不协商
    #[test]
    fn test_negotiate_gzip_only() {
        let r = request("GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n");
        assert_eq!(negotiate(&r), None);
    }

    #[test]
    fn test_negotiate_without_header() {
        let r = request("GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(negotiate(&r), None);
    }

    /// 标题大小写不同视为没有该请求头
    #[test]
    fn test_negotiate_title_is_case_sensitive() {
        let r = request("GET / HTTP/1.1\r\naccept-encoding: deflate\r\n\r\n");
        assert_eq!(negotiate(&r), None);
    }

    #[test]
    fn test_compress_deflate_roundtrip() {
        let compressed = compress(INDEX, HttpEncoding::Deflate).unwrap();
        assert_ne!(compressed, INDEX);
        assert_eq!(inflate(&compressed), INDEX);
    }

    #[test]
    fn test_compress_gzip_magic() {
        let compressed = compress(INDEX, HttpEncoding::Gzip).unwrap();
        assert_eq!(&compressed[0..2], &[0x1f, 0x8b]);

        let mut out = Vec::new();
        GzDecoder::new(&compressed[..]).read_to_end(&mut out).unwrap();
        assert_eq!(out, INDEX);
    }

    #[test]
    fn test_compress_large_data() {
        let data = vec![b'A'; 10000];
        let compressed = compress(&data, HttpEncoding::Deflate).unwrap();
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn test_compress_and_send_with_deflate() {
        let r = request("GET / HTTP/1.1\r\nHost: x\r\nAccept-Encoding: gzip, deflate\r\n\r\n");
        let mut out = Vec::new();

        compress_and_send_answer(&mut out, &r, INDEX, "text/html", true).unwrap();

        let (header, body) = split_response(&out);
        assert_eq!(header_value(&header, "Content-Encoding"), Some("deflate"));
        assert_eq!(
            header_value(&header, "Content-Length"),
            Some(body.len().to_string().as_str())
        );
        assert_eq!(inflate(&body), INDEX);
    }

    #[test]
    fn test_compress_and_send_without_support() {
        let r = request("GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        let mut out = Vec::new();

        compress_and_send_answer(&mut out, &r, INDEX, "text/html", true).unwrap();

        let (header, body) = split_response(&out);
        assert_eq!(header_value(&header, "Content-Encoding"), None);
        assert_eq!(header_value(&header, "Content-Type"), Some("text/html"));
        assert_eq!(body, INDEX);
    }

    /// 压缩失败时退回原始内容，不带编码头
    #[test]
    fn test_compress_failure_falls_back_to_identity() {
        let r = request("GET / HTTP/1.1\r\nAccept-Encoding: deflate\r\n\r\n");
        let mut out = Vec::new();

        compress_and_send_with(&mut out, &r, INDEX, "text/html", true, |_, _| {
            Err(io::Error::new(io::ErrorKind::Other, "encoder broke"))
        })
        .unwrap();

        let (header, body) = split_response(&out);
        assert_eq!(header_value(&header, "Content-Encoding"), None);
        assert_eq!(
            header_value(&header, "Content-Length"),
            Some(INDEX.len().to_string().as_str())
        );
        assert_eq!(body, INDEX);
    }

    /// 关闭 trace 不影响协商结果
    #[test]
    fn test_compress_and_send_without_trace() {
        let r = request("GET / HTTP/1.1\r\nAccept-Encoding: deflate\r\n\r\n");
        let mut out = Vec::new();

        compress_and_send_answer(&mut out, &r, INDEX, "text/html", false).unwrap();

        let (header, body) = split_response(&out);
        assert_eq!(header_value(&header, "Content-Encoding"), Some("deflate"));
        assert_eq!(inflate(&body), INDEX);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(0, 10), 0.0);
        assert_eq!(ratio(100, 25), 75.0);
    }
}
