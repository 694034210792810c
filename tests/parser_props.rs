// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 请求解析器的性质测试。

use std::net::TcpListener;

use proptest::prelude::*;
use tinyhttp::{Exception, HttpRequestMethod, Request, SocketHandle};

fn handle() -> SocketHandle {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    SocketHandle::of(&listener)
}

fn url_strategy() -> impl Strategy<Value = String> {
    "/[A-Za-z0-9._~/-]{0,40}(\\?[a-z]{1,8}=[A-Za-z0-9]{0,8}(&[a-z]{1,8}=[A-Za-z0-9]{0,8}){0,3})?"
}

fn header_strategy() -> impl Strategy<Value = (String, String)> {
    (
        "[A-Za-z][A-Za-z0-9-]{0,20}",
        "[!-~]([ -~]{0,40}[!-~])?",
    )
}

proptest! {
    /// 格式良好的请求得到准确的 URL 与请求头
    #[test]
    fn well_formed_requests_roundtrip(
        url in url_strategy(),
        headers in prop::collection::vec(header_strategy(), 0..16),
    ) {
        let mut text = format!("GET {} HTTP/1.1\r\n", url);
        for (title, value) in &headers {
            text.push_str(&format!("{}: {}\r\n", title, value));
        }
        text.push_str("\r\n");

        let request = Request::try_from(text.as_bytes(), handle(), 16).unwrap();

        prop_assert_eq!(request.method(), HttpRequestMethod::Get);
        prop_assert_eq!(request.url(), url.as_str());
        prop_assert_eq!(request.headers(), &headers[..]);
        prop_assert_eq!(request.dropped_headers(), 0);
    }

    /// 没有 CRLF 的数据永远不是请求
    #[test]
    fn buffers_without_crlf_are_rejected(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let data: Vec<u8> = data.into_iter().filter(|&b| b != b'\n').collect();
        prop_assert_eq!(
            Request::try_from(&data, handle(), 16).unwrap_err(),
            Exception::IncompleteRequest
        );
    }

    /// 任意字节都不会让解析器崩溃，且相同的输入得到相同的结果
    #[test]
    fn arbitrary_bytes_are_deterministic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let client = handle();
        let a = Request::try_from(&data, client, 16);
        let b = Request::try_from(&data.clone(), client, 16);
        prop_assert_eq!(a, b);
    }

    /// 保存的请求头数量不超过容量，多出的被计数
    #[test]
    fn header_capacity_is_respected(count in 0usize..40, capacity in 1usize..24) {
        let mut text = String::from("GET / HTTP/1.1\r\n");
        for i in 0..count {
            text.push_str(&format!("H{}: v\r\n", i));
        }
        text.push_str("\r\n");

        let request = Request::try_from(text.as_bytes(), handle(), capacity).unwrap();

        prop_assert_eq!(request.headers().len(), count.min(capacity));
        prop_assert_eq!(request.dropped_headers(), count.saturating_sub(capacity));
    }
}
