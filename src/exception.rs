// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器内核在连接与请求处理生命周期中可能出现的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了传输层错误（绑定、写出）、请求解析失败、压缩失败以及配置加载错误。
//! - **就地记录**：底层的 `io::Error` 细节在发生处通过日志记录，枚举本身保持 `Copy`。
//! - **用户友好**：通过实现 `std::fmt::Display`，确保错误信息可以被安全地记录到日志中。

use std::fmt;

/// 服务器内核处理过程中发生的异常类型。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 接收到的数据中没有可用的 URL：空缓冲区、缺少 CRLF、非 GET 请求或请求行被截断。
    /// 这不是需要回应的错误，该连接在本次 tick 中被忽略。
    IncompleteRequest,
    /// 无法在指定端口上创建监听 Socket。启动阶段的致命错误。
    BindFailed,
    /// 响应头或响应体未能完整写出（包括写超时）。
    WriteFailed,
    /// 压缩响应体失败，调用方应回退为不压缩发送。
    CompressFailed,
    /// 配置文件无法读取。
    ConfigUnreadable,
    /// 配置文件内容无法解析。
    ConfigInvalid,
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncompleteRequest => write!(f, "Buffer does not hold a complete GET request"),
            BindFailed => write!(f, "Couldn't bind the listening socket"),
            WriteFailed => write!(f, "Couldn't write the whole answer to the client"),
            CompressFailed => write!(f, "Couldn't compress the answer body"),
            ConfigUnreadable => write!(f, "Couldn't read the configuration file"),
            ConfigInvalid => write!(f, "Configuration file is not valid TOML"),
        }
    }
}
