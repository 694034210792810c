// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

pub mod buffer;
pub mod compression;
pub mod config;
pub mod connection;
pub mod exception;
pub mod multiplexer;
pub mod param;
pub mod request;
pub mod response;
pub mod server;
pub mod site;

pub use buffer::ByteBuffer;
pub use config::Config;
pub use connection::{ConnectionSet, SocketHandle};
pub use exception::Exception;
pub use multiplexer::Activity;
pub use param::{HttpEncoding, HttpRequestMethod};
pub use request::Request;
pub use response::Response;
pub use server::{Handler, Server};
pub use site::StaticSite;
