// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 字节缓冲区
//!
//! `ByteBuffer` 同时用作入站的接收缓冲区和出站的格式化报文。
//! 接收时每次最多读入一个容量的数据，不会跨次拼接。

use bytes::{Bytes, BytesMut};

use std::{
    fmt,
    fs,
    io::{self, Read, Write},
    ops::Deref,
    path::Path,
};

#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: BytesMut,
    capacity: usize,
}

impl ByteBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// 从 `source` 中做一次读取，最多读满容量。
    ///
    /// 返回读到的字节数，0 表示对端已关闭。出错时缓冲区被清空。
    pub fn recv<R: Read>(&mut self, source: &mut R) -> io::Result<usize> {
        self.data.clear();
        self.data.resize(self.capacity, 0);
        match source.read(&mut self.data[..]) {
            Ok(n) => {
                self.data.truncate(n);
                Ok(n)
            }
            Err(e) => {
                self.data.clear();
                Err(e)
            }
        }
    }

    /// 将整个缓冲区写入 `sink`，部分写入会继续直到写完或出错。
    pub fn send<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&self.data)
    }

    /// 清空后按格式写入，相当于 printf 到自身。
    pub fn format(&mut self, args: fmt::Arguments<'_>) {
        use std::fmt::Write as _;

        self.data.clear();
        // 写入 BytesMut 不会失败
        let _ = self.data.write_fmt(args);
    }

    /// 一次性读入整个文件
    pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let contents = fs::read(path)?;
        let capacity = contents.len();
        Ok(Self {
            data: BytesMut::from(&contents[..]),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
