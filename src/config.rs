// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::exception::Exception;
use crate::param::*;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_www_root")]
    www_root: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    local: bool,
    #[serde(default)]
    trace: bool,
    #[serde(default = "default_tick_timeout_us")]
    tick_timeout_us: u64,
    #[serde(default = "default_recv_buffer_size")]
    recv_buffer_size: usize,
    #[serde(default = "default_max_header_lines")]
    max_header_lines: usize,
    #[serde(default = "default_write_timeout_ms")]
    write_timeout_ms: u64,
}

fn default_www_root() -> String {
    ".".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_tick_timeout_us() -> u64 {
    DEFAULT_TICK_TIMEOUT_US
}

fn default_recv_buffer_size() -> usize {
    DEFAULT_RECV_BUFFER_SIZE
}

fn default_max_header_lines() -> usize {
    DEFAULT_MAX_HEADER_LINES
}

fn default_write_timeout_ms() -> u64 {
    DEFAULT_WRITE_TIMEOUT_MS
}

fn read_config_file(filename: &str) -> Result<String, Exception> {
    let mut file = match File::open(filename) {
        Ok(f) => f,
        Err(e) => {
            warn!("无法打开配置文件{}：{}，使用默认配置", filename, e);
            return Err(Exception::ConfigUnreadable);
        }
    };
    let mut str_val = String::new();
    if let Err(e) = file.read_to_string(&mut str_val) {
        warn!("读取配置文件{}失败：{}，使用默认配置", filename, e);
        return Err(Exception::ConfigUnreadable);
    }
    Ok(str_val)
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            www_root: default_www_root(),
            port: default_port(),
            local: false,
            trace: false,
            tick_timeout_us: default_tick_timeout_us(),
            recv_buffer_size: default_recv_buffer_size(),
            max_header_lines: default_max_header_lines(),
            write_timeout_ms: default_write_timeout_ms(),
        }
    }

    /// 从文件载入配置。文件不可读或内容非法时记录日志并退回默认配置。
    pub fn from_toml(filename: &str) -> Self {
        let text = match read_config_file(filename) {
            Ok(t) => t,
            Err(_) => return Config::new(),
        };

        match Self::from_toml_str(&text) {
            Ok(c) => c,
            Err(_) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置");
                Config::new()
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Exception> {
        let mut raw_config: Config = match toml::from_str(text) {
            Ok(t) => t,
            Err(e) => {
                error!("配置解析失败：{}", e);
                return Err(Exception::ConfigInvalid);
            }
        };
        if raw_config.recv_buffer_size == 0 {
            warn!(
                "recv_buffer_size被设置为0，接收缓冲区不能为空，该值将被改为{}。",
                DEFAULT_RECV_BUFFER_SIZE
            );
            raw_config.recv_buffer_size = DEFAULT_RECV_BUFFER_SIZE;
        }
        if raw_config.max_header_lines == 0 {
            warn!(
                "max_header_lines被设置为0，该值将被改为{}。",
                DEFAULT_MAX_HEADER_LINES
            );
            raw_config.max_header_lines = DEFAULT_MAX_HEADER_LINES;
        }
        Ok(raw_config)
    }
}

impl Config {
    pub fn www_root(&self) -> &str {
        &self.www_root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn trace(&self) -> bool {
        self.trace
    }

    pub fn tick_timeout_us(&self) -> u64 {
        self.tick_timeout_us
    }

    pub fn recv_buffer_size(&self) -> usize {
        self.recv_buffer_size
    }

    pub fn max_header_lines(&self) -> usize {
        self.max_header_lines
    }

    pub fn write_timeout_ms(&self) -> u64 {
        self.write_timeout_ms
    }
}
