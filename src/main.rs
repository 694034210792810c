// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 演示服务器
//!
//! 进程入口：初始化日志、加载配置、载入静态资源，然后在单线程上运行就绪复用主循环。
//! 后台线程提供一个简单的管理控制台（`stop` / `status` / `help`）。

use tinyhttp::{Config, Server, StaticSite};

use log::{error, info};

use std::{
    env,
    io::{self, BufRead},
    process,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

fn main() {
    // 1. 初始化日志系统：log4rs 通过外部 YAML 配置级别与输出目的地
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
    }

    // 2. 加载配置，可以通过第一个命令行参数指定配置文件
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config/development.toml".to_string());
    let config = Config::from_toml(&config_path);
    info!("配置文件{}已载入", config_path);

    // 3. 载入静态资源
    info!("www root: {}", config.www_root());
    // trace 关闭时不记录连接、请求与压缩率等诊断信息
    let site = StaticSite::load(config.www_root()).with_trace(config.trace());

    // 4. 绑定端口
    let mut server = match Server::open(&config, site) {
        Ok(server) => server,
        Err(e) => {
            error!("Can't start server at port {}: {}", config.port(), e);
            process::exit(1);
        }
    };

    // 5. 启动管理控制台
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    spawn_console(Arc::clone(&shutdown_flag), server.active_connections());

    // 6. 主循环
    server.run_until(&shutdown_flag);
    server.close();
    info!("服务器已关闭");
}

fn spawn_console(shutdown_flag: Arc<AtomicBool>, active_connection: Arc<AtomicUsize>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let input = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            match input.trim() {
                "stop" => {
                    shutdown_flag.store(true, Ordering::Relaxed);
                    println!("停机指令已激活，服务器将在当前tick结束后关闭...");
                    break;
                }
                "help" => {
                    println!("== tinyhttp Help ==");
                    println!("stop   - 发出停机信号");
                    println!("status - 查看当前服务器运行状态");
                    println!("help   - 显示此帮助信息");
                    println!("===================");
                }
                "status" => {
                    println!("== tinyhttp 状态 ==");
                    println!(
                        "当前活跃连接数: {}",
                        active_connection.load(Ordering::Relaxed)
                    );
                    println!("===================");
                }
                "" => {}
                cmd => println!("无效的命令：{}", cmd),
            }
        }
    });
}
