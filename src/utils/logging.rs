use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志（RUST_LOG 可覆盖级别，默认 info）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nASN 证据采集日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - ASN 证据采集模式");
    info!(
        "🌐 浏览器: {}",
        if config.headless {
            "无头模式".to_string()
        } else {
            format!("调试端口 {}", config.browser_debug_port)
        }
    );
    info!("📁 输出目录: {}", config.output_folder);
    info!("⏱️ 加载超时: {} 毫秒", config.load_timeout_ms);
    if config.verbose_logging {
        info!("🔍 搜索入口: {}", config.search_url);
        info!("🔗 主页模板: {}", config.profile_url_template);
        info!("🗂️ 状态文件: {}", config.state_file);
        info!(
            "⏳ 安静窗口: {} 毫秒 / 渲染等待: {} 毫秒",
            config.quiet_window_ms, config.settle_delay_ms
        );
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `processed`: 成功处理的数量
/// - `total`: 批次总数
pub fn print_final_stats(processed: usize, total: usize, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批次处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", processed, total);
    info!("📁 证据文件目录: {}", config.output_folder);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
