/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口（连接已运行的浏览器）
    pub browser_debug_port: u16,
    /// 是否启动无头浏览器（不连接已有浏览器）
    pub headless: bool,
    /// 搜索引擎入口 URL
    pub search_url: String,
    /// ASN 主页 URL 模板（`{asn}` 占位符）
    pub profile_url_template: String,
    /// 证据文件输出目录
    pub output_folder: String,
    /// 队列状态文件路径
    pub state_file: String,
    /// 页面加载超时（毫秒）
    pub load_timeout_ms: u64,
    /// 加载完成后的固定等待时间（毫秒），容忍客户端渲染
    pub settle_delay_ms: u64,
    /// 网络安静判定窗口（毫秒）：该时长内无新的加载事件则认为页面安静
    pub quiet_window_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 2001,
            headless: false,
            search_url: "https://www.google.com".to_string(),
            profile_url_template: "https://github.com/{asn}".to_string(),
            output_folder: "evidence_output".to_string(),
            state_file: "queue_state.toml".to_string(),
            load_timeout_ms: 30_000,
            settle_delay_ms: 2_000,
            quiet_window_ms: 1_000,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            search_url: std::env::var("SEARCH_URL").unwrap_or(default.search_url),
            profile_url_template: std::env::var("PROFILE_URL_TEMPLATE").unwrap_or(default.profile_url_template),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            state_file: std::env::var("STATE_FILE").unwrap_or(default.state_file),
            load_timeout_ms: std::env::var("LOAD_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.load_timeout_ms),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_ms),
            quiet_window_ms: std::env::var("QUIET_WINDOW_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.quiet_window_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 根据模板生成某个 ASN 的主页 URL
    pub fn profile_url(&self, asn: &str) -> String {
        self.profile_url_template.replace("{asn}", asn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url_fills_placeholder() {
        let config = Config::default();
        assert_eq!(config.profile_url("AS13335"), "https://github.com/AS13335");

        let config = Config {
            profile_url_template: "https://bgp.example/{asn}/detail".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.profile_url("AS15169"),
            "https://bgp.example/AS15169/detail"
        );
    }
}
