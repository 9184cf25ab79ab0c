use thiserror::Error;

/// 单个 ASN 处理过程中的错误（在 Item Processor 边界统一捕获后上抛给编排层）
#[derive(Debug, Error)]
pub enum ProcessError {
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreation {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    Navigation {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 等待页面加载超时
    #[error("等待页面加载超时 ({url}, 已等待 {waited_ms} 毫秒)")]
    LoadTimeout { url: String, waited_ms: u64 },
    /// 页面在处理过程中被意外关闭
    #[error("页面被意外关闭 ({label})")]
    TabClosed { label: String },
    /// 注入脚本失败
    #[error("注入脚本失败: {source}")]
    Script {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 解析脚本返回值失败
    #[error("解析脚本返回值失败: {source}")]
    ScriptResult {
        #[source]
        source: serde_json::Error,
    },
    /// 监听页面生命周期事件失败
    #[error("监听页面生命周期事件失败: {source}")]
    Lifecycle {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 页面上找不到搜索输入框
    #[error("页面上找不到搜索输入框 ({url})")]
    SearchInputNotFound { url: String },
    /// 截图调用失败
    #[error("截图失败 ({label}): {source}")]
    Capture {
        label: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 截图返回空数据
    #[error("截图数据为空 ({label})")]
    EmptyCapture { label: String },
    /// 写入输出文件失败
    #[error("写入输出文件失败 ({path}): {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 队列状态持久化错误
#[derive(Debug, Error)]
pub enum StateError {
    /// 读取状态文件失败
    #[error("读取状态文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入状态文件失败
    #[error("写入状态文件失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 解析状态文件失败
    #[error("解析状态文件失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 序列化队列状态失败
    #[error("序列化队列状态失败: {source}")]
    Serialize {
        #[source]
        source: toml::ser::Error,
    },
    /// 队列状态不满足不变量
    #[error("队列状态不合法: {reason}")]
    Invalid { reason: String },
}
