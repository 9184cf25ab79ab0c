use anyhow::{Context, Result};
use asn_evidence_capture::models::StartRequest;
use asn_evidence_capture::orchestrator::App;
use asn_evidence_capture::utils::logging;
use asn_evidence_capture::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 解析启动请求（命令行参数），没有参数时尝试恢复上次未完成的批次
    let request = parse_request(std::env::args().nth(1)).await?;

    let app = App::initialize(config).await?;

    match request {
        Some(request) => {
            let response = app.handle_start(request).await;
            if !response.success {
                anyhow::bail!(
                    "批次处理失败: {}",
                    response.error.unwrap_or_else(|| "未知错误".to_string())
                );
            }
        }
        None => app.resume().await?,
    }

    Ok(())
}

/// 从命令行参数构造启动请求
///
/// 支持两种形式：
/// - JSON 请求文件路径（`*.json`，内容为 `{"action":"start","items":[...]}`）
/// - 逗号分隔的 ASN 列表（如 `AS13335,AS15169`）
async fn parse_request(arg: Option<String>) -> Result<Option<StartRequest>> {
    let Some(arg) = arg else {
        return Ok(None);
    };

    if arg.ends_with(".json") {
        let content = tokio::fs::read_to_string(&arg)
            .await
            .with_context(|| format!("无法读取请求文件: {}", arg))?;
        let request: StartRequest = serde_json::from_str(&content)
            .with_context(|| format!("无法解析请求文件: {}", arg))?;
        return Ok(Some(request));
    }

    Ok(Some(StartRequest::from_asn_list(&arg)))
}
