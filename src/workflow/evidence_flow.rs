//! 证据采集流程 - 流程层
//!
//! 核心职责：定义"一个 ASN"的完整处理流程
//!
//! 流程顺序：
//! 1. 搜索引擎：开页 → 等加载 → 注入搜索脚本并等结果页加载 → 等安静 → 截图
//! 2. ASN 主页：开页 → 等加载 → 等安静 → 截图
//! 3. 生成该 ASN 的证据文档并落盘
//!
//! 每个目标独占一个页面，无论成败都在退出前关闭。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::info;

use crate::config::Config;
use crate::error::ProcessError;
use crate::infrastructure::{Tab, TabOpener};
use crate::orchestrator::ItemProcessor;
use crate::progress::ProgressPublisher;
use crate::services::{ArtifactStore, DocumentBuilder, DownloadSink};
use crate::workflow::item_ctx::ItemCtx;

/// 搜索结果截图的来源标签
pub const SEARCH_LABEL: &str = "搜索结果";
/// ASN 主页截图的来源标签
pub const PROFILE_LABEL: &str = "GitHub 主页";

/// 证据采集流程
///
/// - 编排单个 ASN 的完整采集流程
/// - 通过 `TabOpener` 按需开页，用完即关
/// - 不持有队列状态
pub struct EvidenceFlow {
    tabs: Box<dyn TabOpener>,
    artifacts: Arc<ArtifactStore>,
    documents: DocumentBuilder,
    sink: DownloadSink,
    publisher: ProgressPublisher,
    config: Config,
}

impl EvidenceFlow {
    /// 创建新的证据采集流程
    pub fn new(
        tabs: Box<dyn TabOpener>,
        artifacts: Arc<ArtifactStore>,
        config: &Config,
        publisher: ProgressPublisher,
    ) -> Self {
        Self {
            tabs,
            artifacts,
            documents: DocumentBuilder::new(),
            sink: DownloadSink::new(&config.output_folder),
            publisher,
            config: config.clone(),
        }
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.config.settle_delay_ms)
    }

    fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.config.quiet_window_ms)
    }

    /// ========== 目标 1: 搜索引擎结果 ==========
    async fn capture_search(&self, ctx: &ItemCtx) -> Result<(), ProcessError> {
        info!("[ASN {}] 🔍 打开搜索引擎...", ctx.item_index);
        self.publisher.step("打开搜索引擎");

        let tab = self.tabs.open(&self.config.search_url).await?;
        let outcome = self.run_search_on_tab(tab.as_ref(), ctx).await;
        // 无论成败都关闭页面
        tab.close().await;
        outcome
    }

    async fn run_search_on_tab(&self, tab: &dyn Tab, ctx: &ItemCtx) -> Result<(), ProcessError> {
        tab.wait_for_load().await?;
        tab.settle(self.settle_delay()).await;

        info!("[ASN {}] 注入搜索脚本: {}", ctx.item_index, ctx.asn);
        self.publisher.step("执行搜索");
        // 脚本提交表单后等的是结果页那次新的 load 完成
        let submitted = tab
            .eval_navigation_script(build_search_script(ctx.asn.as_str())?)
            .await?;
        if submitted.as_bool() != Some(true) {
            return Err(ProcessError::SearchInputNotFound {
                url: tab.url().to_string(),
            });
        }

        self.publisher.step("等待搜索结果");
        tab.wait_for_quiet(self.quiet_window()).await?;
        tab.settle(self.settle_delay()).await;

        self.capture_on_tab(tab, ctx, SEARCH_LABEL).await
    }

    /// ========== 目标 2: ASN 主页 ==========
    async fn capture_profile(&self, ctx: &ItemCtx) -> Result<(), ProcessError> {
        let url = self.config.profile_url(ctx.asn.as_str());
        info!("[ASN {}] 🌐 打开主页: {}", ctx.item_index, url);
        self.publisher.step("打开 ASN 主页");

        let tab = self.tabs.open(&url).await?;
        let outcome = self.run_profile_on_tab(tab.as_ref(), ctx).await;
        tab.close().await;
        outcome
    }

    async fn run_profile_on_tab(&self, tab: &dyn Tab, ctx: &ItemCtx) -> Result<(), ProcessError> {
        tab.wait_for_load().await?;
        tab.wait_for_quiet(self.quiet_window()).await?;
        tab.settle(self.settle_delay()).await;

        self.capture_on_tab(tab, ctx, PROFILE_LABEL).await
    }

    /// 截图并暂存
    async fn capture_on_tab(
        &self,
        tab: &dyn Tab,
        ctx: &ItemCtx,
        label: &str,
    ) -> Result<(), ProcessError> {
        info!("[ASN {}] 📸 截图: {}", ctx.item_index, label);
        self.publisher.step("截图");

        let png = tab.screenshot(label).await?;
        info!(
            "[ASN {}] ✓ 截图完成 ({} 字节): {}",
            ctx.item_index,
            png.len(),
            label
        );
        self.publisher
            .log_success(format!("截图完成: {} ({} 字节)", label, png.len()));

        self.artifacts
            .insert(&ctx.output_folder, &ctx.asn, label, BASE64.encode(&png));
        Ok(())
    }
}

#[async_trait]
impl ItemProcessor for EvidenceFlow {
    async fn process(&self, ctx: &ItemCtx) -> Result<(), ProcessError> {
        info!("[ASN {}] 开始处理: {}", ctx.item_index, ctx.asn);
        self.publisher.log(format!("开始处理 ASN: {}", ctx.asn));

        self.capture_search(ctx).await?;
        self.capture_profile(ctx).await?;

        // 生成并写出该 ASN 的证据文档
        info!("[ASN {}] 📄 生成证据文档...", ctx.item_index);
        self.publisher.step("生成证据文档");

        let artifacts = self.artifacts.get_for_asn(&ctx.output_folder, &ctx.asn);
        let document = self.documents.evidence_document(&ctx.asn, &artifacts);
        let path = self
            .sink
            .write(&format!("evidence-{}", ctx.asn), "html", document.as_bytes())
            .await?;

        info!(
            "[ASN {}] ✅ 处理完成，证据文档: {}",
            ctx.item_index,
            path.display()
        );
        self.publisher
            .log_success(format!("ASN {} 处理完成", ctx.asn));
        Ok(())
    }
}

/// 构造搜索脚本：填入查询词并提交表单
///
/// 查询词经 JSON 序列化转义后内插，选择器兼容主流搜索引擎的输入框。
/// 提交成功返回 true（即已触发导航），找不到输入框返回 false。
fn build_search_script(search_term: &str) -> Result<String, ProcessError> {
    let quoted =
        serde_json::to_string(search_term).map_err(|e| ProcessError::ScriptResult { source: e })?;
    Ok(format!(
        r#"
        (() => {{
            const searchTerm = {quoted};
            const searchInput = document.querySelector('input[name="q"]')
                || document.querySelector('textarea[name="q"]')
                || document.querySelector('input[title="Search"]')
                || document.querySelector('textarea[title="Search"]');
            if (!searchInput) {{
                return false;
            }}
            searchInput.value = searchTerm;
            searchInput.dispatchEvent(new Event('input', {{ bubbles: true }}));
            searchInput.dispatchEvent(new Event('change', {{ bubbles: true }}));
            searchInput.form.submit();
            return true;
        }})()
        "#,
        quoted = quoted
    ))
}
