//! 批次收尾 - 流程层
//!
//! 批次全部处理完毕后，把暂存的截图按提交顺序拼成一份
//! 汇总文档写出，然后清空暂存仓库。

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{Asn, QueueState};
use crate::orchestrator::Finalizer;
use crate::progress::ProgressPublisher;
use crate::services::{ArtifactStore, CapturedArtifact, DocumentBuilder, DownloadSink};

/// 汇总收尾器
pub struct SummaryFinalizer {
    artifacts: Arc<ArtifactStore>,
    documents: DocumentBuilder,
    sink: DownloadSink,
    publisher: ProgressPublisher,
}

impl SummaryFinalizer {
    /// 创建新的汇总收尾器
    pub fn new(artifacts: Arc<ArtifactStore>, config: &Config, publisher: ProgressPublisher) -> Self {
        Self {
            artifacts,
            documents: DocumentBuilder::new(),
            sink: DownloadSink::new(&config.output_folder),
            publisher,
        }
    }
}

#[async_trait]
impl Finalizer for SummaryFinalizer {
    async fn finalize(&self, state: &QueueState) -> Result<()> {
        info!("📄 正在生成批次汇总文档...");
        self.publisher.step("生成汇总文档");

        // 按提交顺序取走每个 ASN 的截图
        let sections: Vec<(Asn, Vec<CapturedArtifact>)> = state
            .items
            .iter()
            .map(|asn| (asn.clone(), self.artifacts.take_for_asn(&state.output_folder, asn)))
            .collect();

        let missing = sections.iter().filter(|(_, a)| a.is_empty()).count();
        if missing > 0 {
            // 恢复的批次里，重启前处理过的 ASN 截图已不在内存中
            warn!("⚠️ {} 个 ASN 没有暂存截图（可能来自恢复的批次）", missing);
        }

        let document = self.documents.summary_document(&sections);
        let path = self.sink.write("summary", "html", document.as_bytes()).await?;

        // 汇总完成后清空暂存
        self.artifacts.clear();

        info!("✅ 汇总文档已生成: {}", path.display());
        self.publisher
            .log_success(format!("汇总文档已生成: {}", path.display()));
        Ok(())
    }
}
