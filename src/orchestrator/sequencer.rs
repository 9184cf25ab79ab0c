//! 队列状态机 - 编排层
//!
//! ## 职责
//!
//! 持有一份 `QueueState`，用显式循环逐个处理 ASN：
//!
//! 1. **逐个处理**：同一时刻最多一个 ASN 在处理（页面是独占资源）
//! 2. **先落盘再继续**：成功后先推进索引并持久化，崩溃重启从 i+1 恢复
//! 3. **失败即停**：失败时索引不动、批次停止，不自动重试
//! 4. **收尾**：索引到达 total 后触发一次收尾（空批次直接收尾）
//!
//! 处理能力和收尾动作通过 trait 注入，状态机本身不接触浏览器。

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

use crate::error::ProcessError;
use crate::models::QueueState;
use crate::progress::ProgressPublisher;
use crate::store::QueueStore;
use crate::workflow::ItemCtx;

/// 单个工作项的处理能力
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    /// 处理一个 ASN；返回错误时队列索引不得推进
    async fn process(&self, ctx: &ItemCtx) -> Result<(), ProcessError>;
}

/// 批次收尾能力
#[async_trait]
pub trait Finalizer: Send + Sync {
    /// 批次全部处理完毕后调用恰好一次
    async fn finalize(&self, state: &QueueState) -> Result<()>;
}

/// 队列状态机
pub struct Sequencer<'a> {
    store: &'a QueueStore,
    publisher: &'a ProgressPublisher,
}

impl<'a> Sequencer<'a> {
    /// 创建新的状态机
    pub fn new(store: &'a QueueStore, publisher: &'a ProgressPublisher) -> Self {
        Self { store, publisher }
    }

    /// 运行批次：从 `state.current_index` 处理到队尾，然后收尾
    ///
    /// 返回收尾后的最终状态（`current_index == total`）。
    pub async fn run<P, F>(
        &self,
        mut state: QueueState,
        processor: &P,
        finalizer: &F,
    ) -> Result<QueueState>
    where
        P: ItemProcessor,
        F: Finalizer,
    {
        state.validate()?;

        // ========== 逐个处理（显式循环，而非递归重启） ==========
        while let Some(asn) = state.current().cloned() {
            let item_index = state.current_index + 1;
            let ctx = ItemCtx::new(
                asn.clone(),
                item_index,
                state.total,
                state.output_folder.clone(),
            );
            log_item_start(&ctx);
            self.publisher.progress(item_index, state.total);
            self.publisher.log(format!(
                "正在处理 ASN {}/{}: {}",
                item_index, state.total, asn
            ));

            match processor.process(&ctx).await {
                Ok(()) => {
                    // 先推进并落盘，再开始下一个
                    state.advance()?;
                    self.store.save(&state).await?;
                    info!(
                        "[ASN {}] ✓ 完成，进度已落盘 ({}/{})",
                        item_index, state.current_index, state.total
                    );
                }
                Err(e) => {
                    // 索引不推进，批次停止，不自动重试
                    error!("[ASN {}] ❌ 处理失败: {}", item_index, e);
                    self.publisher
                        .log_error(format!("ASN {} 处理失败: {}", asn, e));
                    return Err(e).with_context(|| {
                        format!("处理 ASN {} (第 {}/{} 个) 失败，批次已停止", asn, item_index, state.total)
                    });
                }
            }
        }

        // ========== 收尾 ==========
        info!("📦 批次处理完毕 ({} 个)，开始收尾...", state.total);
        self.publisher.step("全部 ASN 处理完毕");
        finalizer.finalize(&state).await?;
        self.store.clear().await?;

        self.publisher.log_success("批次处理完成");
        Ok(state)
    }
}

// ========== 日志辅助函数 ==========

fn log_item_start(ctx: &ItemCtx) {
    info!("\n{}", "─".repeat(60));
    info!("开始处理 {}", ctx);
    info!("{}", "─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asn;
    use std::sync::Mutex;

    /// 记录调用顺序的测试处理器，可配置在第几个（从 1 计）失败
    struct RecordingProcessor {
        calls: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    impl RecordingProcessor {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ItemProcessor for RecordingProcessor {
        async fn process(&self, ctx: &ItemCtx) -> Result<(), ProcessError> {
            self.calls.lock().unwrap().push(ctx.asn.as_str().to_string());
            if self.fail_on == Some(ctx.item_index) {
                return Err(ProcessError::EmptyCapture {
                    label: "测试".to_string(),
                });
            }
            Ok(())
        }
    }

    /// 记录收尾调用的测试收尾器
    #[derive(Default)]
    struct RecordingFinalizer {
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl RecordingFinalizer {
        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Finalizer for RecordingFinalizer {
        async fn finalize(&self, state: &QueueState) -> Result<()> {
            let items = state.items.iter().map(|a| a.as_str().to_string()).collect();
            self.calls.lock().unwrap().push(items);
            Ok(())
        }
    }

    fn state_of(names: &[&str]) -> QueueState {
        let items = names.iter().map(|n| Asn::parse(n).unwrap()).collect();
        QueueState::new(items, "out")
    }

    fn store_in(dir: &tempfile::TempDir) -> QueueStore {
        QueueStore::new(dir.path().join("queue_state.toml"))
    }

    #[tokio::test]
    async fn test_processes_items_in_order_then_finalizes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let publisher = ProgressPublisher::default();
        let processor = RecordingProcessor::new(None);
        let finalizer = RecordingFinalizer::default();

        let final_state = Sequencer::new(&store, &publisher)
            .run(state_of(&["alice", "bob"]), &processor, &finalizer)
            .await
            .unwrap();

        assert_eq!(processor.calls(), vec!["alice", "bob"]);
        assert_eq!(final_state.current_index, 2);
        assert_eq!(final_state.total, 2);
        // 收尾恰好一次，拿到完整的批次
        assert_eq!(finalizer.calls(), vec![vec!["alice".to_string(), "bob".to_string()]]);
        // 收尾后状态文件已清理
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_halts_without_advancing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let publisher = ProgressPublisher::default();
        // 第二个（索引 1 的 bob）失败
        let processor = RecordingProcessor::new(Some(2));
        let finalizer = RecordingFinalizer::default();

        let result = Sequencer::new(&store, &publisher)
            .run(state_of(&["alice", "bob", "carol"]), &processor, &finalizer)
            .await;

        assert!(result.is_err());
        // bob 被调用过但失败，carol 不再调用
        assert_eq!(processor.calls(), vec!["alice", "bob"]);
        // 持久化的索引停在失败项（alice 成功后落盘的 1）
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.current_index, 1);
        // 收尾没有被调用
        assert!(finalizer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_goes_straight_to_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let publisher = ProgressPublisher::default();
        let processor = RecordingProcessor::new(None);
        let finalizer = RecordingFinalizer::default();

        let final_state = Sequencer::new(&store, &publisher)
            .run(state_of(&[]), &processor, &finalizer)
            .await
            .unwrap();

        assert!(processor.calls().is_empty());
        assert_eq!(finalizer.calls().len(), 1);
        assert!(final_state.is_complete());
    }

    #[tokio::test]
    async fn test_resume_skips_already_processed_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let publisher = ProgressPublisher::default();
        let processor = RecordingProcessor::new(None);
        let finalizer = RecordingFinalizer::default();

        // 模拟重启后恢复：索引已推进到 1
        let mut state = state_of(&["alice", "bob", "carol"]);
        state.advance().unwrap();

        Sequencer::new(&store, &publisher)
            .run(state, &processor, &finalizer)
            .await
            .unwrap();

        assert_eq!(processor.calls(), vec!["bob", "carol"]);
        assert_eq!(finalizer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_events_are_published() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let publisher = ProgressPublisher::default();
        let mut rx = publisher.subscribe();
        let processor = RecordingProcessor::new(None);
        let finalizer = RecordingFinalizer::default();

        Sequencer::new(&store, &publisher)
            .run(state_of(&["alice"]), &processor, &finalizer)
            .await
            .unwrap();

        // 第一个事件是 1/1 的进度通知
        assert_eq!(
            rx.recv().await.unwrap(),
            crate::progress::ProgressEvent::Progress { current: 1, total: 1 }
        );
    }
}
