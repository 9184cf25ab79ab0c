//! 应用生命周期 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：启动日志、连接/启动浏览器、组装各层
//! 2. **请求处理**：接收启动请求，写入全新的队列状态并运行
//! 3. **批次恢复**：启动时发现未完成的持久化队列则从断点继续
//! 4. **资源管理**：Browser 由 EvidenceFlow 的页面工厂持有，全程只有一份

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::BrowserTabs;
use crate::models::{QueueState, StartRequest, StartResponse};
use crate::orchestrator::Sequencer;
use crate::progress::ProgressPublisher;
use crate::services::ArtifactStore;
use crate::store::QueueStore;
use crate::utils::logging;
use crate::workflow::{EvidenceFlow, SummaryFinalizer};

/// 应用主结构
pub struct App {
    config: Config,
    publisher: ProgressPublisher,
    store: QueueStore,
    flow: EvidenceFlow,
    finalizer: SummaryFinalizer,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        // 连接或启动浏览器
        let browser = if config.headless {
            browser::launch_headless_browser().await?
        } else {
            browser::connect_to_browser(config.browser_debug_port).await?
        };

        let publisher = ProgressPublisher::default();
        let artifacts = Arc::new(ArtifactStore::new());
        let tabs = BrowserTabs::new(browser, Duration::from_millis(config.load_timeout_ms));
        let flow = EvidenceFlow::new(Box::new(tabs), artifacts.clone(), &config, publisher.clone());
        let finalizer = SummaryFinalizer::new(artifacts, &config, publisher.clone());
        let store = QueueStore::new(&config.state_file);

        Ok(Self {
            config,
            publisher,
            store,
            flow,
            finalizer,
        })
    }

    /// 进度发布器（调试界面等订阅用）
    pub fn progress(&self) -> &ProgressPublisher {
        &self.publisher
    }

    /// 处理启动请求
    ///
    /// 新批次覆盖已持久化的旧状态（索引归零），然后同步运行到
    /// 批次结束或首个失败。
    pub async fn handle_start(&self, request: StartRequest) -> StartResponse {
        if !request.is_start() {
            return StartResponse::failed(format!("不支持的 action: {}", request.action));
        }

        let items = request.parsed_items();
        if items.is_empty() {
            return StartResponse::failed("请至少提供一个合法的 ASN");
        }

        info!("收到启动请求: {} 个 ASN", items.len());
        let state = QueueState::new(items, &self.config.output_folder);
        if let Err(e) = self.store.save(&state).await {
            return StartResponse::failed(e.to_string());
        }

        match self.run_batch(state).await {
            Ok(()) => StartResponse::ok(),
            Err(e) => StartResponse::failed(format!("{:#}", e)),
        }
    }

    /// 恢复上次未完成的批次（没有持久化状态时什么都不做）
    pub async fn resume(&self) -> Result<()> {
        match self.store.load().await? {
            Some(state) if !state.is_complete() => {
                info!(
                    "🔄 发现未完成批次，从第 {}/{} 个继续",
                    state.current_index + 1,
                    state.total
                );
                self.run_batch(state).await
            }
            Some(state) => {
                // 上次在收尾前退出：直接补一次收尾
                info!("发现已处理完毕的批次，补做收尾");
                self.run_batch(state).await
            }
            None => {
                info!("没有待恢复的批次");
                Ok(())
            }
        }
    }

    async fn run_batch(&self, state: QueueState) -> Result<()> {
        let total = state.total;
        let sequencer = Sequencer::new(&self.store, &self.publisher);
        let final_state = sequencer.run(state, &self.flow, &self.finalizer).await?;

        logging::print_final_stats(final_state.current_index, total, &self.config);
        Ok(())
    }
}
