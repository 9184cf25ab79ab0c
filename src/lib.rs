//! # ASN Evidence Capture
//!
//! 一个用于自动化采集 ASN 证据截图的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `Tab` / `TabOpener` - 页面能力与页面工厂的 trait 接缝
//! - `TabDriver` - 唯一的 page owner，提供导航 / 等待加载 / 截图能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个 ASN
//! - `ArtifactStore` - 截图暂存能力（按 目录+ASN+来源 索引）
//! - `DocumentBuilder` - 生成 HTML 证据文档能力
//! - `DownloadSink` - 带时间戳文件名的落盘能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个 ASN"的完整处理流程
//! - `ItemCtx` - 上下文封装（asn + 批次索引 + 输出目录）
//! - `EvidenceFlow` - 流程编排（开页 → 等待加载 → 搜索 → 截图 → 落盘）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/sequencer` - 队列状态机，逐个处理并持久化进度
//! - `orchestrator/app` - 应用生命周期，持有 Browser 资源
//!
//! ## 队列语义
//!
//! 队列状态（待处理 ASN 列表 + 当前索引）持久化在 TOML 文件中，
//! 每成功处理一个 ASN 之后才推进并落盘索引，因此进程重启后从
//! 上次成功位置继续（每个 ASN 至少处理一次，而非恰好一次）。

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ProcessError, StateError};
pub use infrastructure::{BrowserTabs, Tab, TabDriver, TabOpener};
pub use models::{Asn, QueueState, StartRequest, StartResponse};
pub use orchestrator::{App, Finalizer, ItemProcessor, Sequencer};
pub use progress::{ProgressEvent, ProgressPublisher};
pub use store::QueueStore;
pub use workflow::{EvidenceFlow, ItemCtx, SummaryFinalizer};
