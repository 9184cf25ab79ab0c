//! 流程层（Workflow Layer）
//!
//! 定义"一个 ASN"的完整处理流程：
//!
//! ```text
//! EvidenceFlow (处理单个 ASN)
//!     ├── 搜索引擎：开页 → 等加载 → 注入搜索 → 等安静 → 截图
//!     ├── ASN 主页：开页 → 等加载 → 等安静 → 截图
//!     └── 生成单个 ASN 的证据文档并落盘
//! SummaryFinalizer (批次收尾)
//!     └── 汇总全部截图 → 生成汇总文档 → 清空暂存
//! ```
//!
//! 流程层不持有队列状态，队列推进由编排层负责。

pub mod evidence_flow;
pub mod item_ctx;
pub mod summary_finalizer;

pub use evidence_flow::EvidenceFlow;
pub use item_ctx::ItemCtx;
pub use summary_finalizer::SummaryFinalizer;
