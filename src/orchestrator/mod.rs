//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责队列推进和应用生命周期，是整个系统的"指挥中心"。
//!
//! ### `sequencer` - 队列状态机
//! - 持有一份 QueueState，逐个处理（同一时刻最多一个 ASN 在处理）
//! - 每成功一个就推进索引并落盘（先落盘再处理下一个）
//! - 失败时索引不动、批次停止，不自动重试
//! - 全部完成后触发收尾（汇总文档 + 清理）
//!
//! ### `app` - 应用生命周期
//! - 初始化日志、连接/启动浏览器
//! - 处理启动请求、恢复未完成批次
//! - 唯一持有 Browser 的模块（通过 EvidenceFlow）
//!
//! ## 层次关系
//!
//! ```text
//! app (生命周期 + 请求处理)
//!     ↓
//! sequencer (处理 Vec<Asn>，推进 QueueState)
//!     ↓
//! workflow::EvidenceFlow (处理单个 Asn)
//!     ↓
//! services (能力层：artifacts / documents / sink)
//!     ↓
//! infrastructure (基础设施：TabDriver)
//! ```

pub mod app;
pub mod sequencer;

// 重新导出主要类型
pub use app::App;
pub use sequencer::{Finalizer, ItemProcessor, Sequencer};
