//! 工作项上下文
//!
//! 封装"我正在处理批次里的第几个 ASN"这一信息

use std::fmt::Display;

use crate::models::Asn;

/// 工作项上下文
///
/// 包含处理单个 ASN 所需的全部上下文信息
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 待处理的 ASN
    pub asn: Asn,

    /// 在批次中的序号（从 1 开始，仅用于日志显示）
    pub item_index: usize,

    /// 批次总数
    pub total: usize,

    /// 证据文件输出目录
    pub output_folder: String,
}

impl ItemCtx {
    /// 创建新的工作项上下文
    pub fn new(asn: Asn, item_index: usize, total: usize, output_folder: String) -> Self {
        Self {
            asn,
            item_index,
            total,
            output_folder,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[ASN#{} 第{}/{}个]",
            self.asn, self.item_index, self.total
        )
    }
}
