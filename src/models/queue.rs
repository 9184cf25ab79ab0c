//! 队列状态
//!
//! 一个批次的全部状态：待处理 ASN 列表 + 当前索引 + 输出目录。
//! 不变量：`0 <= current_index <= total` 且 `total == items.len()`。
//! 状态只在编排层持有一份，每次成功推进后整体落盘。

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::models::asn::Asn;

/// 一个批次的队列状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    /// 待处理的 ASN（按提交顺序）
    pub items: Vec<Asn>,
    /// 下一个待处理项的索引
    pub current_index: usize,
    /// 批次总数（恒等于 items.len()）
    pub total: usize,
    /// 证据文件输出目录
    pub output_folder: String,
}

impl QueueState {
    /// 创建新批次（索引归零）
    pub fn new(items: Vec<Asn>, output_folder: impl Into<String>) -> Self {
        let total = items.len();
        Self {
            items,
            current_index: 0,
            total,
            output_folder: output_folder.into(),
        }
    }

    /// 校验不变量（从文件加载后必须调用）
    pub fn validate(&self) -> Result<(), StateError> {
        if self.total != self.items.len() {
            return Err(StateError::Invalid {
                reason: format!("total={} 与 items.len()={} 不一致", self.total, self.items.len()),
            });
        }
        if self.current_index > self.total {
            return Err(StateError::Invalid {
                reason: format!("current_index={} 超过 total={}", self.current_index, self.total),
            });
        }
        Ok(())
    }

    /// 当前待处理的 ASN（批次已完成时返回 None）
    pub fn current(&self) -> Option<&Asn> {
        self.items.get(self.current_index)
    }

    /// 成功处理当前项后推进索引
    pub fn advance(&mut self) -> Result<(), StateError> {
        if self.is_complete() {
            return Err(StateError::Invalid {
                reason: "批次已完成，无法继续推进".to_string(),
            });
        }
        self.current_index += 1;
        Ok(())
    }

    /// 批次是否已全部处理完毕
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.total
    }

    /// 剩余未处理数量
    pub fn remaining(&self) -> usize {
        self.total - self.current_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asns(names: &[&str]) -> Vec<Asn> {
        names.iter().map(|n| Asn::parse(n).unwrap()).collect()
    }

    #[test]
    fn test_new_batch_starts_at_zero() {
        let state = QueueState::new(asns(&["alice", "bob"]), "out");
        assert_eq!(state.current_index, 0);
        assert_eq!(state.total, 2);
        assert!(!state.is_complete());
        assert_eq!(state.current().unwrap().as_str(), "alice");
    }

    #[test]
    fn test_advance_until_complete() {
        let mut state = QueueState::new(asns(&["alice", "bob"]), "out");
        state.advance().unwrap();
        assert_eq!(state.current().unwrap().as_str(), "bob");
        assert_eq!(state.remaining(), 1);
        state.advance().unwrap();
        assert!(state.is_complete());
        assert!(state.current().is_none());
        // 完成后继续推进是状态错误
        assert!(state.advance().is_err());
    }

    #[test]
    fn test_empty_batch_is_immediately_complete() {
        let state = QueueState::new(vec![], "out");
        assert!(state.is_complete());
        assert!(state.current().is_none());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_validate_rejects_inconsistent_state() {
        let mut state = QueueState::new(asns(&["alice"]), "out");
        state.total = 5;
        assert!(state.validate().is_err());

        let mut state = QueueState::new(asns(&["alice"]), "out");
        state.current_index = 2;
        assert!(state.validate().is_err());
    }
}
