//! 截图暂存服务 - 业务能力层
//!
//! 按 (输出目录, ASN, 来源标签) 索引暂存截图，等待汇总文档生成。
//! 汇总完成后取走并清空，截图不会留在内存里。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::models::Asn;

/// 截图索引键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ArtifactKey {
    folder: String,
    asn: String,
    label: String,
}

/// 一张已捕获的截图
#[derive(Debug, Clone)]
pub struct CapturedArtifact {
    /// 所属 ASN
    pub asn: String,
    /// 来源标签（同一个 ASN 的多张截图靠它区分）
    pub label: String,
    /// base64 编码的 PNG 数据
    pub image_base64: String,
    /// 捕获时间
    pub captured_at: DateTime<Local>,
}

/// 截图暂存仓库
///
/// 职责：
/// - 暂存单个批次内的全部截图
/// - 同键重复写入时覆盖旧值（重跑同一个 ASN 不会累积重复截图）
/// - 不认识流程，不做落盘
#[derive(Default)]
pub struct ArtifactStore {
    inner: Mutex<HashMap<ArtifactKey, CapturedArtifact>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ArtifactKey, CapturedArtifact>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 暂存一张截图
    pub fn insert(&self, folder: &str, asn: &Asn, label: &str, image_base64: String) {
        let key = ArtifactKey {
            folder: folder.to_string(),
            asn: asn.as_str().to_string(),
            label: label.to_string(),
        };
        let artifact = CapturedArtifact {
            asn: asn.as_str().to_string(),
            label: label.to_string(),
            image_base64,
            captured_at: Local::now(),
        };
        debug!("暂存截图: {} / {} / {}", folder, asn, label);
        self.lock().insert(key, artifact);
    }

    /// 读取某个 ASN 的全部截图（按标签排序，不移除）
    pub fn get_for_asn(&self, folder: &str, asn: &Asn) -> Vec<CapturedArtifact> {
        let map = self.lock();
        let mut artifacts: Vec<CapturedArtifact> = map
            .iter()
            .filter(|(key, _)| key.folder == folder && key.asn == asn.as_str())
            .map(|(_, artifact)| artifact.clone())
            .collect();
        artifacts.sort_by(|a, b| a.label.cmp(&b.label));
        artifacts
    }

    /// 取走某个 ASN 的全部截图（按标签排序，移除）
    pub fn take_for_asn(&self, folder: &str, asn: &Asn) -> Vec<CapturedArtifact> {
        let mut map = self.lock();
        let keys: Vec<ArtifactKey> = map
            .keys()
            .filter(|key| key.folder == folder && key.asn == asn.as_str())
            .cloned()
            .collect();
        let mut artifacts: Vec<CapturedArtifact> = keys
            .into_iter()
            .filter_map(|key| map.remove(&key))
            .collect();
        artifacts.sort_by(|a, b| a.label.cmp(&b.label));
        artifacts
    }

    /// 当前暂存的截图数量
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 清空全部暂存截图
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asn(s: &str) -> Asn {
        Asn::parse(s).unwrap()
    }

    #[test]
    fn test_insert_and_get_sorted_by_label() {
        let store = ArtifactStore::new();
        store.insert("out", &asn("alice"), "b-profile", "img2".to_string());
        store.insert("out", &asn("alice"), "a-search", "img1".to_string());

        let artifacts = store.get_for_asn("out", &asn("alice"));
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].label, "a-search");
        assert_eq!(artifacts[1].label, "b-profile");
        // get 不移除
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_same_key_overwrites() {
        let store = ArtifactStore::new();
        store.insert("out", &asn("alice"), "search", "old".to_string());
        store.insert("out", &asn("alice"), "search", "new".to_string());

        let artifacts = store.get_for_asn("out", &asn("alice"));
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].image_base64, "new");
    }

    #[test]
    fn test_take_removes_only_that_asn() {
        let store = ArtifactStore::new();
        store.insert("out", &asn("alice"), "search", "a".to_string());
        store.insert("out", &asn("bob"), "search", "b".to_string());

        let taken = store.take_for_asn("out", &asn("alice"));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].asn, "alice");
        assert_eq!(store.len(), 1);
        assert!(store.get_for_asn("out", &asn("alice")).is_empty());
    }

    #[test]
    fn test_folder_is_part_of_the_key() {
        let store = ArtifactStore::new();
        store.insert("batch1", &asn("alice"), "search", "a".to_string());
        store.insert("batch2", &asn("alice"), "search", "b".to_string());

        assert_eq!(store.get_for_asn("batch1", &asn("alice")).len(), 1);
        assert_eq!(store.get_for_asn("batch2", &asn("alice")).len(), 1);
    }
}
