//! 队列状态持久化
//!
//! 把 `QueueState` 整体写入一个 TOML 文件，进程重启后可恢复。
//! 写入采用 临时文件 + 原子重命名，任一时刻磁盘上要么是旧状态、
//! 要么是新状态，不会出现写了一半的文件。

use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use crate::error::StateError;
use crate::models::QueueState;

/// 队列状态存储
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    /// 创建指向指定状态文件的存储
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 加载持久化的队列状态
    ///
    /// 文件不存在时返回 `Ok(None)`；文件存在但不变量被破坏时报错。
    pub async fn load(&self) -> Result<Option<QueueState>, StateError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StateError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        let state: QueueState = toml::from_str(&content).map_err(|e| StateError::Parse {
            path: self.path.display().to_string(),
            source: e,
        })?;
        state.validate()?;

        debug!(
            "已加载队列状态: {}/{} (文件: {})",
            state.current_index,
            state.total,
            self.path.display()
        );
        Ok(Some(state))
    }

    /// 原子地保存队列状态
    pub async fn save(&self, state: &QueueState) -> Result<(), StateError> {
        state.validate()?;

        let content =
            toml::to_string_pretty(state).map_err(|e| StateError::Serialize { source: e })?;

        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| StateError::Write {
                path: tmp_path.display().to_string(),
                source: e,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StateError::Write {
                path: self.path.display().to_string(),
                source: e,
            })?;

        debug!(
            "已保存队列状态: {}/{} (文件: {})",
            state.current_index,
            state.total,
            self.path.display()
        );
        Ok(())
    }

    /// 删除状态文件（批次完成后的清理，文件不存在不算错）
    pub async fn clear(&self) -> Result<(), StateError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::Write {
                path: self.path.display().to_string(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asn;

    fn sample_state() -> QueueState {
        let items = vec![Asn::parse("alice").unwrap(), Asn::parse("bob").unwrap()];
        QueueState::new(items, "out")
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::new(dir.path().join("queue_state.toml"));

        let mut state = sample_state();
        state.advance().unwrap();
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.current_index, 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::new(dir.path().join("missing.toml"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::new(dir.path().join("queue_state.toml"));

        store.save(&sample_state()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // 再清一次也不报错
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_load_rejects_tampered_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue_state.toml");
        // 手改过的状态文件里混入了非法 ASN
        let tampered = concat!(
            "items = [\"alice\", \"<script>alert(1)</script>\"]\n",
            "current_index = 0\n",
            "total = 2\n",
            "output_folder = \"out\"\n",
        );
        fs::write(&path, tampered).await.unwrap();

        let store = QueueStore::new(&path);
        assert!(matches!(store.load().await, Err(StateError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_save_rejects_broken_invariant() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::new(dir.path().join("queue_state.toml"));

        let mut state = sample_state();
        state.current_index = 9;
        assert!(store.save(&state).await.is_err());
    }
}
