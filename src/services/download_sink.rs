//! 落盘服务 - 业务能力层
//!
//! 接受 (内容, 文件名主干, 扩展名)，在输出目录下写出带时间戳
//! 后缀的文件，避免同名覆盖。

use std::path::PathBuf;

use chrono::Local;
use tokio::fs;
use tracing::info;

use crate::error::ProcessError;

/// 下载落盘器
pub struct DownloadSink {
    output_folder: PathBuf,
}

impl DownloadSink {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    /// 写出一个文件，文件名为 `{stem}-{时间戳}.{ext}`
    pub async fn write(
        &self,
        stem: &str,
        ext: &str,
        content: &[u8],
    ) -> Result<PathBuf, ProcessError> {
        fs::create_dir_all(&self.output_folder)
            .await
            .map_err(|e| ProcessError::Output {
                path: self.output_folder.display().to_string(),
                source: e,
            })?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}-{}.{}", stem, timestamp, ext);
        let path = self.output_folder.join(filename);

        fs::write(&path, content)
            .await
            .map_err(|e| ProcessError::Output {
                path: path.display().to_string(),
                source: e,
            })?;

        info!("📥 已写入: {}", path.display());
        Ok(path)
    }
}
