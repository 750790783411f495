//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，把需要人工跟进的条目追加到文件末尾

use anyhow::Result;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::models::ValidationItem;

/// 警告写入服务
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 追加一行：课程 | 类型 | URL | 原因
    pub async fn write(&self, course: &str, item: &ValidationItem, reason: &str) -> Result<()> {
        debug!("写入警告: 课程 {} | {}", course, item.url);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await?;

        let warn_msg = format!(
            "课程 {} | {} | {} | {} | {}\n",
            course,
            item.kind(),
            item.title,
            item.url,
            reason
        );

        file.write_all(warn_msg.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
