//! 进度事件 - 编排层与展示层之间的接口
//!
//! 事件名和中止代码是固定词汇表，展示层按字符串匹配。

use serde_json::{json, Value as JsonValue};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::AbortCode;

/// 课程运行过程中发出的事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    CourseStarted { course: String },
    TotalItems(usize),
    WaitingForDuo,
    DuoSuccess,
    ItemSuccess { url: String },
    ItemFailed { url: String, reason: String },
    Done,
    Error(AbortCode),
}

impl ProgressEvent {
    /// 事件名
    pub fn code(&self) -> &'static str {
        match self {
            ProgressEvent::CourseStarted { .. } => "course_started",
            ProgressEvent::TotalItems(_) => "total_items",
            ProgressEvent::WaitingForDuo => "waiting_for_duo",
            ProgressEvent::DuoSuccess => "duo_success",
            ProgressEvent::ItemSuccess { .. } => "item_success",
            ProgressEvent::ItemFailed { .. } => "item_failed",
            ProgressEvent::Done => "done",
            ProgressEvent::Error(_) => "error",
        }
    }

    pub fn as_json_value(&self) -> JsonValue {
        let event = self.code();
        match self {
            ProgressEvent::CourseStarted { course } => json!({ "event": event, "course": course }),
            ProgressEvent::TotalItems(count) => json!({ "event": event, "count": count }),
            ProgressEvent::ItemSuccess { url } => json!({ "event": event, "url": url }),
            ProgressEvent::ItemFailed { url, reason } => {
                json!({ "event": event, "url": url, "reason": reason })
            }
            ProgressEvent::Error(code) => json!({ "event": event, "code": code.as_str() }),
            ProgressEvent::WaitingForDuo | ProgressEvent::DuoSuccess | ProgressEvent::Done => {
                json!({ "event": event })
            }
        }
    }
}

/// 事件接收方
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// 只写日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::CourseStarted { course } => info!("🚀 开始处理课程 {}", course),
            ProgressEvent::TotalItems(n) => info!("📋 找到 {} 个待修复条目", n),
            ProgressEvent::WaitingForDuo => info!("🔐 等待 Duo 二次验证..."),
            ProgressEvent::DuoSuccess => info!("✓ Duo 验证通过"),
            ProgressEvent::ItemSuccess { url } => info!("✅ 修复成功: {}", url),
            ProgressEvent::ItemFailed { url, reason } => warn!("❌ 修复失败: {} ({})", url, reason),
            ProgressEvent::Done => info!("🏁 课程处理完成"),
            ProgressEvent::Error(code) => error!("💥 课程中止: {}", code),
        }
    }
}

/// 通过 tokio channel 转发给展示层
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// 创建 sink 以及对应的接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            debug!("事件接收端已关闭");
        }
    }
}
