//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量课程处理器
//! - 管理应用生命周期（初始化、运行）
//! - 持有浏览器会话，逐门课程处理
//! - 输出全局统计信息
//!
//! ### `course_runner` - 单门课程处理器
//! - 登录、打开链接校验报告、筛选失效条目
//! - 去重后逐个条目分派处理
//! - 输出单门课程的 `RunSummary`
//!
//! ### `session` - 标签页生命周期
//! ### `events` - 发给展示层的进度事件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<CourseTarget>)
//!     ↓
//! course_runner (处理 Vec<ValidationItem>)
//!     ↓
//! session → workflow::dispatch (处理单个条目)
//!     ↓
//! services (能力层：editor_repair / tinymce / hover / warn)
//!     ↓
//! infrastructure (基础设施：Session / Tab / retry)
//! ```

pub mod batch_processor;
pub mod course_runner;
pub mod events;
pub mod session;

// 重新导出主要类型
pub use batch_processor::{run_courses, App, CourseBatch};
pub use course_runner::{CourseRunner, RunState};
pub use events::{ChannelSink, LogSink, ProgressEvent, ProgressSink};
pub use session::run_item_in_tab;
