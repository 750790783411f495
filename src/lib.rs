//! # xid_fixer
//!
//! 修复 Canvas 课程从 Blackboard 迁移后遗留的 `xid` 失效图片：
//! 读取课程的链接校验报告，逐个打开含失效图片的条目，
//! 在 TinyMCE 编辑器中把每张失效图片换成已上传的新图片。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Browser / Page），只暴露能力
//! - `Session` / `Tab` - 浏览器驱动抽象，生产环境由 chromiumoxide 实现
//! - `retry` - 有界轮询与重试
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个编辑器
//! - `EditorMarkup` - HTML 片段解析
//! - `repair_editor` - 失效图片替换算法
//! - `TinyMceEditor` - TinyMCE 与图片选择器交互
//! - `hover_and_click` - 悬停后点击
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个条目"的完整处理流程
//! - `dispatch` - 按内容类型分派
//! - `question_pool` - 题库 / 测验题逐题处理
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 多门课程，管理资源
//! - `orchestrator/course_runner` - 单门课程的状态机
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod selectors;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::{Config, Timeouts};
pub use error::{AbortCode, DriverError, FixError, FixResult};
pub use models::{ContentKind, CourseTarget, FixOutcome, RunSummary, ValidationItem};
pub use orchestrator::{App, CourseBatch, CourseRunner, ProgressEvent};
pub use workflow::FixSettings;
