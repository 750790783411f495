//! 批量课程处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责多门课程的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、连接浏览器、创建会话
//! 2. **顺序处理**：课程逐门处理，共用同一个浏览器会话
//! 3. **故障隔离**：一门课程中止不影响下一门
//! 4. **全局统计**：汇总所有课程的处理结果

use anyhow::Result;
use tracing::warn;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{CdpSession, Session};
use crate::models::{CourseTarget, RunSummary};
use crate::orchestrator::course_runner::CourseRunner;
use crate::orchestrator::events::{LogSink, ProgressSink};
use crate::services::WarnWriter;
use crate::utils::logging;
use crate::workflow::FixSettings;

/// 一次运行要处理的课程
#[derive(Debug, Clone, Default)]
pub struct CourseBatch {
    pub targets: Vec<CourseTarget>,
    /// 强制重新运行链接校验
    pub force_refresh: bool,
    /// 题库从第几道题开始
    pub start_index: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    session: CdpSession,
    warn_writer: WarnWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        let (browser, page) =
            browser::connect_to_browser_and_page(config.browser_debug_port, Some(&config.base_url)).await?;

        Ok(Self {
            session: CdpSession::new(browser, page),
            warn_writer: WarnWriter::with_path(config.warn_file.clone()),
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, batch: &CourseBatch) -> Result<Vec<RunSummary>> {
        if batch.targets.is_empty() {
            warn!("⚠️ 没有指定任何课程，程序结束");
            return Ok(Vec::new());
        }

        let summaries = run_courses(
            &self.session,
            &self.config,
            &LogSink,
            Some(&self.warn_writer),
            batch,
        )
        .await;

        for summary in &summaries {
            logging::append_course_result(&self.config.output_log_file, summary)?;
        }
        logging::print_final_stats(&summaries, &self.config.output_log_file);

        Ok(summaries)
    }
}

/// 按顺序处理每门课程
pub async fn run_courses<S: Session>(
    session: &S,
    config: &Config,
    sink: &dyn ProgressSink,
    warn_writer: Option<&WarnWriter>,
    batch: &CourseBatch,
) -> Vec<RunSummary> {
    let total = batch.targets.len();
    let settings = FixSettings::from_config(config).with_start_index(batch.start_index);
    let mut summaries = Vec::with_capacity(total);

    for (index, target) in batch.targets.iter().enumerate() {
        logging::log_course_start(index + 1, total, target.raw());

        let mut runner = CourseRunner::new(session, config, sink)
            .with_settings(settings.clone())
            .force_refresh(batch.force_refresh);
        if let Some(writer) = warn_writer {
            runner = runner.with_warn_writer(writer);
        }

        let summary = runner.run(target).await;
        logging::log_course_complete(&summary);
        summaries.push(summary);
    }

    summaries
}
