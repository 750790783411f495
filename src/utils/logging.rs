use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::RunSummary;

/// 安装 tracing 订阅器（`RUST_LOG` 控制级别，默认 info）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n失效图片修复日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一门课程的结果
pub fn append_course_result(log_file_path: &str, summary: &RunSummary) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", format_course_result(summary))?;
    Ok(())
}

fn format_course_result(summary: &RunSummary) -> String {
    match summary.aborted {
        Some(code) => format!("课程 {} | 中止: {}", summary.course, code),
        None => format!(
            "课程 {} | 成功 {}/{} | 失败 {} | 重复跳过 {}",
            summary.course,
            summary.fixed(),
            summary.attempted,
            summary.failed,
            summary.skipped_duplicate
        ),
    }
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 失效图片修复");
    info!("🌐 站点: {}", config.base_url);
    info!("🔖 标记: {}", config.marker);
    info!("{}", "=".repeat(60));
}

/// 记录课程开始信息
pub fn log_course_start(index: usize, total: usize, course: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 门课程: {}", index, total, course);
    info!("{}", "=".repeat(60));
}

/// 记录课程完成信息
pub fn log_course_complete(summary: &RunSummary) {
    info!("\n{}", "─".repeat(60));
    info!("✓ {}", format_course_result(summary));
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summaries: &[RunSummary], log_file_path: &str) {
    let attempted: usize = summaries.iter().map(|s| s.attempted).sum();
    let failed: usize = summaries.iter().map(|s| s.failed).sum();
    let aborted = summaries.iter().filter(|s| s.is_aborted()).count();

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📚 课程: {} (中止 {})", summaries.len(), aborted);
    info!("✅ 成功: {}/{}", attempted - failed, attempted);
    info!("❌ 失败: {}", failed);
    if attempted > 0 {
        info!(
            "📈 成功率: {:.1}%",
            (attempted - failed) as f64 * 100.0 / attempted as f64
        );
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AbortCode;
    use crate::models::{FixOutcome, ValidationItem};

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("校验结果", 10), "校验结果");
    }

    #[test]
    fn test_format_course_result() {
        let mut summary = RunSummary::new("42");
        summary.record(ValidationItem::new("a", "Page", "/a"), FixOutcome::Fixed);
        assert_eq!(
            format_course_result(&summary),
            "课程 42 | 成功 1/1 | 失败 0 | 重复跳过 0"
        );

        summary.abort(AbortCode::DuoFail);
        assert_eq!(format_course_result(&summary), "课程 42 | 中止: duo_fail");
    }
}
