//! 命令行参数

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::models::{load_course_list, CourseTarget};
use crate::orchestrator::CourseBatch;

#[derive(Parser, Debug, Default)]
#[command(name = "xid_fixer")]
#[command(about = "修复 Canvas 课程中迁移遗留的 xid 失效图片")]
pub struct Cli {
    /// 课程 ID 或完整课程 URL（可重复）
    #[arg(short = 'c', long = "course")]
    pub courses: Vec<String>,

    /// 课程列表 TOML 文件
    #[arg(long)]
    pub courses_file: Option<PathBuf>,

    /// 即使已有结果也重新运行链接校验
    #[arg(long, default_value_t = false)]
    pub force_refresh_links: bool,

    /// 题库从第几道题开始（从0开始）
    #[arg(long, default_value_t = 0)]
    pub start_index: usize,
}

impl Cli {
    /// 合并命令行与课程列表文件
    ///
    /// 命令行中的课程排在前面；任一来源要求刷新即刷新。
    pub async fn into_batch(self) -> Result<CourseBatch> {
        let mut targets: Vec<CourseTarget> = self
            .courses
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(CourseTarget::new)
            .collect();
        let mut force_refresh = self.force_refresh_links;

        if let Some(path) = &self.courses_file {
            let list = load_course_list(path).await?;
            force_refresh |= list.force_refresh;
            targets.extend(list.targets());
        }

        Ok(CourseBatch {
            targets,
            force_refresh,
            start_index: self.start_index,
        })
    }
}
