use crate::models::validation::CourseTarget;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 课程列表文件
///
/// ```toml
/// force_refresh = true
/// courses = ["12345", "https://canvas.example.edu/courses/678"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CourseList {
    #[serde(default)]
    pub courses: Vec<String>,
    /// 强制重新运行链接校验
    #[serde(default)]
    pub force_refresh: bool,
}

impl CourseList {
    pub fn targets(&self) -> Vec<CourseTarget> {
        self.courses
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(CourseTarget::new)
            .collect()
    }
}

/// 解析课程列表
pub fn parse_course_list(content: &str) -> Result<CourseList> {
    toml::from_str(content).context("无法解析课程列表")
}

/// 从 TOML 文件加载课程列表
pub async fn load_course_list(path: &Path) -> Result<CourseList> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", path.display()))?;

    let list = parse_course_list(&content)
        .with_context(|| format!("无法解析TOML文件: {}", path.display()))?;

    tracing::info!("成功加载 {} 门课程", list.courses.len());
    Ok(list)
}
