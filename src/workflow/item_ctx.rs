//! 条目处理上下文
//!
//! 封装"我正在处理哪门课程的第几个条目"这一信息，只用于日志

use std::fmt::Display;

use crate::models::{ContentKind, ValidationItem};

/// 条目处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 课程（ID 或 URL）
    pub course: String,

    /// 条目在报告中的序号（从1开始）
    pub item_index: usize,

    /// 条目总数
    pub total: usize,

    pub kind: ContentKind,
}

impl ItemCtx {
    pub fn new(course: impl Into<String>, item_index: usize, total: usize, item: &ValidationItem) -> Self {
        Self {
            course: course.into(),
            item_index,
            total,
            kind: item.kind(),
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[课程 {} 条目 {}/{} {}]",
            self.course, self.item_index, self.total, self.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let item = ValidationItem::new("Syllabus", "Page", "/courses/9/pages/syllabus");
        let ctx = ItemCtx::new("9", 2, 5, &item);
        assert_eq!(ctx.to_string(), "[课程 9 条目 2/5 page]");
    }
}
