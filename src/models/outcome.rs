//! 处理结果

use crate::error::{AbortCode, FixError, FixResult};

use super::validation::ValidationItem;

/// 单个条目（或单道题）的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Fixed,
    /// 同一 URL 已在本次运行中处理过
    SkippedDuplicate,
    Failed(FixError),
}

impl FixOutcome {
    pub fn is_fixed(&self) -> bool {
        matches!(self, FixOutcome::Fixed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FixOutcome::Failed(_))
    }
}

impl From<FixResult<()>> for FixOutcome {
    fn from(result: FixResult<()>) -> Self {
        match result {
            Ok(()) => FixOutcome::Fixed,
            Err(e) => FixOutcome::Failed(e),
        }
    }
}

/// 一条校验结果及其处理结果
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub item: ValidationItem,
    pub outcome: FixOutcome,
}

/// 一门课程的运行汇总
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub course: String,
    /// 实际处理（非重复）的条目数
    pub attempted: usize,
    pub failed: usize,
    pub skipped_duplicate: usize,
    pub items: Vec<ItemRecord>,
    /// 课程级中止原因
    pub aborted: Option<AbortCode>,
}

impl RunSummary {
    pub fn new(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, item: ValidationItem, outcome: FixOutcome) {
        match &outcome {
            FixOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            FixOutcome::Failed(_) => {
                self.attempted += 1;
                self.failed += 1;
            }
            FixOutcome::Fixed => self.attempted += 1,
        }
        self.items.push(ItemRecord { item, outcome });
    }

    /// 只记录第一个中止原因
    pub fn abort(&mut self, code: AbortCode) {
        self.aborted.get_or_insert(code);
    }

    pub fn fixed(&self) -> usize {
        self.attempted - self.failed
    }

    /// 成功率；没有处理任何条目时为 `None`
    pub fn success_ratio(&self) -> Option<f64> {
        (self.attempted > 0).then(|| self.fixed() as f64 / self.attempted as f64)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}
