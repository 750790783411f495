use serde::{Deserialize, Serialize};
use std::fmt;

/// 链接校验结果所指向的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// 题库（链接指向整个题库，而不是单道题）
    AssessmentQuestionPool,
    QuizQuestion,
    Page,
    Assignment,
    Discussion,
    Unrecognized,
}

/// 摘要标记 → 类型，按顺序匹配，先命中者优先
///
/// "Assessment Question" 必须排在 "Quiz Question" 等更短的标记之前。
pub const MARKER_TABLE: &[(&str, ContentKind)] = &[
    ("Assessment Question", ContentKind::AssessmentQuestionPool),
    ("Quiz Question", ContentKind::QuizQuestion),
    ("Page", ContentKind::Page),
    ("Assignment", ContentKind::Assignment),
    ("Discussion", ContentKind::Discussion),
];

impl ContentKind {
    /// 根据校验结果的摘要文本分类
    pub fn classify(summary: &str) -> Self {
        MARKER_TABLE
            .iter()
            .find(|(marker, _)| summary.contains(marker))
            .map(|(_, kind)| *kind)
            .unwrap_or(ContentKind::Unrecognized)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::AssessmentQuestionPool => "assessment_question",
            ContentKind::QuizQuestion => "quiz_question",
            ContentKind::Page => "page",
            ContentKind::Assignment => "assignment",
            ContentKind::Discussion => "discussion",
            ContentKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
