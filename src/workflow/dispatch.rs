//! 按内容类型分派处理流程

use crate::error::{FixError, FixResult};
use crate::infrastructure::driver::Tab;
use crate::models::ContentKind;
use crate::workflow::handlers::{edit_control, fix_single_editor};
use crate::workflow::question_pool::{fix_question_pool, fix_quiz};
use crate::workflow::settings::FixSettings;

/// 该类型是否需要打开标签页处理
pub fn is_actionable(kind: ContentKind) -> bool {
    kind != ContentKind::Unrecognized
}

/// 在已经打开条目 URL 的标签页上运行对应的处理流程
pub async fn dispatch<T: Tab>(tab: &T, kind: ContentKind, settings: &FixSettings) -> FixResult<()> {
    match kind {
        ContentKind::AssessmentQuestionPool => fix_question_pool(tab, settings).await,
        ContentKind::QuizQuestion => fix_quiz(tab, settings).await,
        ContentKind::Page | ContentKind::Assignment | ContentKind::Discussion => {
            let selector = edit_control(kind).ok_or(FixError::UnrecognizedContentKind)?;
            fix_single_editor(tab, selector, settings).await
        }
        ContentKind::Unrecognized => Err(FixError::UnrecognizedContentKind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unrecognized_is_skipped() {
        assert!(!is_actionable(ContentKind::Unrecognized));
        assert!(is_actionable(ContentKind::Page));
        assert!(is_actionable(ContentKind::AssessmentQuestionPool));
    }
}
