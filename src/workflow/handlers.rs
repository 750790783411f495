//! 单编辑器条目处理流程 - 流程层
//!
//! 页面、作业、讨论的流程相同：点击编辑 → 修复正文编辑器 → 提交。

use tracing::info;

use crate::error::FixResult;
use crate::infrastructure::driver::{wait_for, Locator, Tab};
use crate::models::ContentKind;
use crate::selectors;
use crate::services::editor_repair::repair_editor;
use crate::services::tinymce::TinyMceEditor;
use crate::workflow::settings::FixSettings;

/// 单编辑器类型的编辑入口
pub fn edit_control(kind: ContentKind) -> Option<&'static str> {
    match kind {
        ContentKind::Page => Some(selectors::EDIT_PAGE),
        ContentKind::Assignment => Some(selectors::EDIT_ASSIGNMENT),
        ContentKind::Discussion => Some(selectors::EDIT_DISCUSSION),
        _ => None,
    }
}

/// 修复只有一个正文编辑器的条目
///
/// 即使部分图片找不到也会提交已修复的部分，然后返回 `AssetNotFound`。
pub async fn fix_single_editor<T: Tab>(
    tab: &T,
    edit_selector: &str,
    settings: &FixSettings,
) -> FixResult<()> {
    let timeouts = &settings.timeouts;

    let edit = wait_for(tab, &Locator::css(edit_selector), timeouts.element).await?;
    tab.click(&edit).await?;

    let iframe = wait_for(tab, &Locator::css(selectors::EDITOR_IFRAME), timeouts.element).await?;
    let report = repair_editor(&TinyMceEditor::new(tab, iframe, timeouts), &settings.marker).await?;

    let submit = wait_for(tab, &Locator::css(selectors::SUBMIT_ITEM), timeouts.element).await?;
    tab.click(&submit).await?;
    info!("💾 已提交: 替换 {}/{} 张图片", report.replaced, report.flagged);

    report.into_result().map(|_| ())
}
