//! 题库 / 测验题处理流程 - 流程层
//!
//! 流程顺序（每道题）：
//! 1. 悬停题目，点击编辑按钮
//! 2. 修复题干编辑器
//! 3. 修复含失效图片的答案（失败只记录，继续下一个答案）
//! 4. 提交并检查错误提示
//!
//! 一道题失败不影响后续题目。

use std::future::Future;
use tracing::{info, warn};

use crate::error::{DriverError, FixError, FixResult};
use crate::infrastructure::driver::{wait_for, wait_for_all, wait_for_within, Locator, Tab, TextMatch};
use crate::infrastructure::retry::{poll, DEFAULT_POLL_INTERVAL};
use crate::models::FixOutcome;
use crate::selectors;
use crate::services::editor_repair::repair_editor;
use crate::services::hover::hover_and_click;
use crate::services::tinymce::{locate_body_editor, locate_editor_within, TinyMceEditor};
use crate::workflow::settings::FixSettings;

const IS_VISIBLE_JS: &str = "function() { return this.getClientRects().length > 0; }";
const FORCE_HOVER_CLASS_JS: &str = "function() { this.setAttribute('class', 'answer hover'); }";
const SCROLL_TOP_JS: &str = "window.scrollTo(0, 0)";

/// 依次处理 `start_index..total` 的每道题，返回 (序号, 结果)
///
/// 单道题的失败被记录下来，循环总是走完。
pub async fn run_question_loop<F, Fut>(
    total: usize,
    start_index: usize,
    mut fix_one: F,
) -> Vec<(usize, FixOutcome)>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = FixResult<()>>,
{
    let mut outcomes = Vec::with_capacity(total.saturating_sub(start_index));
    for index in start_index..total {
        info!("🔧 修复第 {}/{} 题", index + 1, total);
        let outcome = FixOutcome::from(fix_one(index).await);
        if let FixOutcome::Failed(e) = &outcome {
            warn!("❌ 第 {} 题失败: {}", index + 1, e);
        }
        outcomes.push((index, outcome));
    }
    outcomes
}

/// 题库条目：全部题目修复成功才算成功，否则返回第一道失败题的原因
pub async fn fix_question_pool<T: Tab>(tab: &T, settings: &FixSettings) -> FixResult<()> {
    let questions = visible_questions(tab, settings).await?;
    info!("📋 共 {} 道题", questions.len());
    tab.eval(SCROLL_TOP_JS).await?;

    let questions = &questions;
    let outcomes = run_question_loop(questions.len(), settings.start_index, move |i| {
        fix_single_question(tab, &questions[i], settings)
    })
    .await;

    let fixed = outcomes.iter().filter(|(_, o)| o.is_fixed()).count();
    info!("✓ 题目修复完成: 成功 {}/{}", fixed, outcomes.len());

    match outcomes.into_iter().find_map(|(_, o)| match o {
        FixOutcome::Failed(e) => Some(e),
        _ => None,
    }) {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// 测验题：先进入测验编辑页的 "Questions" 标签，再按题库处理
pub async fn fix_quiz<T: Tab>(tab: &T, settings: &FixSettings) -> FixResult<()> {
    let edit = wait_for(tab, &Locator::css(selectors::EDIT_ASSIGNMENT), settings.timeouts.element).await?;
    tab.click(&edit).await?;
    let questions_tab = wait_for(
        tab,
        &Locator::link_text(selectors::QUESTIONS_TAB_TEXT),
        settings.timeouts.element,
    )
    .await?;
    tab.click(&questions_tab).await?;
    fix_question_pool(tab, settings).await
}

/// 没有被隐藏（`display: none`）的题目
async fn visible_questions<T: Tab>(tab: &T, settings: &FixSettings) -> FixResult<Vec<T::Element>> {
    let holders = wait_for_all(tab, &Locator::css(selectors::QUESTION_HOLDER), settings.timeouts.element).await?;
    let mut visible = Vec::with_capacity(holders.len());
    for holder in holders {
        let style = tab.attribute(&holder, "style").await?.unwrap_or_default();
        if !style.contains("display: none") {
            visible.push(holder);
        }
    }
    Ok(visible)
}

/// 修复一道题
pub async fn fix_single_question<T: Tab>(
    tab: &T,
    question: &T::Element,
    settings: &FixSettings,
) -> FixResult<()> {
    let timeouts = &settings.timeouts;
    hover_and_click(tab, question, &Locator::css(selectors::EDIT_QUESTION), settings.hover).await?;

    let body = locate_body_editor(tab, timeouts.editor).await?;
    let report = repair_editor(&TinyMceEditor::new(tab, body, timeouts), &settings.marker).await?;
    let mut failures: Vec<FixError> = report.first_failure().into_iter().collect();

    for answer in tab.find_all(&Locator::css(selectors::ANSWER)).await? {
        if !has_broken_image(tab, &answer, &settings.marker).await? {
            continue;
        }
        if let Err(e) = fix_answer(tab, &answer, settings).await {
            warn!("❌ 答案修复失败: {}", e);
            failures.push(e);
        }
    }

    let submit = wait_for(tab, &Locator::css(selectors::SUBMIT_QUESTION), timeouts.element).await?;
    tab.click(&submit).await?;
    check_saved(tab, settings).await?;

    match failures.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn has_broken_image<T: Tab>(tab: &T, answer: &T::Element, marker: &str) -> FixResult<bool> {
    for img in tab.find_within(answer, &Locator::css(selectors::IMG)).await? {
        let src = tab.attribute(&img, "src").await?.unwrap_or_default();
        if src.contains(marker) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// 修复一个答案，必要时重新标记为正确答案
async fn fix_answer<T: Tab>(tab: &T, answer: &T::Element, settings: &FixSettings) -> FixResult<()> {
    let timeouts = &settings.timeouts;
    let class = tab.attribute(answer, "class").await?.unwrap_or_default();
    let mark_correct = class
        .split_whitespace()
        .any(|c| c == selectors::CORRECT_ANSWER_CLASS);

    wait_visible(tab, answer, settings).await?;
    // 强制显示答案的编辑按钮（会覆盖 correct_answer 类）
    tab.eval_on(answer, FORCE_HOVER_CLASS_JS).await?;

    let iframe = match open_answer_editor(tab, answer, settings).await {
        Err(FixError::Driver(DriverError::ClickIntercepted(_))) => {
            dismiss_regrade_dialog(tab, settings).await?;
            open_answer_editor(tab, answer, settings).await?
        }
        other => other?,
    };

    let report = repair_editor(&TinyMceEditor::new(tab, iframe, timeouts), &settings.marker).await?;

    if mark_correct {
        let select = tab
            .find_first_within(answer, &Locator::css(selectors::SELECT_ANSWER))
            .await?
            .ok_or_else(|| DriverError::NoSuchElement(selectors::SELECT_ANSWER.to_string()))?;
        tab.click(&select).await?;
    }

    report.into_result().map(|_| ())
}

async fn wait_visible<T: Tab>(tab: &T, element: &T::Element, settings: &FixSettings) -> FixResult<()> {
    poll(settings.timeouts.answer, DEFAULT_POLL_INTERVAL, || async move {
        match tab.eval_on(element, IS_VISIBLE_JS).await {
            Ok(serde_json::Value::Bool(true)) => Some(()),
            _ => None,
        }
    })
    .await
    .map_err(|_| FixError::ElementTimeout {
        what: selectors::ANSWER.to_string(),
    })
}

async fn open_answer_editor<T: Tab>(
    tab: &T,
    answer: &T::Element,
    settings: &FixSettings,
) -> FixResult<T::Element> {
    let edit = wait_for_within(
        tab,
        answer,
        &Locator::css(selectors::ANSWER_EDIT_HTML),
        settings.timeouts.answer,
    )
    .await?;
    tab.click(&edit).await?;
    locate_editor_within(tab, answer, settings.timeouts.editor).await
}

/// 已有学生作答的测验会弹出重新评分对话框，选择"不重新评分"后关闭
///
/// 只是重新点选原来的正确答案，不改变评分。
async fn dismiss_regrade_dialog<T: Tab>(tab: &T, settings: &FixSettings) -> FixResult<()> {
    warn!("⚠️ 点击被遮挡，尝试关闭重新评分对话框");
    let timeout = settings.timeouts.answer;
    let dialog = wait_for(tab, &Locator::css(selectors::REGRADE_DIALOG), timeout).await?;

    let option = wait_for_within(
        tab,
        &dialog,
        &Locator::text_in("label", TextMatch::Contains(selectors::REGRADE_OPTION_TEXT.to_string())),
        timeout,
    )
    .await?;
    tab.click(&option).await?;

    let confirm = wait_for_within(
        tab,
        &dialog,
        &Locator::text_in(selectors::BUTTON, TextMatch::Exact(selectors::REGRADE_CONFIRM_TEXT.to_string())),
        timeout,
    )
    .await?;
    tab.click(&confirm).await?;
    Ok(())
}

/// 提交后短时间内出现 `.errorBox` 视为保存失败（不重试）
async fn check_saved<T: Tab>(tab: &T, settings: &FixSettings) -> FixResult<()> {
    match wait_for(tab, &Locator::css(selectors::ERROR_BOX), settings.timeouts.save_check).await {
        Ok(_) => {
            warn!("⚠️ 检测到错误提示，修改可能未保存");
            Err(FixError::SaveValidationFailure)
        }
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_loop_continues_after_failure() {
        let outcomes = run_question_loop(3, 0, |i| async move {
            if i == 1 {
                Err(FixError::AssetNotFound { key: "xid-2".into() })
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(
            outcomes,
            vec![
                (0, FixOutcome::Fixed),
                (1, FixOutcome::Failed(FixError::AssetNotFound { key: "xid-2".into() })),
                (2, FixOutcome::Fixed),
            ]
        );
    }

    #[tokio::test]
    async fn test_loop_honours_start_index() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let outcomes = run_question_loop(5, 3, |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcomes.first().map(|(i, _)| *i), Some(3));
    }

    #[tokio::test]
    async fn test_loop_with_start_past_end_does_nothing() {
        let outcomes = run_question_loop(2, 4, |_| async move { Ok(()) }).await;
        assert!(outcomes.is_empty());
    }
}
