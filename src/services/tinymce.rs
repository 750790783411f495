//! TinyMCE 编辑器与 Canvas 图片选择器 - 业务能力层
//!
//! 把 `RichTextEditor` 落到真实页面上：
//! - 读写内容通过 `tinyMCE.activeEditor` 脚本
//! - 插入图片通过键盘打开 "Course Images" 面板，搜索并点击第一条匹配结果

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::config::Timeouts;
use crate::error::{DriverError, FixError, FixResult};
use crate::infrastructure::driver::{wait_for, wait_for_within, Key, KeyChord, Locator, Modifiers, Tab};
use crate::infrastructure::retry::{poll, DEFAULT_POLL_INTERVAL};
use crate::selectors;
use crate::services::editor_repair::RichTextEditor;
use crate::services::markup::script_string_literal;

const GET_CONTENT_JS: &str = "tinyMCE.activeEditor.getContent()";

/// 图片选择器交互中的一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerStep {
    Press(KeyChord),
    WaitFor(Locator),
}

/// 打开 "Images" 下拉菜单的按键顺序
///
/// 全屏 → 聚焦工具栏 → 移到 Images → 打开下拉菜单。顺序不能调整。
pub fn picker_open_sequence(command: Modifiers) -> Vec<PickerStep> {
    vec![
        PickerStep::Press(KeyChord::new(command | Modifiers::SHIFT, [Key::Char('f')])),
        PickerStep::WaitFor(Locator::css(selectors::FULLSCREEN)),
        PickerStep::Press(KeyChord::new(Modifiers::ALT, [Key::F10])),
        PickerStep::Press(KeyChord::plain([Key::Tab, Key::Tab, Key::ArrowRight])),
        PickerStep::Press(KeyChord::new(Modifiers::SHIFT, [Key::Enter])),
    ]
}

/// 关闭选择器并退出全屏
pub fn picker_close_sequence() -> Vec<PickerStep> {
    vec![PickerStep::Press(KeyChord::plain([Key::Escape, Key::Escape]))]
}

async fn run_steps<T: Tab>(tab: &T, steps: &[PickerStep], timeout: Duration) -> FixResult<()> {
    for step in steps {
        match step {
            PickerStep::Press(chord) => tab.press(chord).await?,
            PickerStep::WaitFor(locator) => {
                wait_for(tab, locator, timeout).await?;
            }
        }
    }
    Ok(())
}

/// 页面上的正文编辑器：第一个不是测验说明的 TinyMCE iframe
pub async fn locate_body_editor<T: Tab>(tab: &T, timeout: Duration) -> FixResult<T::Element> {
    let iframe = Locator::css(selectors::EDITOR_IFRAME);
    poll(timeout, DEFAULT_POLL_INTERVAL, || {
        let iframe = &iframe;
        async move {
            let candidates = tab.find_all(iframe).await.ok()?;
            for (i, candidate) in candidates.iter().enumerate() {
                let id = tab.attribute(candidate, "id").await.ok().flatten();
                if id.as_deref() != Some(selectors::QUIZ_DESCRIPTION_IFRAME_ID) {
                    debug!("选择编辑器 {}/{}", i + 1, candidates.len());
                    return Some(candidate.clone());
                }
            }
            None
        }
    })
    .await
    .map_err(|_| FixError::ElementTimeout {
        what: selectors::EDITOR_IFRAME.to_string(),
    })
}

/// 某个 TinyMCE 实例
pub struct TinyMceEditor<'a, T: Tab> {
    tab: &'a T,
    iframe: T::Element,
    timeouts: &'a Timeouts,
}

impl<'a, T: Tab> TinyMceEditor<'a, T> {
    pub fn new(tab: &'a T, iframe: T::Element, timeouts: &'a Timeouts) -> Self {
        Self { tab, iframe, timeouts }
    }

    /// 面板打开后：搜索并点击第一张 alt 含 `key` 的图片
    async fn select_asset(&self, key: &str) -> FixResult<()> {
        let tab = self.tab;
        let course_images = wait_for(tab, &Locator::css(selectors::COURSE_IMAGES), self.timeouts.element).await?;
        tab.click(&course_images).await?;

        let search = wait_for(tab, &Locator::css(selectors::PICKER_SEARCH), self.timeouts.element).await?;
        tab.type_into(&search, key).await?;
        sleep(self.timeouts.picker_settle).await;

        let not_found = || FixError::AssetNotFound { key: key.to_string() };
        let results = self.wait_for_results().await.map_err(|_| not_found())?;

        for button in tab.find_within(&results, &Locator::css(selectors::BUTTON)).await? {
            let Some(img) = tab.find_first_within(&button, &Locator::css(selectors::IMG)).await? else {
                continue;
            };
            let alt = tab.attribute(&img, "alt").await?.unwrap_or_default();
            if alt.contains(key) {
                tab.click(&button).await?;
                return Ok(());
            }
        }
        Err(not_found())
    }

    /// 结果容器：内部已经渲染出 `div` 的 span
    async fn wait_for_results(&self) -> FixResult<T::Element> {
        let tab = self.tab;
        let container = Locator::css(selectors::PICKER_RESULTS);
        let child = Locator::css(selectors::PICKER_RESULTS_CHILD);
        poll(self.timeouts.element, DEFAULT_POLL_INTERVAL, || {
            let (container, child) = (&container, &child);
            async move {
                let span = tab.find_first(container).await.ok()??;
                tab.find_first_within(&span, child).await.ok()??;
                Some(span)
            }
        })
        .await
        .map_err(|_| FixError::ElementTimeout {
            what: selectors::PICKER_RESULTS.to_string(),
        })
    }
}

#[async_trait]
impl<'a, T: Tab> RichTextEditor for TinyMceEditor<'a, T> {
    async fn activate(&self) -> FixResult<()> {
        self.tab.click(&self.iframe).await?;
        Ok(())
    }

    async fn read_content(&self) -> FixResult<String> {
        let value = self.tab.eval(GET_CONTENT_JS).await?;
        match value {
            serde_json::Value::String(content) => Ok(content),
            serde_json::Value::Null => Ok(String::new()),
            other => Err(DriverError::Script(format!("getContent 返回了非字符串: {}", other)).into()),
        }
    }

    async fn write_content(&self, markup: &str) -> FixResult<()> {
        let literal = script_string_literal(markup)?;
        self.tab
            .eval(&format!("tinyMCE.activeEditor.setContent({})", literal))
            .await?;
        Ok(())
    }

    async fn insert_asset(&self, key: &str) -> FixResult<()> {
        debug!("打开图片选择器搜索: {}", key);
        let opened = run_steps(
            self.tab,
            &picker_open_sequence(Modifiers::command()),
            self.timeouts.element,
        )
        .await;
        let selected = match opened {
            Ok(()) => self.select_asset(key).await,
            Err(e) => Err(e),
        };

        // 无论成功与否都要退出全屏，否则下一次打开会失败
        let closed = run_steps(self.tab, &picker_close_sequence(), self.timeouts.element).await;
        selected?;
        closed
    }
}

/// 在 `scope` 内等待编辑器 iframe（答案编辑器）
pub async fn locate_editor_within<T: Tab>(
    tab: &T,
    scope: &T::Element,
    timeout: Duration,
) -> FixResult<T::Element> {
    wait_for_within(tab, scope, &Locator::css(selectors::EDITOR_IFRAME), timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_sequence_order() {
        let steps = picker_open_sequence(Modifiers::CTRL);
        assert_eq!(
            steps,
            vec![
                PickerStep::Press(KeyChord::new(Modifiers(10), [Key::Char('f')])),
                PickerStep::WaitFor(Locator::css(".tox-fullscreen")),
                PickerStep::Press(KeyChord::new(Modifiers::ALT, [Key::F10])),
                PickerStep::Press(KeyChord::plain([Key::Tab, Key::Tab, Key::ArrowRight])),
                PickerStep::Press(KeyChord::new(Modifiers::SHIFT, [Key::Enter])),
            ]
        );
    }

    #[test]
    fn test_open_sequence_uses_platform_command() {
        let steps = picker_open_sequence(Modifiers::META);
        let PickerStep::Press(first) = &steps[0] else {
            panic!("第一步必须是按键");
        };
        assert!(first.modifiers.contains(Modifiers::META));
        assert!(first.modifiers.contains(Modifiers::SHIFT));
        assert!(!first.modifiers.contains(Modifiers::CTRL));
    }

    #[test]
    fn test_close_sequence_escapes_twice() {
        assert_eq!(
            picker_close_sequence(),
            vec![PickerStep::Press(KeyChord::plain([Key::Escape, Key::Escape]))]
        );
    }
}
