//! chromiumoxide 驱动 - 基础设施层
//!
//! `CdpTab` 持有一个 Page，只暴露"能力"，不认识课程 / 条目 / 题目；
//! `CdpSession` 持有 Browser 和主标签页，是唯一能开关标签页的地方。

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::error::{DriverError, DriverResult};
use crate::infrastructure::driver::{Key, KeyChord, Locator, Modifiers, Session, Tab};

/// 点击前的命中测试：目标中心点是否真的落在目标自身上
const CLICK_PROBE_JS: &str = r#"
function() {
    const r = this.getBoundingClientRect();
    if (r.width === 0 && r.height === 0) { return 'hidden'; }
    const x = r.left + r.width / 2;
    const y = r.top + r.height / 2;
    if (x < 0 || y < 0 || x > window.innerWidth || y > window.innerHeight) { return 'out_of_bounds'; }
    const hit = document.elementFromPoint(x, y);
    if (hit === null) { return 'out_of_bounds'; }
    return (hit === this || this.contains(hit)) ? 'ok' : 'intercepted';
}
"#;

/// 基于 chromiumoxide Page 的标签页
#[derive(Clone)]
pub struct CdpTab {
    page: Page,
}

impl CdpTab {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn keep_matching(
        elements: Vec<Element>,
        locator: &Locator,
    ) -> DriverResult<Vec<Arc<Element>>> {
        let mut kept = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(text_match) = &locator.text {
                let text = element.inner_text().await?.unwrap_or_default();
                if !text_match.matches(&text) {
                    continue;
                }
            }
            kept.push(Arc::new(element));
        }
        Ok(kept)
    }

    async fn probe_click_target(&self, element: &Element) -> DriverResult<()> {
        let verdict = element
            .call_js_fn(CLICK_PROBE_JS, false)
            .await?
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        match verdict.as_str() {
            "ok" => Ok(()),
            "hidden" => Err(DriverError::NotInteractable("元素尺寸为零".to_string())),
            "out_of_bounds" => Err(DriverError::OutOfBounds("元素中心不在视口内".to_string())),
            "intercepted" => Err(DriverError::ClickIntercepted("元素被其他元素覆盖".to_string())),
            other => Err(DriverError::Script(format!("命中测试返回了意外结果: {}", other))),
        }
    }

    async fn dispatch_key(&self, key: Key, modifiers: Modifiers, down: bool) -> DriverResult<()> {
        let shift = modifiers.contains(Modifiers::SHIFT);
        let kind = if down {
            DispatchKeyEventType::KeyDown
        } else {
            DispatchKeyEventType::KeyUp
        };

        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind)
            .modifiers(modifiers.0)
            .key(key.key_name(shift))
            .code(key.code())
            .windows_virtual_key_code(key.virtual_key_code())
            .native_virtual_key_code(key.virtual_key_code());

        // 只有不带 Ctrl/Alt/Meta 的按下事件才产生字符输入
        let produces_text = down
            && !modifiers.contains(Modifiers::CTRL)
            && !modifiers.contains(Modifiers::ALT)
            && !modifiers.contains(Modifiers::META);
        if produces_text {
            match key {
                Key::Char(_) => builder = builder.text(key.key_name(shift)),
                Key::Enter => builder = builder.text("\r"),
                _ => {}
            }
        }

        let params = builder.build().map_err(DriverError::Cdp)?;
        self.page.execute(params).await?;
        Ok(())
    }
}

#[async_trait]
impl Tab for CdpTab {
    type Element = Arc<Element>;

    async fn goto(&self, url: &str) -> DriverResult<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn title(&self) -> DriverResult<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find_all(&self, locator: &Locator) -> DriverResult<Vec<Self::Element>> {
        let elements = self
            .page
            .find_elements(locator.css.as_str())
            .await
            .map_err(|e| DriverError::NoSuchElement(format!("{}: {}", locator, e)))?;
        Self::keep_matching(elements, locator).await
    }

    async fn find_within(
        &self,
        scope: &Self::Element,
        locator: &Locator,
    ) -> DriverResult<Vec<Self::Element>> {
        let elements = scope
            .find_elements(locator.css.as_str())
            .await
            .map_err(|e| DriverError::NoSuchElement(format!("{}: {}", locator, e)))?;
        Self::keep_matching(elements, locator).await
    }

    async fn attribute(&self, element: &Self::Element, name: &str) -> DriverResult<Option<String>> {
        Ok(element.attribute(name).await?)
    }

    async fn text(&self, element: &Self::Element) -> DriverResult<String> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn click(&self, element: &Self::Element) -> DriverResult<()> {
        element
            .scroll_into_view()
            .await
            .map_err(|e| DriverError::OutOfBounds(e.to_string()))?;
        self.probe_click_target(element).await?;
        element
            .click()
            .await
            .map_err(|e| DriverError::NotInteractable(e.to_string()))?;
        Ok(())
    }

    async fn type_into(&self, element: &Self::Element, text: &str) -> DriverResult<()> {
        element
            .focus()
            .await
            .map_err(|e| DriverError::NotInteractable(e.to_string()))?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Self::Element) -> DriverResult<()> {
        element
            .scroll_into_view()
            .await
            .map_err(|e| DriverError::OutOfBounds(e.to_string()))?;
        Ok(())
    }

    async fn hover(&self, element: &Self::Element) -> DriverResult<()> {
        element
            .hover()
            .await
            .map_err(|e| DriverError::NotInteractable(e.to_string()))?;
        Ok(())
    }

    async fn press(&self, chord: &KeyChord) -> DriverResult<()> {
        debug!("按键: {:?}", chord);
        for key in &chord.keys {
            self.dispatch_key(*key, chord.modifiers, true).await?;
            self.dispatch_key(*key, chord.modifiers, false).await?;
        }
        Ok(())
    }

    async fn eval(&self, script: &str) -> DriverResult<JsonValue> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    async fn eval_on(&self, element: &Self::Element, function_declaration: &str) -> DriverResult<JsonValue> {
        let returns = element
            .call_js_fn(function_declaration, false)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        if let Some(exception) = returns.exception_details {
            return Err(DriverError::Script(exception.text));
        }
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }
}

/// 基于 chromiumoxide Browser 的会话
pub struct CdpSession {
    browser: Browser,
    main: CdpTab,
}

impl CdpSession {
    pub fn new(browser: Browser, main_page: Page) -> Self {
        Self {
            browser,
            main: CdpTab::new(main_page),
        }
    }
}

#[async_trait]
impl Session for CdpSession {
    type Tab = CdpTab;

    fn main_tab(&self) -> &CdpTab {
        &self.main
    }

    async fn open_tab(&self, url: &str) -> DriverResult<CdpTab> {
        debug!("打开新标签页: {}", url);
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(CdpTab::new(page))
    }

    async fn close_tab(&self, tab: CdpTab) -> DriverResult<()> {
        tab.page.close().await?;
        Ok(())
    }

    async fn focus_main(&self) -> DriverResult<()> {
        self.main.page.bring_to_front().await?;
        Ok(())
    }
}
