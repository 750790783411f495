//! 悬停后点击 - 业务能力层
//!
//! Canvas 的题目编辑按钮只在鼠标悬停时出现，且页面滚动、动画都会让一次悬停落空，
//! 所以整套"滚动 → 悬停 → 等待 → 定位 → 点击"作为一个单元反复重试。

use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{DriverError, FixError, FixResult};
use crate::infrastructure::driver::{Locator, Tab};
use crate::infrastructure::retry::{retry, RetryError};

/// 悬停参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverSettings {
    pub max_attempts: usize,
    /// 悬停后等待按钮出现
    pub settle: Duration,
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self {
            max_attempts: 500,
            settle: Duration::from_millis(100),
        }
    }
}

/// 悬停在 `target` 上并点击其内部匹配 `click` 的元素
///
/// 只吸收瞬时错误（超出视口、不可交互、找不到元素）；
/// 点击被拦截等其他错误立即返回。
pub async fn hover_and_click<T: Tab>(
    tab: &T,
    target: &T::Element,
    click: &Locator,
    settings: HoverSettings,
) -> FixResult<()> {
    let result = retry(settings.max_attempts, DriverError::is_transient_ui, || async move {
        tab.scroll_into_view(target).await?;
        tab.hover(target).await?;
        sleep(settings.settle).await;
        let button = tab
            .find_first_within(target, click)
            .await?
            .ok_or_else(|| DriverError::NoSuchElement(click.to_string()))?;
        tab.click(&button).await
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(RetryError::AttemptsExhausted { attempts, last }) => {
            warn!(
                "❌ 悬停 {} 次仍无法点击 {}，最后一次错误: {:?}",
                attempts, click, last
            );
            Err(FixError::HoverExhausted { attempts })
        }
        Err(RetryError::Fatal(e)) => Err(e.into()),
    }
}
