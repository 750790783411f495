//! 浏览器驱动抽象 - 基础设施层
//!
//! 上层只依赖这里定义的能力（导航、定位、点击、按键、执行脚本、开关标签页），
//! 生产环境由 `CdpSession` / `CdpTab`（chromiumoxide）实现，测试中换成内存假实现。

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::fmt;
use std::ops::BitOr;
use std::time::Duration;

use crate::error::{DriverResult, FixError, FixResult};
use crate::infrastructure::retry::{poll, DEFAULT_POLL_INTERVAL};

/// 元素定位器：CSS 选择器 + 可选的文本过滤
///
/// 文本过滤比较的是元素的 innerText，用于按链接文字定位。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub css: String,
    pub text: Option<TextMatch>,
}

/// 文本匹配方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextMatch {
    /// 去除首尾空白后完全相等
    Exact(String),
    /// 包含子串
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => text.trim() == expected,
            TextMatch::Contains(needle) => text.contains(needle.as_str()),
        }
    }
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            css: selector.into(),
            text: None,
        }
    }

    /// 链接文字完全相等
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::text_in("a", TextMatch::Exact(text.into()))
    }

    /// 链接文字包含 `text`
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::text_in("a", TextMatch::Contains(text.into()))
    }

    pub fn text_in(css: impl Into<String>, text: TextMatch) -> Self {
        Self {
            css: css.into(),
            text: Some(text),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            None => write!(f, "{}", self.css),
            Some(TextMatch::Exact(t)) => write!(f, "{}[text='{}']", self.css, t),
            Some(TextMatch::Contains(t)) => write!(f, "{}[text*='{}']", self.css, t),
        }
    }
}

/// 修饰键位掩码（取值与 CDP Input.dispatchKeyEvent 的 modifiers 一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub i64);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const META: Modifiers = Modifiers(4);
    pub const SHIFT: Modifiers = Modifiers(8);

    /// 平台的"命令"键：macOS 上是 Meta，其余平台是 Ctrl
    pub fn command() -> Self {
        if cfg!(target_os = "macos") {
            Modifiers::META
        } else {
            Modifiers::CTRL
        }
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// 按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Escape,
    ArrowRight,
    F10,
}

impl Key {
    /// DOM `KeyboardEvent.key`
    pub fn key_name(self, shift: bool) -> String {
        match self {
            Key::Char(c) if shift => c.to_ascii_uppercase().to_string(),
            Key::Char(c) => c.to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Escape => "Escape".to_string(),
            Key::ArrowRight => "ArrowRight".to_string(),
            Key::F10 => "F10".to_string(),
        }
    }

    /// DOM `KeyboardEvent.code`
    pub fn code(self) -> String {
        match self {
            Key::Char(c) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
            Key::Char(c) if c.is_ascii_digit() => format!("Digit{}", c),
            Key::Char(c) => c.to_string(),
            other => other.key_name(false),
        }
    }

    /// Windows 虚拟键码
    pub fn virtual_key_code(self) -> i64 {
        match self {
            Key::Char(c) => i64::from(u32::from(c.to_ascii_uppercase())),
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Escape => 27,
            Key::ArrowRight => 39,
            Key::F10 => 121,
        }
    }
}

/// 组合键：按住 `modifiers` 依次按下 `keys`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub keys: Vec<Key>,
}

impl KeyChord {
    pub fn new(modifiers: Modifiers, keys: impl Into<Vec<Key>>) -> Self {
        Self {
            modifiers,
            keys: keys.into(),
        }
    }

    /// 无修饰键的按键序列
    pub fn plain(keys: impl Into<Vec<Key>>) -> Self {
        Self::new(Modifiers::NONE, keys)
    }
}

/// 单个浏览上下文（标签页）的能力
#[async_trait]
pub trait Tab: Send + Sync {
    /// 元素句柄
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> DriverResult<()>;
    async fn title(&self) -> DriverResult<String>;
    async fn current_url(&self) -> DriverResult<String>;

    /// 在整个页面中定位
    async fn find_all(&self, locator: &Locator) -> DriverResult<Vec<Self::Element>>;
    /// 在某个元素内部定位
    async fn find_within(
        &self,
        scope: &Self::Element,
        locator: &Locator,
    ) -> DriverResult<Vec<Self::Element>>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> DriverResult<Option<String>>;
    async fn text(&self, element: &Self::Element) -> DriverResult<String>;

    async fn click(&self, element: &Self::Element) -> DriverResult<()>;
    async fn type_into(&self, element: &Self::Element, text: &str) -> DriverResult<()>;
    async fn scroll_into_view(&self, element: &Self::Element) -> DriverResult<()>;
    async fn hover(&self, element: &Self::Element) -> DriverResult<()>;

    /// 向当前焦点发送组合键
    async fn press(&self, chord: &KeyChord) -> DriverResult<()>;

    /// 在页面上下文执行脚本并返回结果（`undefined` 映射为 `null`）
    async fn eval(&self, script: &str) -> DriverResult<JsonValue>;
    /// 以元素为 `this` 调用一个 JS 函数声明
    async fn eval_on(&self, element: &Self::Element, function_declaration: &str) -> DriverResult<JsonValue>;

    /// 页面中第一个匹配的元素
    async fn find_first(&self, locator: &Locator) -> DriverResult<Option<Self::Element>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    /// 元素内第一个匹配的元素
    async fn find_first_within(
        &self,
        scope: &Self::Element,
        locator: &Locator,
    ) -> DriverResult<Option<Self::Element>> {
        Ok(self.find_within(scope, locator).await?.into_iter().next())
    }
}

/// 浏览器会话：持有主标签页，负责打开/关闭隔离的标签页
#[async_trait]
pub trait Session: Send + Sync {
    type Tab: Tab;

    /// 主（报告）标签页
    fn main_tab(&self) -> &Self::Tab;

    /// 打开一个新的标签页并导航到 `url`，直接返回它的句柄
    async fn open_tab(&self, url: &str) -> DriverResult<Self::Tab>;

    async fn close_tab(&self, tab: Self::Tab) -> DriverResult<()>;

    /// 把焦点交还给主标签页
    async fn focus_main(&self) -> DriverResult<()>;
}

/// 等待页面中出现至少一个匹配元素，返回全部匹配
///
/// 等待期间的驱动错误被当作"尚未出现"。
pub async fn wait_for_all<T: Tab + ?Sized>(
    tab: &T,
    locator: &Locator,
    timeout: Duration,
) -> FixResult<Vec<T::Element>> {
    poll(timeout, DEFAULT_POLL_INTERVAL, || async move {
        match tab.find_all(locator).await {
            Ok(found) if !found.is_empty() => Some(found),
            _ => None,
        }
    })
    .await
    .map_err(|_| FixError::ElementTimeout {
        what: locator.to_string(),
    })
}

/// 等待页面中出现第一个匹配元素
pub async fn wait_for<T: Tab + ?Sized>(
    tab: &T,
    locator: &Locator,
    timeout: Duration,
) -> FixResult<T::Element> {
    let mut found = wait_for_all(tab, locator, timeout).await?;
    Ok(found.swap_remove(0))
}

/// 等待某个元素内部出现第一个匹配元素
pub async fn wait_for_within<T: Tab + ?Sized>(
    tab: &T,
    scope: &T::Element,
    locator: &Locator,
    timeout: Duration,
) -> FixResult<T::Element> {
    poll(timeout, DEFAULT_POLL_INTERVAL, || async move {
        tab.find_first_within(scope, locator).await.ok().flatten()
    })
    .await
    .map_err(|_| FixError::ElementTimeout {
        what: locator.to_string(),
    })
}
