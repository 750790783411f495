//! 内存中的假浏览器
//!
//! 页面是一组扁平的节点：每个节点有一个选择器字符串、父节点、文本和属性。
//! `find_all` 按选择器字符串完全相等匹配，再按 `Locator` 的文本条件过滤，
//! 所以测试里构造节点时直接使用 `xid_fixer::selectors` 中的常量。

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use xid_fixer::config::{Config, Timeouts};
use xid_fixer::error::{DriverError, DriverResult};
use xid_fixer::infrastructure::{KeyChord, Locator, Session, Tab};
use xid_fixer::models::Credentials;

pub type NodeId = usize;
pub type Hook = Arc<dyn Fn(&mut PageState) + Send + Sync>;

const GET_CONTENT: &str = "tinyMCE.activeEditor.getContent()";
const SET_CONTENT_PREFIX: &str = "tinyMCE.activeEditor.setContent(";

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub css: String,
    pub parent: Option<NodeId>,
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub removed: bool,
    /// 点击时返回 ClickIntercepted 的剩余次数
    pub intercept_clicks: usize,
}

#[derive(Default)]
pub struct PageState {
    pub title: String,
    pub url: String,
    pub nodes: Vec<Node>,
    pub editor_content: String,
    pub clicks: Vec<NodeId>,
    pub typed: Vec<(NodeId, String)>,
    pub keys: Vec<KeyChord>,
    pub content_writes: Vec<String>,
    /// hover 返回 OutOfBounds 的剩余次数
    pub hover_failures: usize,
    pub hovers: usize,
    /// goto 到这些 URL 时切换页面标题
    pub titles_by_url: HashMap<String, String>,
    on_click: HashMap<NodeId, Hook>,
}

impl PageState {
    pub fn add(&mut self, css: &str, parent: Option<NodeId>, text: &str) -> NodeId {
        self.nodes.push(Node {
            css: css.to_string(),
            parent,
            text: text.to_string(),
            ..Node::default()
        });
        self.nodes.len() - 1
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id].attrs.insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, id: NodeId) {
        self.nodes[id].removed = true;
    }

    fn is_within(&self, mut id: NodeId, scope: NodeId) -> bool {
        while let Some(parent) = self.nodes[id].parent {
            if parent == scope {
                return true;
            }
            id = parent;
        }
        false
    }

    fn matches(&self, id: NodeId, locator: &Locator) -> bool {
        let node = &self.nodes[id];
        !node.removed
            && node.css == locator.css
            && locator.text.as_ref().map_or(true, |t| t.matches(&node.text))
    }

    fn live(&self, id: NodeId) -> DriverResult<&Node> {
        match self.nodes.get(id) {
            Some(node) if !node.removed => Ok(node),
            _ => Err(DriverError::NoSuchElement(format!("node {}", id))),
        }
    }
}

/// 假标签页；clone 后共享同一个页面状态
#[derive(Clone, Default)]
pub struct FakeTab {
    state: Arc<Mutex<PageState>>,
}

impl FakeTab {
    pub fn new(title: &str) -> Self {
        let tab = Self::default();
        tab.with(|p| p.title = title.to_string());
        tab
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add(&self, css: &str, parent: Option<NodeId>, text: &str) -> NodeId {
        self.with(|p| p.add(css, parent, text))
    }

    pub fn add_with_attr(&self, css: &str, parent: Option<NodeId>, text: &str, attr: (&str, &str)) -> NodeId {
        self.with(|p| {
            let id = p.add(css, parent, text);
            p.set_attr(id, attr.0, attr.1);
            id
        })
    }

    pub fn on_click(&self, id: NodeId, hook: impl Fn(&mut PageState) + Send + Sync + 'static) {
        self.with(|p| {
            p.on_click.insert(id, Arc::new(hook));
        });
    }

    pub fn clicked(&self, id: NodeId) -> bool {
        self.with(|p| p.clicks.contains(&id))
    }

    pub fn content(&self) -> String {
        self.with(|p| p.editor_content.clone())
    }
}

fn decode_set_content(script: &str) -> Option<String> {
    let literal = script.strip_prefix(SET_CONTENT_PREFIX)?.strip_suffix(')')?;
    serde_json::from_str(&literal.replace("\\'", "'")).ok()
}

#[async_trait]
impl Tab for FakeTab {
    type Element = NodeId;

    async fn goto(&self, url: &str) -> DriverResult<()> {
        self.with(|p| {
            p.url = url.to_string();
            if let Some(title) = p.titles_by_url.get(url).cloned() {
                p.title = title;
            }
        });
        Ok(())
    }

    async fn title(&self) -> DriverResult<String> {
        Ok(self.with(|p| p.title.clone()))
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.with(|p| p.url.clone()))
    }

    async fn find_all(&self, locator: &Locator) -> DriverResult<Vec<NodeId>> {
        Ok(self.with(|p| (0..p.nodes.len()).filter(|&id| p.matches(id, locator)).collect()))
    }

    async fn find_within(&self, scope: &NodeId, locator: &Locator) -> DriverResult<Vec<NodeId>> {
        let scope = *scope;
        self.with(|p| {
            p.live(scope)?;
            Ok((0..p.nodes.len())
                .filter(|&id| p.is_within(id, scope) && p.matches(id, locator))
                .collect())
        })
    }

    async fn attribute(&self, element: &NodeId, name: &str) -> DriverResult<Option<String>> {
        self.with(|p| Ok(p.live(*element)?.attrs.get(name).cloned()))
    }

    async fn text(&self, element: &NodeId) -> DriverResult<String> {
        self.with(|p| Ok(p.live(*element)?.text.clone()))
    }

    async fn click(&self, element: &NodeId) -> DriverResult<()> {
        let id = *element;
        let hook = self.with(|p| {
            p.live(id)?;
            if p.nodes[id].intercept_clicks > 0 {
                p.nodes[id].intercept_clicks -= 1;
                return Err(DriverError::ClickIntercepted(format!("node {}", id)));
            }
            p.clicks.push(id);
            Ok(p.on_click.get(&id).cloned())
        })?;
        if let Some(hook) = hook {
            self.with(|p| hook(p));
        }
        Ok(())
    }

    async fn type_into(&self, element: &NodeId, text: &str) -> DriverResult<()> {
        self.with(|p| {
            p.live(*element)?;
            p.typed.push((*element, text.to_string()));
            Ok(())
        })
    }

    async fn scroll_into_view(&self, element: &NodeId) -> DriverResult<()> {
        self.with(|p| p.live(*element).map(|_| ()))
    }

    async fn hover(&self, element: &NodeId) -> DriverResult<()> {
        self.with(|p| {
            p.live(*element)?;
            p.hovers += 1;
            if p.hover_failures > 0 {
                p.hover_failures -= 1;
                return Err(DriverError::OutOfBounds("moving".into()));
            }
            Ok(())
        })
    }

    async fn press(&self, chord: &KeyChord) -> DriverResult<()> {
        self.with(|p| p.keys.push(chord.clone()));
        Ok(())
    }

    async fn eval(&self, script: &str) -> DriverResult<JsonValue> {
        self.with(|p| {
            if script == GET_CONTENT {
                return Ok(JsonValue::String(p.editor_content.clone()));
            }
            if script.starts_with(SET_CONTENT_PREFIX) {
                let content = decode_set_content(script)
                    .ok_or_else(|| DriverError::Script(format!("bad literal: {}", script)))?;
                p.content_writes.push(content.clone());
                p.editor_content = content;
            }
            Ok(JsonValue::Null)
        })
    }

    async fn eval_on(&self, element: &NodeId, function_declaration: &str) -> DriverResult<JsonValue> {
        self.with(|p| {
            let node = p.live(*element)?;
            if function_declaration.contains("this.href") {
                return Ok(node.attrs.get("href").cloned().map(JsonValue::String).unwrap_or(JsonValue::Null));
            }
            if function_declaration.contains("getClientRects") {
                return Ok(JsonValue::Bool(true));
            }
            if function_declaration.contains("setAttribute('class', 'answer hover')") {
                p.set_attr(*element, "class", "answer hover");
            }
            Ok(JsonValue::Null)
        })
    }
}

/// 假会话：主标签页 + 按 URL 构造的新标签页
pub struct FakeSession {
    pub main: FakeTab,
    pub opened: Mutex<Vec<String>>,
    pub closed: Mutex<usize>,
    pub focused: Mutex<usize>,
    factory: Box<dyn Fn(&str) -> FakeTab + Send + Sync>,
}

impl FakeSession {
    pub fn new(main: FakeTab) -> Self {
        Self::with_factory(main, |_| FakeTab::new("blank"))
    }

    pub fn with_factory(main: FakeTab, factory: impl Fn(&str) -> FakeTab + Send + Sync + 'static) -> Self {
        Self {
            main,
            opened: Mutex::new(Vec::new()),
            closed: Mutex::new(0),
            focused: Mutex::new(0),
            factory: Box::new(factory),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        *self.closed.lock().unwrap()
    }

    pub fn focused(&self) -> usize {
        *self.focused.lock().unwrap()
    }
}

#[async_trait]
impl Session for FakeSession {
    type Tab = FakeTab;

    fn main_tab(&self) -> &FakeTab {
        &self.main
    }

    async fn open_tab(&self, url: &str) -> DriverResult<FakeTab> {
        self.opened.lock().unwrap().push(url.to_string());
        let tab = (self.factory)(url);
        tab.with(|p| p.url = url.to_string());
        Ok(tab)
    }

    async fn close_tab(&self, _tab: FakeTab) -> DriverResult<()> {
        *self.closed.lock().unwrap() += 1;
        Ok(())
    }

    async fn focus_main(&self) -> DriverResult<()> {
        *self.focused.lock().unwrap() += 1;
        Ok(())
    }
}

/// 所有等待都很短的配置
pub fn fast_config() -> Config {
    Config {
        base_url: "https://canvas.test".to_string(),
        credentials: Credentials::new("jdoe", "secret"),
        hover_max_attempts: 5,
        timeouts: Timeouts::uniform(Duration::from_millis(30)),
        ..Config::default()
    }
}
