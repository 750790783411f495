//! 编辑器内容解析
//!
//! 把 TinyMCE 的 HTML 片段切分成"普通标记"和"图片"两类片段。
//! `<img>` 是空元素，没有子节点，所以替换一张图片只需要替换一个片段，
//! 其余标记按原样保留，序列化后逐字节不变。

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// HTML 注释（未闭合的注释一直延伸到末尾）或完整的 `<img ...>` 标签
///
/// 注释先于图片匹配，注释里的 `<img>` 不会被当作图片。
static COMMENT_OR_IMG: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r#"(?is)<!--.*?(?:-->|\z)|<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid img tag regex: {err}"),
    }
});

/// `src` 属性（双引号 / 单引号 / 无引号）
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r#"(?is)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid src attribute regex: {err}"),
    }
});

/// 内容片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 图片以外的任意标记，原样保存
    Markup(String),
    /// 一个 `<img>` 标签
    Image(ImageNode),
}

/// 图片节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    /// 原始标签文本
    pub raw: String,
    /// `src` 属性值；缺失时为 `None`
    pub src: Option<String>,
}

/// 一处待修复的图片引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenImageReference {
    /// 原始 `src`
    pub src: String,
    /// 在片段列表中的位置
    pub position: usize,
    /// 搜索关键字（路径最后一段）
    pub search_key: String,
}

impl BrokenImageReference {
    fn new(src: &str, position: usize) -> Self {
        Self {
            src: src.to_string(),
            position,
            search_key: search_key(src),
        }
    }
}

/// 解析后的编辑器内容
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorMarkup {
    segments: Vec<Segment>,
}

impl EditorMarkup {
    /// 解析 HTML 片段
    pub fn parse(markup: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for tag in COMMENT_OR_IMG.find_iter(markup) {
            // 注释留在普通标记里
            if tag.as_str().starts_with("<!--") {
                continue;
            }
            if tag.start() > cursor {
                segments.push(Segment::Markup(markup[cursor..tag.start()].to_string()));
            }

            let src = SRC_ATTR.captures(tag.as_str()).and_then(|cap| {
                cap.get(1)
                    .or_else(|| cap.get(2))
                    .or_else(|| cap.get(3))
                    .map(|m| m.as_str().to_string())
            });

            segments.push(Segment::Image(ImageNode {
                raw: tag.as_str().to_string(),
                src,
            }));
            cursor = tag.end();
        }

        if cursor < markup.len() {
            segments.push(Segment::Markup(markup[cursor..].to_string()));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// 所有 `src` 中包含 `marker` 的图片，按文档顺序
    ///
    /// 没有 `src` 的图片记录一条警告后跳过。
    pub fn broken_images(&self, marker: &str) -> Vec<BrokenImageReference> {
        let mut broken = Vec::new();
        for (position, segment) in self.segments.iter().enumerate() {
            let Segment::Image(image) = segment else {
                continue;
            };
            match &image.src {
                Some(src) if src.contains(marker) => {
                    broken.push(BrokenImageReference::new(src, position));
                }
                Some(_) => {}
                None => warn!("⚠️ 发现没有 src 的图片，已跳过: {}", image.raw),
            }
        }
        broken
    }

    /// 用新的标记替换 `position` 处的图片
    ///
    /// 返回是否发生了替换（位置越界或不是图片时返回 false）。
    pub fn replace_image(&mut self, position: usize, replacement: &str) -> bool {
        match self.segments.get_mut(position) {
            Some(segment @ Segment::Image(_)) => {
                *segment = Segment::Markup(replacement.to_string());
                true
            }
            _ => false,
        }
    }

    /// 序列化回 HTML
    pub fn serialize(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Markup(text) => text.as_str(),
                Segment::Image(image) => image.raw.as_str(),
            })
            .collect()
    }
}

/// 图片路径最后一个非空段（去掉查询串和片段）
///
/// 取不出时返回空串，调用方必须把空关键字当作找不到资源。
pub fn search_key(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// 把 HTML 编码成可直接拼进脚本的字符串字面量
///
/// 单引号和换行必须被中和，否则 `setContent(...)` 会破坏编辑器状态。
pub fn script_string_literal(markup: &str) -> Result<String, serde_json::Error> {
    let quoted = serde_json::to_string(markup)?;
    // JSON 允许 U+2028 / U+2029 原样出现，旧的脚本引擎把它们当作换行
    Ok(quoted
        .replace('\'', "\\'")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}
