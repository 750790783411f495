//! 课程、账号与链接校验条目

use std::collections::HashSet;
use std::fmt;

use super::content_kind::ContentKind;

/// 要处理的课程：课程 ID 或完整 URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTarget {
    raw: String,
}

impl CourseTarget {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into().trim().to_string(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 纯数字 ID 展开为 `{base_url}/courses/{id}`，否则原样使用
    pub fn url(&self, base_url: &str) -> String {
        if !self.raw.is_empty() && self.raw.chars().all(|c| c.is_ascii_digit()) {
            format!("{}/courses/{}", base_url.trim_end_matches('/'), self.raw)
        } else {
            self.raw.clone()
        }
    }
}

impl fmt::Display for CourseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// SSO 账号
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 链接校验报告中的一条结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationItem {
    pub title: String,
    pub summary: String,
    pub url: String,
    kind: ContentKind,
}

impl ValidationItem {
    /// 创建时分类，之后类型不再改变
    pub fn new(title: impl Into<String>, summary: impl Into<String>, url: impl Into<String>) -> Self {
        let summary = summary.into();
        Self {
            title: title.into(),
            kind: ContentKind::classify(&summary),
            summary,
            url: url.into(),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// 去掉 `#fragment` 后的 URL；相同的视为同一个工作单元
    pub fn canonical_url(&self) -> &str {
        canonical_url(&self.url)
    }
}

pub fn canonical_url(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// 本次课程运行中已处理过的 URL
///
/// 只增不减，课程结束时丢弃。
#[derive(Debug, Default)]
pub struct FixedPoolRegistry {
    seen: HashSet<String>,
}

impl FixedPoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, item: &ValidationItem) -> bool {
        self.seen.contains(item.canonical_url())
    }

    /// 登记条目；已存在时返回 false
    pub fn register(&mut self, item: &ValidationItem) -> bool {
        self.seen.insert(item.canonical_url().to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
