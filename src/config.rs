use std::time::Duration;

use crate::models::Credentials;

/// 各类等待的上限
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeouts {
    /// 常规 UI 元素（编辑按钮、编辑器、图片选择器）
    pub element: Duration,
    /// 题目编辑器出现
    pub editor: Duration,
    /// 答案区域的编辑控件
    pub answer: Duration,
    /// 图片搜索框输入后等待结果渲染
    pub picker_settle: Duration,
    /// 悬停后等待按钮出现
    pub hover_settle: Duration,
    /// 提交后检测 `.errorBox`
    pub save_check: Duration,
    /// 登录后检测 `.login_error`
    pub login_error: Duration,
    /// 登录完成、等待课程导航出现
    pub login: Duration,
    /// Duo 二次验证
    pub duo: Duration,
    /// 链接校验刷新
    pub refresh: Duration,
}

impl Timeouts {
    /// 所有等待使用同一个上限
    pub fn uniform(bound: Duration) -> Self {
        Self {
            element: bound,
            editor: bound,
            answer: bound,
            picker_settle: bound,
            hover_settle: bound,
            save_check: bound,
            login_error: bound,
            login: bound,
            duo: bound,
            refresh: bound,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(10),
            editor: Duration::from_secs(30),
            answer: Duration::from_secs(5),
            picker_settle: Duration::from_secs(1),
            hover_settle: Duration::from_millis(100),
            save_check: Duration::from_secs(2),
            login_error: Duration::from_secs(5),
            login: Duration::from_secs(120),
            duo: Duration::from_secs(120),
            refresh: Duration::from_secs(600),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// Canvas 站点根地址
    pub base_url: String,
    /// SSO 账号（Debug 输出不含密码）
    pub credentials: Credentials,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 失效图片 src 中的标记
    pub marker: String,
    /// 悬停重试上限
    pub hover_max_attempts: usize,
    pub timeouts: Timeouts,
    /// 输出日志文件
    pub output_log_file: String,
    /// 失败条目记录文件
    pub warn_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://boisestatecanvas.instructure.com".to_string(),
            credentials: Credentials::default(),
            browser_debug_port: 2001,
            marker: "xid".to_string(),
            hover_max_attempts: 500,
            timeouts: Timeouts::default(),
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
        }
    }
}

fn env_secs(name: &str, fallback: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

/// 悬停重试次数，至少为 1
fn hover_attempts(raw: Option<String>, fallback: usize) -> usize {
    raw.and_then(|v| v.parse().ok()).unwrap_or(fallback).max(1)
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let timeouts = Timeouts {
            login: env_secs("LOGIN_TIMEOUT_SECS", default.timeouts.login),
            refresh: env_secs("REFRESH_TIMEOUT_SECS", default.timeouts.refresh),
            duo: env_secs("DUO_TIMEOUT_SECS", default.timeouts.duo),
            ..default.timeouts
        };

        Self {
            base_url: std::env::var("CANVAS_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.base_url),
            credentials: Credentials::new(
                std::env::var("CANVAS_USERNAME").unwrap_or_default(),
                std::env::var("CANVAS_PASSWORD").unwrap_or_default(),
            ),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            marker: std::env::var("XID_MARKER").unwrap_or(default.marker),
            hover_max_attempts: hover_attempts(std::env::var("HOVER_MAX_ATTEMPTS").ok(), default.hover_max_attempts),
            timeouts,
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
        }
    }
}
