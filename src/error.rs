//! 错误类型
//!
//! 分两层：
//! - `DriverError`：浏览器驱动层的原始故障（找不到元素、被遮挡、脚本失败…）
//! - `FixError`：修复流程的错误分类，决定失败的作用域（单张图片 / 单道题 / 单个条目 / 整门课程）

use std::fmt;

/// 浏览器驱动错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// 元素不存在
    #[error("找不到元素: {0}")]
    NoSuchElement(String),
    /// 元素存在但不可交互（尺寸为零、被隐藏）
    #[error("元素不可交互: {0}")]
    NotInteractable(String),
    /// 元素不在视口内
    #[error("元素超出视口: {0}")]
    OutOfBounds(String),
    /// 点击被其他元素（通常是弹窗）拦截
    #[error("点击被拦截: {0}")]
    ClickIntercepted(String),
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    Navigation { url: String, reason: String },
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    Script(String),
    /// CDP 协议层错误
    #[error("CDP 错误: {0}")]
    Cdp(String),
}

impl DriverError {
    /// 悬停/聚焦类的瞬时故障，可以通过重试消除
    pub fn is_transient_ui(&self) -> bool {
        matches!(
            self,
            DriverError::NoSuchElement(_)
                | DriverError::NotInteractable(_)
                | DriverError::OutOfBounds(_)
        )
    }
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverError::Cdp(err.to_string())
    }
}

/// 驱动层结果类型
pub type DriverResult<T> = Result<T, DriverError>;

/// 修复流程错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    /// 登录页出现错误提示
    #[error("登录失败")]
    LoginFailure,
    /// 登录控件缺失或无法点击
    #[error("登录控件不可交互: {0}")]
    LoginNotInteractable(String),
    /// 二次验证（Duo）超时
    #[error("Duo 二次验证超时")]
    Duo2FATimeout,
    /// 必需的元素始终未出现
    #[error("等待元素超时: {what}")]
    ElementTimeout { what: String },
    /// 没有找到已上传的替换图片
    #[error("未找到图片 {key} 的替换资源")]
    AssetNotFound { key: String },
    /// 悬停尝试次数耗尽
    #[error("悬停尝试 {attempts} 次后仍无法点击")]
    HoverExhausted { attempts: usize },
    /// 提交后页面出现保存错误提示
    #[error("提交后检测到错误提示，修改可能未保存")]
    SaveValidationFailure,
    /// 无法识别的内容类型
    #[error("无法识别的内容类型")]
    UnrecognizedContentKind,
    /// 课程不存在
    #[error("课程不存在: {target}")]
    CourseNotFound { target: String },
    /// 链接校验刷新超时
    #[error("链接校验刷新超时")]
    ReportRefreshTimeout,
    /// 编辑器内容无法解析或编码
    #[error("编辑器内容处理失败: {0}")]
    Markup(String),
    /// 未归类的驱动故障
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl From<serde_json::Error> for FixError {
    fn from(err: serde_json::Error) -> Self {
        FixError::Markup(err.to_string())
    }
}

impl FixError {
    /// 课程级致命错误对应的事件代码
    pub fn abort_code(&self) -> AbortCode {
        match self {
            FixError::LoginFailure => AbortCode::LoginFail,
            FixError::LoginNotInteractable(_) => AbortCode::LoginNotInteractable,
            FixError::Duo2FATimeout => AbortCode::DuoFail,
            FixError::ReportRefreshTimeout => AbortCode::TimeoutFail,
            FixError::CourseNotFound { .. } => AbortCode::CourseDne,
            _ => AbortCode::Unknown,
        }
    }
}

/// 课程中止代码
///
/// 展示层直接按字符串匹配，这些值不能改动。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortCode {
    LoginFail,
    LoginNotInteractable,
    DuoFail,
    TimeoutFail,
    CourseDne,
    Unknown,
}

impl AbortCode {
    pub fn as_str(self) -> &'static str {
        match self {
            AbortCode::LoginFail => "login_fail",
            AbortCode::LoginNotInteractable => "login_not_interactable",
            AbortCode::DuoFail => "duo_fail",
            AbortCode::TimeoutFail => "timeout_fail",
            AbortCode::CourseDne => "course_dne",
            AbortCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AbortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 修复流程结果类型
pub type FixResult<T> = Result<T, FixError>;
