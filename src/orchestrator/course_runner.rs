//! 单门课程处理器 - 编排层
//!
//! ## 职责
//!
//! 驱动一门课程从登录到处理完所有失效条目的完整过程。
//!
//! ## 状态流转
//!
//! ```text
//! NotAuthenticated → Authenticating → (Duo2FAPending) → ReportLoading
//!     → ReportReady → ItemsProcessing → Done
//!                                  ↘ Aborted(code)
//! ```
//!
//! 登录、课程不存在、报告刷新超时等错误中止整门课程；
//! 单个条目的错误只记录到 `RunSummary`，继续下一个条目。

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AbortCode, FixError, FixResult};
use crate::infrastructure::driver::{wait_for, wait_for_all, Locator, Session, Tab, TextMatch};
use crate::infrastructure::retry::{poll, DEFAULT_POLL_INTERVAL};
use crate::models::{CourseTarget, FixOutcome, FixedPoolRegistry, RunSummary, ValidationItem};
use crate::orchestrator::events::{ProgressEvent, ProgressSink};
use crate::orchestrator::session::run_item_in_tab;
use crate::selectors;
use crate::services::WarnWriter;
use crate::utils::logging::truncate_text;
use crate::workflow::{is_actionable, FixSettings, ItemCtx};

const HREF_JS: &str = "function() { return this.href; }";

/// 课程运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotAuthenticated,
    Authenticating,
    Duo2FAPending,
    ReportLoading,
    ReportReady,
    ItemsProcessing,
    Done,
    Aborted(AbortCode),
}

/// 单门课程处理器
pub struct CourseRunner<'a, S: Session> {
    session: &'a S,
    config: &'a Config,
    settings: FixSettings,
    sink: &'a dyn ProgressSink,
    warn_writer: Option<&'a WarnWriter>,
    force_refresh: bool,
    state: RunState,
}

impl<'a, S: Session> CourseRunner<'a, S> {
    pub fn new(session: &'a S, config: &'a Config, sink: &'a dyn ProgressSink) -> Self {
        Self {
            session,
            config,
            settings: FixSettings::from_config(config),
            sink,
            warn_writer: None,
            force_refresh: false,
            state: RunState::NotAuthenticated,
        }
    }

    pub fn with_settings(mut self, settings: FixSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 即使已有结果也重新运行链接校验
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn with_warn_writer(mut self, writer: &'a WarnWriter) -> Self {
        self.warn_writer = Some(writer);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// 处理一门课程
    ///
    /// 不返回错误：课程级错误记录在 `RunSummary::aborted` 中。
    pub async fn run(&mut self, target: &CourseTarget) -> RunSummary {
        let mut summary = RunSummary::new(target.raw());
        self.state = RunState::NotAuthenticated;
        self.sink.emit(ProgressEvent::CourseStarted {
            course: target.raw().to_string(),
        });

        match self.run_course(target, &mut summary).await {
            Ok(()) => {
                self.transition(RunState::Done);
                self.sink.emit(ProgressEvent::Done);
            }
            Err(e) => {
                let code = e.abort_code();
                error!("[课程 {}] 💥 中止 ({}): {}", target, code, e);
                summary.abort(code);
                self.transition(RunState::Aborted(code));
                self.sink.emit(ProgressEvent::Error(code));
            }
        }
        summary
    }

    async fn run_course(&mut self, target: &CourseTarget, summary: &mut RunSummary) -> FixResult<()> {
        let session = self.session;
        let tab = session.main_tab();

        tab.goto(&target.url(&self.config.base_url)).await?;
        self.authenticate(tab).await?;

        if tab.title().await?.contains("Page Not Found") {
            return Err(FixError::CourseNotFound {
                target: target.raw().to_string(),
            });
        }

        self.transition(RunState::ReportLoading);
        self.open_link_validator(tab, target).await?;
        let results = self.load_results(tab).await?;
        self.transition(RunState::ReportReady);

        let items = self.collect_items(tab, &results).await?;
        self.sink.emit(ProgressEvent::TotalItems(items.len()));

        self.transition(RunState::ItemsProcessing);
        self.process_items(target, items, summary).await;
        Ok(())
    }

    fn transition(&mut self, next: RunState) {
        info!("🔄 状态: {:?} → {:?}", self.state, next);
        self.state = next;
    }

    // ========== 登录 ==========

    async fn authenticate(&mut self, tab: &S::Tab) -> FixResult<()> {
        if !tab.title().await?.contains("Log In") {
            debug!("已登录，跳过登录流程");
            return Ok(());
        }

        self.transition(RunState::Authenticating);
        self.submit_credentials(tab).await?;

        if wait_for(tab, &Locator::css(selectors::LOGIN_ERROR), self.config.timeouts.login_error)
            .await
            .is_ok()
        {
            return Err(FixError::LoginFailure);
        }

        if is_duo_page(tab).await {
            self.transition(RunState::Duo2FAPending);
            self.sink.emit(ProgressEvent::WaitingForDuo);
            poll(self.config.timeouts.duo, DEFAULT_POLL_INTERVAL, || async move {
                (!is_duo_page(tab).await).then_some(())
            })
            .await
            .map_err(|_| FixError::Duo2FATimeout)?;
            self.sink.emit(ProgressEvent::DuoSuccess);
        }

        info!("✓ 登录完成");
        Ok(())
    }

    async fn submit_credentials(&self, tab: &S::Tab) -> FixResult<()> {
        let credentials = &self.config.credentials;
        let timeout = self.config.timeouts.element;

        let sso = login_control(tab, selectors::SSO_BUTTON, timeout).await?;
        tab.click(&sso)
            .await
            .map_err(|e| FixError::LoginNotInteractable(e.to_string()))?;

        let username = login_control(tab, selectors::USERNAME_INPUT, timeout).await?;
        tab.type_into(&username, &credentials.username)
            .await
            .map_err(|e| FixError::LoginNotInteractable(e.to_string()))?;

        let password = login_control(tab, selectors::PASSWORD_INPUT, timeout).await?;
        tab.type_into(&password, &credentials.password)
            .await
            .map_err(|e| FixError::LoginNotInteractable(e.to_string()))?;

        let submit = login_control(tab, selectors::LOGIN_SUBMIT, timeout).await?;
        tab.click(&submit)
            .await
            .map_err(|e| FixError::LoginNotInteractable(e.to_string()))?;
        Ok(())
    }

    // ========== 链接校验报告 ==========

    async fn open_link_validator(&self, tab: &S::Tab, target: &CourseTarget) -> FixResult<()> {
        let settings = wait_for(
            tab,
            &Locator::link_text(selectors::SETTINGS_LINK_TEXT),
            self.config.timeouts.login,
        )
        .await
        .map_err(|_| FixError::CourseNotFound {
            target: target.raw().to_string(),
        })?;
        tab.click(&settings).await?;

        let validate = wait_for(
            tab,
            &Locator::partial_link_text(selectors::VALIDATE_LINKS_TEXT),
            self.config.timeouts.element,
        )
        .await?;
        tab.click(&validate).await?;
        Ok(())
    }

    async fn load_results(&self, tab: &S::Tab) -> FixResult<Vec<<S::Tab as Tab>::Element>> {
        let result_locator = Locator::css(selectors::RESULT);
        let results = tab.find_all(&result_locator).await?;
        if !results.is_empty() && !self.force_refresh {
            return Ok(results);
        }

        info!("🔄 重新运行链接校验，最长等待 {:?}", self.config.timeouts.refresh);
        match tab
            .find_first(&Locator::partial_link_text(selectors::LINK_VALIDATION_TEXT))
            .await?
        {
            Some(button) => tab.click(&button).await?,
            None => warn!("⚠️ 未找到 \"{}\" 按钮，无法刷新", selectors::LINK_VALIDATION_TEXT),
        }

        wait_for_all(tab, &result_locator, self.config.timeouts.refresh)
            .await
            .map_err(|_| FixError::ReportRefreshTimeout)
    }

    /// 只保留含有标记链接的结果
    async fn collect_items(
        &self,
        tab: &S::Tab,
        results: &[<S::Tab as Tab>::Element],
    ) -> FixResult<Vec<ValidationItem>> {
        let marker_link = Locator::text_in(selectors::ANCHOR, TextMatch::Contains(self.settings.marker.clone()));
        let mut items = Vec::new();

        for result in results {
            if tab.find_first_within(result, &marker_link).await?.is_none() {
                continue;
            }
            let Some(link) = tab
                .find_first_within(result, &Locator::css(selectors::RESULT_LINK))
                .await?
            else {
                warn!("⚠️ 校验结果缺少标题链接，已跳过");
                continue;
            };

            let url = match tab.eval_on(&link, HREF_JS).await {
                Ok(serde_json::Value::String(href)) => href,
                _ => tab.attribute(&link, "href").await?.unwrap_or_default(),
            };
            if url.is_empty() {
                warn!("⚠️ 校验结果链接为空，已跳过");
                continue;
            }

            let title = tab.text(&link).await?;
            let summary = tab.text(result).await?;
            items.push(ValidationItem::new(title.trim(), summary, url));
        }

        info!("🔍 找到 {} 个含 {} 的条目", items.len(), self.settings.marker);
        Ok(items)
    }

    // ========== 条目处理 ==========

    async fn process_items(
        &self,
        target: &CourseTarget,
        items: Vec<ValidationItem>,
        summary: &mut RunSummary,
    ) {
        let total = items.len();
        let mut registry = FixedPoolRegistry::new();

        for (index, item) in items.into_iter().enumerate() {
            let ctx = ItemCtx::new(target.raw(), index + 1, total, &item);

            if !registry.register(&item) {
                info!("{} ⏭️ 同一地址已处理过，跳过", ctx);
                summary.record(item, FixOutcome::SkippedDuplicate);
                continue;
            }

            info!("{} 🔧 开始处理: {}", ctx, item.title);
            let result = if is_actionable(item.kind()) {
                run_item_in_tab(self.session, &item, &self.settings).await
            } else {
                warn!("{} ⚠️ 无法识别的条目: {}", ctx, truncate_text(item.summary.trim(), 80));
                Err(FixError::UnrecognizedContentKind)
            };

            match &result {
                Ok(()) => self.sink.emit(ProgressEvent::ItemSuccess { url: item.url.clone() }),
                Err(e) => {
                    self.sink.emit(ProgressEvent::ItemFailed {
                        url: item.url.clone(),
                        reason: e.to_string(),
                    });
                    self.record_warning(target, &item, e).await;
                }
            }
            summary.record(item, FixOutcome::from(result));
        }
    }

    async fn record_warning(&self, target: &CourseTarget, item: &ValidationItem, err: &FixError) {
        if let Some(writer) = self.warn_writer {
            if let Err(e) = writer.write(target.raw(), item, &err.to_string()).await {
                warn!("⚠️ 写入 {} 失败: {}", writer.path(), e);
            }
        }
    }
}

/// Duo 二次验证页面
async fn is_duo_page<T: Tab>(tab: &T) -> bool {
    let url = tab.current_url().await.unwrap_or_default();
    let title = tab.title().await.unwrap_or_default();
    url.contains("duosecurity") || title.contains("Duo")
}

async fn login_control<T: Tab>(
    tab: &T,
    selector: &str,
    timeout: std::time::Duration,
) -> FixResult<T::Element> {
    wait_for(tab, &Locator::css(selector), timeout)
        .await
        .map_err(|_| FixError::LoginNotInteractable(selector.to_string()))
}
