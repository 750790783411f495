mod support;

use std::time::Duration;

use support::{fast_config, FakeSession, FakeTab, NodeId};
use tokio::sync::mpsc::UnboundedReceiver;
use xid_fixer::error::{AbortCode, FixError};
use xid_fixer::models::{CourseTarget, FixOutcome};
use xid_fixer::orchestrator::{run_courses, ChannelSink, CourseBatch, CourseRunner, ProgressEvent, RunState};
use xid_fixer::selectors;
use xid_fixer::services::WarnWriter;

fn drain(rx: &mut UnboundedReceiver<ProgressEvent>) -> Vec<&'static str> {
    let mut codes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        codes.push(event.code());
    }
    codes
}

/// 已登录的课程首页，带 Settings / Validate Links 入口
fn course_home(title: &str) -> FakeTab {
    let tab = FakeTab::new(title);
    tab.add(selectors::ANCHOR, None, selectors::SETTINGS_LINK_TEXT);
    tab.add(selectors::ANCHOR, None, selectors::VALIDATE_LINKS_TEXT);
    tab
}

fn add_result(tab: &FakeTab, href: &str, summary: &str, with_marker: bool) -> NodeId {
    let result = tab.add(selectors::RESULT, None, summary);
    tab.add_with_attr(selectors::RESULT_LINK, Some(result), "Item", ("href", href));
    if with_marker {
        tab.add(selectors::ANCHOR, Some(result), "/bbcswebdav/xid-4410_1");
    }
    result
}

fn login_page() -> (FakeTab, NodeId) {
    let tab = FakeTab::new("Log In to Canvas");
    tab.add(selectors::SSO_BUTTON, None, "Boise State Login");
    tab.add(selectors::USERNAME_INPUT, None, "");
    tab.add(selectors::PASSWORD_INPUT, None, "");
    let submit = tab.add(selectors::LOGIN_SUBMIT, None, "Sign in");
    (tab, submit)
}

#[tokio::test]
async fn test_login_failure_aborts_course() {
    let (main, submit) = login_page();
    main.on_click(submit, |p| {
        p.add(selectors::LOGIN_ERROR, None, "Incorrect user ID or password");
    });
    let session = FakeSession::new(main.clone());
    let config = fast_config();
    let (sink, mut rx) = ChannelSink::channel();

    let mut runner = CourseRunner::new(&session, &config, &sink);
    let summary = runner.run(&CourseTarget::new("101")).await;

    assert_eq!(summary.aborted, Some(AbortCode::LoginFail));
    assert_eq!(runner.state(), RunState::Aborted(AbortCode::LoginFail));
    assert_eq!(drain(&mut rx), vec!["course_started", "error"]);
    assert_eq!(main.with(|p| p.url.clone()), "https://canvas.test/courses/101");

    let typed: Vec<String> = main.with(|p| p.typed.iter().map(|(_, t)| t.clone()).collect());
    assert_eq!(typed, vec!["jdoe".to_string(), "secret".to_string()]);
}

#[tokio::test]
async fn test_missing_login_controls() {
    let main = FakeTab::new("Log In to Canvas");
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("101"))
        .await;

    assert_eq!(summary.aborted, Some(AbortCode::LoginNotInteractable));
}

#[tokio::test]
async fn test_duo_wait_then_success() {
    let (main, submit) = login_page();
    main.on_click(submit, |p| p.title = "Duo Security".to_string());
    add_result(&main, "https://canvas.test/courses/1/pages/intro", "Page", false);
    main.add(selectors::ANCHOR, None, selectors::SETTINGS_LINK_TEXT);
    main.add(selectors::ANCHOR, None, selectors::VALIDATE_LINKS_TEXT);

    let approver = main.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(80)).await;
        approver.with(|p| p.title = "Course Home".to_string());
    });

    let session = FakeSession::new(main);
    let mut config = fast_config();
    config.timeouts.duo = Duration::from_secs(5);
    let (sink, mut rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("1"))
        .await;

    assert_eq!(summary.aborted, None);
    assert_eq!(
        drain(&mut rx),
        vec!["course_started", "waiting_for_duo", "duo_success", "total_items", "done"]
    );
}

#[tokio::test]
async fn test_duo_timeout() {
    let (main, submit) = login_page();
    main.on_click(submit, |p| p.url = "https://api-1.duosecurity.com/frame".to_string());
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, mut rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("1"))
        .await;

    assert_eq!(summary.aborted, Some(AbortCode::DuoFail));
    assert_eq!(drain(&mut rx), vec!["course_started", "waiting_for_duo", "error"]);
}

#[tokio::test]
async fn test_course_not_found() {
    let session = FakeSession::new(FakeTab::new("Page Not Found"));
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("999"))
        .await;
    assert_eq!(summary.aborted, Some(AbortCode::CourseDne));
}

#[tokio::test]
async fn test_missing_settings_link_means_course_dne() {
    let session = FakeSession::new(FakeTab::new("Dashboard"));
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("999"))
        .await;
    assert_eq!(summary.aborted, Some(AbortCode::CourseDne));
}

#[tokio::test]
async fn test_revalidation_when_report_is_empty() {
    let main = course_home("Course Home");
    let refresh = main.add(selectors::ANCHOR, None, "Run Link Validation");
    main.on_click(refresh, |p| {
        let result = p.add(selectors::RESULT, None, "Syllabus");
        let link = p.add(selectors::RESULT_LINK, Some(result), "Syllabus");
        p.set_attr(link, "href", "https://canvas.test/courses/1/syllabus");
        p.add(selectors::ANCHOR, Some(result), "xid-1_1");
    });
    let session = FakeSession::new(main.clone());
    let config = fast_config();
    let (sink, mut rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("1"))
        .await;

    assert!(main.clicked(refresh));
    assert_eq!(summary.aborted, None);
    assert_eq!(summary.items.len(), 1);
    assert_eq!(
        summary.items[0].outcome,
        FixOutcome::Failed(FixError::UnrecognizedContentKind)
    );
    assert_eq!(
        drain(&mut rx),
        vec!["course_started", "total_items", "item_failed", "done"]
    );
}

#[tokio::test]
async fn test_forced_refresh_with_existing_results() {
    let main = course_home("Course Home");
    add_result(&main, "https://canvas.test/courses/1/pages/a", "Page", false);
    let refresh = main.add(selectors::ANCHOR, None, "Link Validation");
    let session = FakeSession::new(main.clone());
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .force_refresh(true)
        .run(&CourseTarget::new("1"))
        .await;

    assert!(main.clicked(refresh));
    assert_eq!(summary.aborted, None);
}

#[tokio::test]
async fn test_refresh_timeout() {
    let main = course_home("Course Home");
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, mut rx) = ChannelSink::channel();

    let mut runner = CourseRunner::new(&session, &config, &sink);
    let summary = runner.run(&CourseTarget::new("1")).await;

    assert_eq!(summary.aborted, Some(AbortCode::TimeoutFail));
    assert_eq!(runner.state(), RunState::Aborted(AbortCode::TimeoutFail));
    assert_eq!(drain(&mut rx), vec!["course_started", "error"]);
}

#[tokio::test]
async fn test_results_without_marker_are_ignored() {
    let main = course_home("Course Home");
    add_result(&main, "https://canvas.test/courses/1/pages/a", "Page", false);
    add_result(&main, "https://canvas.test/courses/1/pages/b", "Page", false);
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, mut rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("1"))
        .await;

    assert_eq!(summary.attempted, 0);
    assert!(session.opened().is_empty());
    assert_eq!(drain(&mut rx), vec!["course_started", "total_items", "done"]);
}

#[tokio::test]
async fn test_same_quiz_is_processed_once() {
    let main = course_home("Course Home");
    add_result(&main, "https://canvas.test/courses/1/quizzes/7#question_1", "Quiz Question", true);
    add_result(&main, "https://canvas.test/courses/1/quizzes/7#question_7", "Quiz Question", true);
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let summary = CourseRunner::new(&session, &config, &sink)
        .run(&CourseTarget::new("1"))
        .await;

    // 空白标签页里找不到编辑按钮，第一个条目失败；第二个条目不会再打开
    assert_eq!(session.opened().len(), 1);
    assert_eq!(session.closed(), 1);
    assert_eq!(session.focused(), 1);
    assert!(summary.items[0].outcome.is_failed());
    assert_eq!(summary.items[1].outcome, FixOutcome::SkippedDuplicate);
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.skipped_duplicate, 1);
}

#[tokio::test]
async fn test_unrecognized_item_opens_no_tab_and_is_logged() {
    let main = course_home("Course Home");
    add_result(&main, "https://canvas.test/courses/1/files/3", "Course File", true);
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let path = std::env::temp_dir().join(format!("xid_fixer_course_warn_{}.txt", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let writer = WarnWriter::with_path(path.to_string_lossy());

    let summary = CourseRunner::new(&session, &config, &sink)
        .with_warn_writer(&writer)
        .run(&CourseTarget::new("1"))
        .await;

    assert!(session.opened().is_empty());
    assert_eq!(
        summary.items[0].outcome,
        FixOutcome::Failed(FixError::UnrecognizedContentKind)
    );
    let warn = std::fs::read_to_string(&path).unwrap();
    assert!(warn.contains("https://canvas.test/courses/1/files/3"));
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_course_abort_does_not_stop_next_course() {
    let main = course_home("Course Home");
    main.with(|p| {
        p.titles_by_url
            .insert("https://canvas.test/courses/1".into(), "Page Not Found".into());
        p.titles_by_url
            .insert("https://canvas.test/courses/2".into(), "Course Home".into());
    });
    add_result(&main, "https://canvas.test/courses/2/pages/a", "Page", false);
    let session = FakeSession::new(main);
    let config = fast_config();
    let (sink, _rx) = ChannelSink::channel();

    let batch = CourseBatch {
        targets: vec![CourseTarget::new("1"), CourseTarget::new("2")],
        ..CourseBatch::default()
    };
    let summaries = run_courses(&session, &config, &sink, None, &batch).await;

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].aborted, Some(AbortCode::CourseDne));
    assert_eq!(summaries[1].aborted, None);
}
