//! Canvas / TinyMCE 页面选择器
//!
//! 页面结构一变，只需要改这里。

// --- 登录 ---
pub const SSO_BUTTON: &str = "img[alt*='Boise State Logo'] ~ ion-button";
pub const USERNAME_INPUT: &str = "#userNameInput";
pub const PASSWORD_INPUT: &str = "#passwordInput";
pub const LOGIN_SUBMIT: &str = "#submitButton";
pub const LOGIN_ERROR: &str = ".login_error";

// --- 链接校验报告 ---
pub const SETTINGS_LINK_TEXT: &str = "Settings";
pub const VALIDATE_LINKS_TEXT: &str = "Validate Links in Content";
pub const LINK_VALIDATION_TEXT: &str = "Link Validation";
pub const RESULT: &str = ".result";
pub const RESULT_LINK: &str = "h2 a";
pub const ANCHOR: &str = "a";

// --- 各类条目的编辑入口 ---
pub const EDIT_ASSIGNMENT: &str = ".edit_assignment_link";
pub const EDIT_PAGE: &str = ".edit-wiki";
pub const EDIT_DISCUSSION: &str = ".edit-btn";
pub const QUESTIONS_TAB_TEXT: &str = "Questions";
pub const SUBMIT_ITEM: &str = "button[class*=submit]";

// --- 题库 / 测验题 ---
pub const QUESTION_HOLDER: &str = ".question_holder";
pub const EDIT_QUESTION: &str = "a[class*=edit_question_link]";
pub const ANSWER: &str = ".form_answers .answer";
pub const ANSWER_EDIT_HTML: &str = "a[class='edit_html']";
pub const SELECT_ANSWER: &str = ".select_answer_link";
pub const CORRECT_ANSWER_CLASS: &str = "correct_answer";
pub const SUBMIT_QUESTION: &str = "button[type=submit]";
pub const ERROR_BOX: &str = ".errorBox";
pub const REGRADE_DIALOG: &str = ".ui-widget";
pub const REGRADE_OPTION_TEXT: &str = "Update question without regrading";
pub const REGRADE_CONFIRM_TEXT: &str = "Update";

// --- TinyMCE ---
pub const EDITOR_IFRAME: &str = ".tox-edit-area__iframe";
pub const QUIZ_DESCRIPTION_IFRAME_ID: &str = "quiz_description_ifr";
pub const FULLSCREEN: &str = ".tox-fullscreen";
pub const COURSE_IMAGES: &str = "div[title='Course Images']";
pub const PICKER_SEARCH: &str = "input[placeholder='Search']";
pub const PICKER_RESULTS: &str = "div[data-testid='instructure_links-ImagesPanel'] span";
pub const PICKER_RESULTS_CHILD: &str = "div";
pub const BUTTON: &str = "button";
pub const IMG: &str = "img";
