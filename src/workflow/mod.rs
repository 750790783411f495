pub mod dispatch;
pub mod handlers;
pub mod item_ctx;
pub mod question_pool;
pub mod settings;

pub use dispatch::{dispatch, is_actionable};
pub use item_ctx::ItemCtx;
pub use question_pool::run_question_loop;
pub use settings::FixSettings;
