//! 基础设施层
//!
//! 持有稀缺资源（Browser / Page），只暴露能力：
//! - `driver` - 驱动抽象（Tab / Session / Locator / KeyChord）
//! - `cdp` - chromiumoxide 实现
//! - `retry` - 有界轮询与重试原语

pub mod cdp;
pub mod driver;
pub mod retry;

pub use cdp::{CdpSession, CdpTab};
pub use driver::{Key, KeyChord, Locator, Modifiers, Session, Tab, TextMatch};
pub use retry::{poll, retry, RetryError, TimedOut};
