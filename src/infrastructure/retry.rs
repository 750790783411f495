//! 轮询 / 重试原语 - 基础设施层
//!
//! 所有"等待"都通过这里表达：每次等待都有明确的超时，
//! 没有其他取消手段，调用方把超时当作取消处理。

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 轮询超时
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("轮询 {waited:?} 后超时")]
pub struct TimedOut {
    pub waited: Duration,
}

/// 重试失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// 遇到非瞬时错误，立即放弃
    Fatal(E),
    /// 所有尝试都以瞬时错误结束
    AttemptsExhausted { attempts: usize, last: Option<E> },
}

/// 反复调用 `probe` 直到返回 `Some` 或超时
///
/// `probe` 至少会被调用一次（即使 `timeout` 为零）。
pub async fn poll<T, F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Result<T, TimedOut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(TimedOut { waited });
        }

        sleep(interval.min(timeout - waited)).await;
    }
}

/// 重复执行 `action`，吸收 `is_transient` 认定的错误，最多 `max_attempts` 次
pub async fn retry<T, E, F, Fut, P>(
    max_attempts: usize,
    is_transient: P,
    mut action: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut last = None;

    for attempt in 1..=max_attempts {
        match action().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) => {
                if attempt % 50 == 0 {
                    debug!("重试中 ({}/{})", attempt, max_attempts);
                }
                last = Some(e);
            }
            Err(e) => return Err(RetryError::Fatal(e)),
        }
    }

    Err(RetryError::AttemptsExhausted {
        attempts: max_attempts,
        last,
    })
}
