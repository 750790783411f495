//! 标签页生命周期
//!
//! 每个条目在独立的标签页中处理，处理完成后无论成败都关闭标签页并回到主标签页。

use tracing::{debug, warn};

use crate::error::FixResult;
use crate::infrastructure::driver::Session;
use crate::models::ValidationItem;
use crate::workflow::{dispatch, FixSettings};

/// 打开条目 URL，运行对应流程，然后关闭标签页
///
/// 关闭 / 切回主标签页的失败只记录日志，不影响条目结果。
pub async fn run_item_in_tab<S: Session>(
    session: &S,
    item: &ValidationItem,
    settings: &FixSettings,
) -> FixResult<()> {
    let result = match session.open_tab(&item.url).await {
        Ok(tab) => {
            debug!("已打开标签页: {}", item.url);
            let result = dispatch(&tab, item.kind(), settings).await;
            if let Err(e) = session.close_tab(tab).await {
                warn!("⚠️ 关闭标签页失败: {}", e);
            }
            result
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = session.focus_main().await {
        warn!("⚠️ 切回主标签页失败: {}", e);
    }
    result
}
