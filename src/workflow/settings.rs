use crate::config::{Config, Timeouts};
use crate::services::hover::HoverSettings;

/// 处理条目所需的参数
#[derive(Debug, Clone)]
pub struct FixSettings {
    /// 失效图片 src 中的标记
    pub marker: String,
    pub hover: HoverSettings,
    pub timeouts: Timeouts,
    /// 题库从第几道题开始（从0开始）
    pub start_index: usize,
}

impl FixSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            marker: config.marker.clone(),
            hover: HoverSettings {
                max_attempts: config.hover_max_attempts,
                settle: config.timeouts.hover_settle,
            },
            timeouts: config.timeouts.clone(),
            start_index: 0,
        }
    }

    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }
}
