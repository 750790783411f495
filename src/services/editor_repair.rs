//! 富文本编辑器修复算法 - 业务能力层
//!
//! 只处理"一个编辑器"：读出内容，找到失效图片，逐张通过图片选择器
//! 换成已上传的新图片，最后一次性写回。
//! 编辑器的具体交互（TinyMCE、图片选择器）通过 `RichTextEditor` 注入。

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{FixError, FixResult};
use crate::services::markup::{BrokenImageReference, EditorMarkup};

/// 一个可编辑的富文本区域
#[async_trait]
pub trait RichTextEditor: Send + Sync {
    /// 激活编辑器（使其成为 activeEditor）
    async fn activate(&self) -> FixResult<()>;

    async fn read_content(&self) -> FixResult<String>;

    /// 用 `markup` 整体替换编辑器内容
    async fn write_content(&self, markup: &str) -> FixResult<()>;

    /// 通过图片选择器插入 `key` 对应的图片
    ///
    /// 找不到时返回 `FixError::AssetNotFound`。
    async fn insert_asset(&self, key: &str) -> FixResult<()>;

    async fn clear(&self) -> FixResult<()> {
        self.write_content("").await
    }
}

/// 单个编辑器的修复结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// 发现的失效图片数
    pub flagged: usize,
    /// 成功替换数
    pub replaced: usize,
    /// 未找到替换资源的搜索关键字
    pub missing: Vec<String>,
}

impl RepairReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// 第一处缺失对应的错误
    pub fn first_failure(&self) -> Option<FixError> {
        self.missing
            .first()
            .map(|key| FixError::AssetNotFound { key: key.clone() })
    }

    pub fn into_result(self) -> FixResult<RepairReport> {
        match self.first_failure() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// 修复一个编辑器中所有 `src` 含 `marker` 的图片
///
/// - 没有失效图片时不写回任何内容
/// - 单张图片找不到替换资源只记入 `missing`，原节点保持不变
/// - 其他错误中断循环，但会先尽力把当前内容写回，避免编辑器被清空
pub async fn repair_editor<E>(editor: &E, marker: &str) -> FixResult<RepairReport>
where
    E: RichTextEditor + ?Sized,
{
    editor.activate().await?;
    let original = editor.read_content().await?;
    if original.trim().is_empty() {
        warn!("⚠️ 编辑器内容为空，请确认页面是否加载完整");
    }

    let mut markup = EditorMarkup::parse(&original);
    let broken = markup.broken_images(marker);
    let mut report = RepairReport {
        flagged: broken.len(),
        ..RepairReport::default()
    };

    if broken.is_empty() {
        debug!("编辑器中没有失效图片");
        return Ok(report);
    }
    info!("🖼️ 发现 {} 张失效图片", broken.len());

    if let Err(e) = replace_each(editor, &mut markup, &broken, &mut report).await {
        warn!("⚠️ 修复中断 ({})，写回当前内容", e);
        if let Err(write_err) = editor.write_content(&markup.serialize()).await {
            warn!("⚠️ 写回失败: {}", write_err);
        }
        return Err(e);
    }

    editor.write_content(&markup.serialize()).await?;
    info!(
        "📝 编辑器已写回: 替换 {}/{} 张",
        report.replaced, report.flagged
    );
    Ok(report)
}

async fn replace_each<E>(
    editor: &E,
    markup: &mut EditorMarkup,
    broken: &[BrokenImageReference],
    report: &mut RepairReport,
) -> FixResult<()>
where
    E: RichTextEditor + ?Sized,
{
    for reference in broken {
        let key = &reference.search_key;
        // 空关键字会匹配任意搜索结果，直接当作找不到
        if key.trim().is_empty() {
            warn!("❌ 无法从 {} 取出搜索关键字，保留原节点", reference.src);
            report.missing.push(key.clone());
            continue;
        }
        editor.clear().await?;

        match editor.insert_asset(key).await {
            Ok(()) => {}
            Err(FixError::AssetNotFound { key }) => {
                warn!("❌ 未找到图片 {}，保留原节点", key);
                report.missing.push(key);
                continue;
            }
            Err(e) => return Err(e),
        }

        let inserted = editor.read_content().await?;
        let inserted = inserted.trim();
        if inserted.is_empty() {
            warn!("❌ 图片 {} 插入后编辑器为空，保留原节点", key);
            report.missing.push(key.clone());
            continue;
        }

        markup.replace_image(reference.position, inserted);
        report.replaced += 1;
        debug!("已替换图片: {}", key);
    }
    Ok(())
}
