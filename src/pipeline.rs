// pipeline.rs — 获取并缓存当天的 APOD
// 元数据 -> 图片地址 -> 下载 -> 哈希 -> 查缓存 -> 落盘并记录

use crate::cache::{CachedImage, ImageCache};
use crate::error::Result;
use crate::source::{ApodInfo, ApodSource};
use crate::store::{self, FileNaming};
use chrono::NaiveDate;
use log::info;
use std::path::Path;

/// 本次获取的选项
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// 优先下载高清原图
    pub prefer_hd: bool,
    /// 本地文件命名方式
    pub naming: FileNaming,
}

/// 获取结果
#[derive(Debug)]
pub struct FetchOutcome {
    pub info: ApodInfo,
    /// 新写入的记录，或缓存中已存在的记录
    pub image: CachedImage,
    /// 本次是否新增了缓存记录
    pub newly_cached: bool,
}

/// 获取指定日期的 APOD 并写入缓存
///
/// 内容哈希已存在时直接返回已有记录，不重复写入；
/// 若记录对应的文件已被删除，则把刚下载的内容写回原路径。
pub async fn fetch_and_cache(
    source: &(dyn ApodSource + Sync),
    cache: &ImageCache,
    dir: &Path,
    date: NaiveDate,
    options: FetchOptions,
) -> Result<FetchOutcome> {
    let info = source.fetch_info(date).await?;
    let image_url = info.image_url(options.prefer_hd)?.to_string();

    let bytes = source.download_image(&image_url).await?;
    let hash = store::content_sha256(&bytes);

    let cached = if cache.image_already_cached(&hash)? {
        cache.find_by_hash(&hash)?
    } else {
        None
    };

    if let Some(existing) = cached {
        info!("image {} is already cached", hash);
        if !existing.local_path.is_file() {
            info!(
                "cached file {} is missing, restoring it",
                existing.local_path.display()
            );
            store::save_image_file(&existing.local_path, &bytes).await?;
        }
        return Ok(FetchOutcome {
            info,
            image: existing,
            newly_cached: false,
        });
    }

    let path = store::resolve_image_path(dir, &image_url, date, &hash, options.naming).await?;
    store::save_image_file(&path, &bytes).await?;

    let image = CachedImage {
        local_path: path,
        source_url: image_url,
        size_bytes: bytes.len() as u64,
        content_hash: hash,
        apod_date: Some(
            info.date
                .clone()
                .unwrap_or_else(|| date.format(crate::resolve::DATE_FORMAT).to_string()),
        ),
    };
    cache.record_image(&image)?;

    Ok(FetchOutcome {
        info,
        image,
        newly_cached: true,
    })
}
