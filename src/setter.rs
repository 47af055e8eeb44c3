// setter.rs — 系统壁纸设置模块

use crate::error::{ApodError, Result};
use log::info;
use rust_i18n::t;
use std::path::Path;

/// 将指定路径的图片设置为系统壁纸
///
/// # 参数
/// - `path`: 已存在的本地图片路径
pub fn set_from_path(path: impl AsRef<Path>) -> Result<()> {
    let path_ref = path.as_ref();
    let path_str = path_ref
        .to_str()
        .ok_or_else(|| ApodError::Wallpaper(t!("error_utf8").to_string()))?;

    info!("setting wallpaper to {}", path_ref.display());

    // 由 wallpaper 库识别操作系统并调用相应的 API
    wallpaper::set_from_path(path_str).map_err(|e| ApodError::Wallpaper(e.to_string()))
}
