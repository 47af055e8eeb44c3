// resolve.rs — 命令行参数校验
// 图片目录必须已存在；日期必须是 YYYY-MM-DD 格式的合法日期

use crate::error::{ApodError, Result};
use chrono::NaiveDate;
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// APOD 日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 第一张 APOD 的发布日期，更早的日期远端不会有数据
pub fn first_apod_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or(NaiveDate::MIN)
}

/// 确定图片保存目录
///
/// 命令行参数优先；未提供时退回配置文件中的 `image_dir`。
/// 两者都没有，或者路径不是一个已存在的目录，都视为参数错误。
/// 返回绝对路径：数据库中记录的图片路径与工作目录无关。
pub fn resolve_image_dir(arg: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    let dir = arg
        .or(configured)
        .ok_or_else(|| ApodError::InvalidArgument(t!("error_missing_dir").to_string()))?;

    if !dir.is_dir() {
        return Err(ApodError::InvalidArgument(
            t!("error_dir_not_found", path => dir.display()).to_string(),
        ));
    }

    Ok(dir.canonicalize()?)
}

/// 解析 `YYYY-MM-DD` 格式的日期字符串
pub fn parse_apod_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| ApodError::InvalidArgument(t!("error_date_format", date => text).to_string()))
}

/// 确定要获取的 APOD 日期
///
/// - 未提供日期：使用 `today`
/// - 提供了日期：必须能解析，且位于第一张 APOD 与 `today` 之间
pub fn resolve_apod_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let Some(text) = arg else {
        return Ok(today);
    };

    let date = parse_apod_date(text)?;
    let first = first_apod_date();
    if date < first || date > today {
        return Err(ApodError::InvalidArgument(
            t!(
                "error_date_range",
                date => date,
                first => first,
                today => today
            )
            .to_string(),
        ));
    }

    Ok(date)
}

/// 当前本地日期
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
