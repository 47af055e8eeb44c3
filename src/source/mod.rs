// source/mod.rs — APOD 数据源抽象接口
// 定义元数据结构和数据源 Trait，具体实现见 nasa.rs

pub mod nasa;

#[cfg(test)]
pub mod mock;

use crate::error::{ApodError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

/// 一条 APOD 元数据记录
///
/// 只提取需要的字段，JSON 中其余字段由 serde 自动忽略
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ApodInfo {
    /// 媒体资源地址，图片日为图片 URL，视频日为视频页面 URL
    pub url: String,

    /// APOD 日期（YYYY-MM-DD）
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub explanation: Option<String>,

    /// 高清原图地址，仅图片日提供
    #[serde(default)]
    pub hdurl: Option<String>,

    /// "image" / "video" / "other"
    #[serde(default = "default_media_type")]
    pub media_type: String,

    #[serde(default)]
    pub copyright: Option<String>,

    /// 视频日的缩略图，请求时带上 thumbs=true 才会返回
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

fn default_media_type() -> String {
    "image".to_string()
}

impl ApodInfo {
    /// 选出真正要下载的图片地址
    ///
    /// 图片日按 `prefer_hd` 在 hdurl 与 url 之间选择；
    /// 其他媒体类型只能退回缩略图，没有缩略图则无法作为壁纸。
    pub fn image_url(&self, prefer_hd: bool) -> Result<&str> {
        if self.media_type == "image" {
            let url = match (&self.hdurl, prefer_hd) {
                (Some(hd), true) => hd.as_str(),
                _ => self.url.as_str(),
            };
            return Ok(url);
        }

        self.thumbnail_url
            .as_deref()
            .ok_or_else(|| ApodError::UnsupportedMedia(self.media_type.clone()))
    }
}

/// APOD 数据源的抽象 Trait
///
/// 获取元数据与下载图片是两次独立的请求：
/// 元数据里声明的图片地址才是真正的二进制资源
#[async_trait]
pub trait ApodSource {
    /// 获取指定日期的元数据
    async fn fetch_info(&self, date: NaiveDate) -> Result<ApodInfo>;

    /// 下载图片，返回原始字节
    async fn download_image(&self, url: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(json: &str) -> ApodInfo {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minimal_record_only_needs_url() {
        let info = info(r#"{"url": "https://example.com/img/foo.jpg"}"#);
        assert_eq!(info.url, "https://example.com/img/foo.jpg");
        assert_eq!(info.media_type, "image");
        assert_eq!(info.title, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let info = info(
            r#"{
                "date": "2022-03-11",
                "title": "The Tadpoles of IC 410",
                "url": "https://apod.nasa.gov/apod/image/2203/Tadpoles_small.jpg",
                "hdurl": "https://apod.nasa.gov/apod/image/2203/Tadpoles.jpg",
                "media_type": "image",
                "service_version": "v1"
            }"#,
        );
        assert_eq!(info.date.as_deref(), Some("2022-03-11"));
        assert_eq!(info.title.as_deref(), Some("The Tadpoles of IC 410"));
    }

    #[test]
    fn image_url_prefers_hd_only_when_asked() {
        let info = info(
            r#"{"url": "https://x/small.jpg", "hdurl": "https://x/big.jpg", "media_type": "image"}"#,
        );
        assert_eq!(info.image_url(false).unwrap(), "https://x/small.jpg");
        assert_eq!(info.image_url(true).unwrap(), "https://x/big.jpg");
    }

    #[test]
    fn image_url_falls_back_to_url_without_hdurl() {
        let info = info(r#"{"url": "https://x/small.jpg"}"#);
        assert_eq!(info.image_url(true).unwrap(), "https://x/small.jpg");
    }

    #[test]
    fn video_day_uses_thumbnail() {
        let info = info(
            r#"{"url": "https://www.youtube.com/embed/abc", "media_type": "video",
                "thumbnail_url": "https://img.youtube.com/vi/abc/0.jpg"}"#,
        );
        assert_eq!(
            info.image_url(false).unwrap(),
            "https://img.youtube.com/vi/abc/0.jpg"
        );
    }

    #[test]
    fn video_day_without_thumbnail_is_unsupported() {
        let info = info(r#"{"url": "https://www.youtube.com/embed/abc", "media_type": "video"}"#);
        assert!(matches!(
            info.image_url(false),
            Err(ApodError::UnsupportedMedia(kind)) if kind == "video"
        ));
    }
}
