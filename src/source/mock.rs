// mock.rs — 测试用的数据源
// 返回预设的元数据与图片字节，并记录调用次数

use super::{ApodInfo, ApodSource};
use crate::error::{ApodError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockSource {
    info: ApodInfo,
    bytes: Vec<u8>,
    /// 设置后 fetch_info 返回对应状态码的 RemoteFetch 错误
    fail_status: Option<u16>,
    /// 设置后 download_image 返回对应状态码的 RemoteFetch 错误
    download_status: Option<u16>,
    calls: AtomicUsize,
    downloads: AtomicUsize,
}

impl MockSource {
    /// 元数据只包含 url 字段
    pub fn new(url: &str, bytes: &[u8]) -> Self {
        Self::with_info(
            serde_json::from_value(serde_json::json!({ "url": url })).unwrap(),
            bytes,
        )
    }

    pub fn with_info(info: ApodInfo, bytes: &[u8]) -> Self {
        Self {
            info,
            bytes: bytes.to_vec(),
            fail_status: None,
            download_status: None,
            calls: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16) -> Self {
        let mut source = Self::new("https://example.com/img/never.jpg", b"");
        source.fail_status = Some(status);
        source
    }

    /// 元数据正常返回，下载图片失败
    pub fn failing_download(url: &str, status: u16) -> Self {
        let mut source = Self::new(url, b"");
        source.download_status = Some(status);
        source
    }

    /// 两个接口被调用的总次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApodSource for MockSource {
    async fn fetch_info(&self, _date: NaiveDate) -> Result<ApodInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_status {
            return Err(ApodError::RemoteFetch {
                url: "https://api.nasa.gov/planetary/apod".to_string(),
                status,
                message: None,
            });
        }
        Ok(self.info.clone())
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.download_status {
            return Err(ApodError::RemoteFetch {
                url: url.to_string(),
                status,
                message: None,
            });
        }
        Ok(self.bytes.clone())
    }
}
