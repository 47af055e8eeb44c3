// nasa.rs — NASA APOD API 异步客户端
// 负责与 APOD 接口交互：获取元数据和下载图片

use super::{ApodInfo, ApodSource};
use crate::config::ApiConfig;
use crate::error::{ApodError, Result};
use crate::resolve::DATE_FORMAT;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;

/// 接口出错时返回的 JSON 结构，例如
/// `{"code": 400, "msg": "Date must be between Jun 16, 1995 and Mar 11, 2022."}`
#[derive(Deserialize, Debug)]
struct ErrorBody {
    msg: Option<String>,
    error: Option<ErrorDetail>,
}

/// API Key 无效等情况下，api.data.gov 网关返回的是嵌套结构
#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg.or(self.error.and_then(|e| e.message))
    }
}

/// NASA APOD 异步客户端
///
/// 封装了 reqwest::Client 和接口配置。
/// API Key 与地址来自配置，不写死在代码里。
pub struct NasaApodClient {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,

    /// 接口地址与 API Key
    api: ApiConfig,
}

impl NasaApodClient {
    /// 创建新的客户端，请求超时取自配置
    pub fn new(api: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(api.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, api })
    }

    /// 将非 200 响应转换为 RemoteFetch 错误，尽量带上服务端给出的原因
    async fn remote_error(url: &str, response: reqwest::Response) -> ApodError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message);

        ApodError::RemoteFetch {
            url: url.to_string(),
            status,
            message,
        }
    }
}

#[async_trait]
impl ApodSource for NasaApodClient {
    async fn fetch_info(&self, date: NaiveDate) -> Result<ApodInfo> {
        let date_str = date.format(DATE_FORMAT).to_string();
        info!("requesting APOD metadata for {}", date_str);

        let response = self
            .client
            .get(&self.api.base_url)
            .query(&[
                ("api_key", self.api.api_key.as_str()),
                ("date", date_str.as_str()),
                // 视频日也返回缩略图地址
                ("thumbs", "true"),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Self::remote_error(&self.api.base_url, response).await);
        }

        let info: ApodInfo = response.json().await?;
        debug!("APOD metadata: {:?}", info);
        Ok(info)
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        info!("downloading image {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Self::remote_error(url, response).await);
        }

        let bytes = response.bytes().await?;
        debug!("downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
