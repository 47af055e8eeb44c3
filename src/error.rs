// error.rs — 统一错误类型
// 每一种错误对本次运行都是致命的：main 打印后以非零状态退出

use thiserror::Error;

/// 程序中所有可能出现的错误
#[derive(Error, Debug)]
pub enum ApodError {
    /// 命令行参数不合法（目录不存在、日期格式错误等）
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 远端返回了非 200 状态码
    ///
    /// `url` 只包含不带查询参数的地址，避免把 API Key 打印出来
    #[error("request to {url} failed with HTTP {status}{}", detail(.message))]
    RemoteFetch {
        url: String,
        status: u16,
        message: Option<String>,
    },

    /// 网络层错误（连接失败、超时、JSON 解码失败）
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 数据库错误
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// 文件读写错误
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// 当天的 APOD 不是图片，且没有可用的缩略图
    #[error("media type '{0}' cannot be used as a wallpaper")]
    UnsupportedMedia(String),

    /// 配置文件读写或配置项错误
    #[error("config error: {0}")]
    Config(String),

    /// 设置系统壁纸失败
    #[error("failed to set wallpaper: {0}")]
    Wallpaper(String),
}

pub type Result<T> = std::result::Result<T, ApodError>;

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}
