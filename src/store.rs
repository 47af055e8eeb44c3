// store.rs — 图片文件落盘
// 内容哈希、文件名推导以及同名不同内容时的避让策略

use crate::error::Result;
use chrono::NaiveDate;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// 无法从 URL 中取出文件名时使用的默认名
const FALLBACK_FILENAME: &str = "apod.jpg";

/// 同名冲突时追加到文件名后的哈希前缀长度
const HASH_SUFFIX_LEN: usize = 12;

/// 本地文件命名方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    /// 使用 URL 最后一段
    #[default]
    Url,
    /// 以日期为前缀：2022-03-11-foo.jpg
    Date,
    /// 以内容哈希命名：<sha256>.jpg
    Hash,
}

impl std::str::FromStr for FileNaming {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(Self::Url),
            "date" => Ok(Self::Date),
            "hash" => Ok(Self::Hash),
            other => Err(format!("unknown naming '{other}' (expected url, date or hash)")),
        }
    }
}

impl std::fmt::Display for FileNaming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Url => "url",
            Self::Date => "date",
            Self::Hash => "hash",
        };
        f.write_str(name)
    }
}

/// 计算图片字节的 SHA-256，返回 64 位小写十六进制字符串
///
/// 去重依据是内容本身，URL 不是稳定的内容标识
pub fn content_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// 取 URL 路径的最后一段作为文件名，忽略查询参数和锚点
///
/// `https://example.com/img/foo.jpg?x=1` -> `foo.jpg`
pub fn filename_from_url(url: &str) -> String {
    let name = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        // 不是完整 URL 时按路径处理
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    name.filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// 拆分文件名为 (stem, 带点的扩展名)
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// 确定图片的本地保存路径
///
/// 按 `naming` 生成文件名。目标位置已有内容不同的文件时依次改用
/// `<stem>-<哈希前缀><ext>`、`<stem>-<完整哈希><ext>`，任何模式下都不覆盖已有文件。
/// 已有文件内容相同时直接复用该路径。
pub async fn resolve_image_path(
    dir: &Path,
    url: &str,
    date: NaiveDate,
    hash: &str,
    naming: FileNaming,
) -> Result<PathBuf> {
    let filename = filename_from_url(url);
    let preferred = match naming {
        FileNaming::Url => filename,
        FileNaming::Date => format!("{}-{}", date.format("%Y-%m-%d"), filename),
        FileNaming::Hash => format!("{hash}{}", split_extension(&filename).1),
    };

    let (stem, ext) = split_extension(&preferred);
    let short = &hash[..HASH_SUFFIX_LEN.min(hash.len())];
    let candidates = [
        preferred.clone(),
        format!("{stem}-{short}{ext}"),
        format!("{stem}-{hash}{ext}"),
    ];

    for name in &candidates {
        let path = dir.join(name);
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(path),
            Err(e) => return Err(e.into()),
        };
        if meta.is_file() && file_sha256(&path).await? == hash {
            return Ok(path);
        }
        warn!("{} already holds different content", path.display());
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {preferred} in {}", dir.display()),
    )
    .into())
}

/// 计算已有文件的内容哈希
async fn file_sha256(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(content_sha256(&bytes))
}

/// 将图片字节写入磁盘，文件已存在时覆盖
pub async fn save_image_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
