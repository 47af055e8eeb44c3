// cache/mod.rs — 本地图片缓存
// 记录每张已下载图片的路径、来源、大小与内容哈希，按哈希去重

pub mod schema;

use crate::error::Result;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};

pub use schema::DB_FILENAME;

/// 一条缓存记录，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    /// 图片的本地完整路径
    pub local_path: PathBuf,
    /// 图片的下载地址
    pub source_url: String,
    /// 字节数
    pub size_bytes: u64,
    /// SHA-256，十六进制
    pub content_hash: String,
    /// 对应的 APOD 日期（YYYY-MM-DD）
    pub apod_date: Option<String>,
}

impl CachedImage {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let path: String = row.get(0)?;
        let size: i64 = row.get(2)?;
        Ok(Self {
            local_path: PathBuf::from(path),
            source_url: row.get(1)?,
            size_bytes: u64::try_from(size)
                .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(2, size))?,
            content_hash: row.get(3)?,
            apod_date: row.get(4)?,
        })
    }
}

/// 缓存数据库
pub struct ImageCache {
    conn: Connection,
}

impl ImageCache {
    /// 打开图片目录下的缓存数据库，不存在则创建
    ///
    /// 每次运行都可以安全调用
    pub fn open_in_dir(dir: &Path) -> Result<Self> {
        Self::open(&dir.join(DB_FILENAME))
    }

    /// 打开指定路径的数据库并确保表结构存在
    pub fn open(path: &Path) -> Result<Self> {
        info!("opening image cache at {}", path.display());
        let conn = Connection::open(path)?;
        schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// 内存数据库
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// 是否已有相同内容哈希的记录
    pub fn image_already_cached(&self, hash: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM apod_images WHERE image_sha256 = ?1)",
            [hash],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// 按内容哈希查找记录
    pub fn find_by_hash(&self, hash: &str) -> Result<Option<CachedImage>> {
        let image = self
            .conn
            .query_row(
                r#"
                SELECT image_path, image_url, image_size, image_sha256, apod_date
                FROM apod_images WHERE image_sha256 = ?1
                "#,
                [hash],
                CachedImage::from_row,
            )
            .optional()?;
        Ok(image)
    }

    /// 插入一条记录；哈希重复时返回 Storage 错误
    pub fn record_image(&self, image: &CachedImage) -> Result<()> {
        let size = i64::try_from(image.size_bytes)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            r#"
            INSERT INTO apod_images (image_path, image_url, image_size, image_sha256, apod_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                image.local_path.to_string_lossy().into_owned(),
                image.source_url,
                size,
                image.content_hash,
                image.apod_date,
            ],
        )?;
        debug!("recorded {} ({})", image.local_path.display(), image.content_hash);
        Ok(())
    }

    /// 列出所有记录，最新的在前
    pub fn list_images(&self) -> Result<Vec<CachedImage>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT image_path, image_url, image_size, image_sha256, apod_date
            FROM apod_images ORDER BY id DESC
            "#,
        )?;
        let images = stmt
            .query_map([], CachedImage::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApodError;

    fn sample(hash: &str, name: &str) -> CachedImage {
        CachedImage {
            local_path: PathBuf::from(format!("/tmp/apod/{name}")),
            source_url: format!("https://example.com/img/{name}"),
            size_bytes: 5,
            content_hash: hash.to_string(),
            apod_date: Some("2022-03-11".to_string()),
        }
    }

    #[test]
    fn record_then_lookup() {
        let cache = ImageCache::open_in_memory().unwrap();
        assert!(!cache.image_already_cached("abc").unwrap());

        let image = sample("abc", "foo.jpg");
        cache.record_image(&image).unwrap();

        assert!(cache.image_already_cached("abc").unwrap());
        assert_eq!(cache.find_by_hash("abc").unwrap(), Some(image));
        assert_eq!(cache.find_by_hash("def").unwrap(), None);
    }

    #[test]
    fn duplicate_hash_is_a_storage_error() {
        let cache = ImageCache::open_in_memory().unwrap();
        cache.record_image(&sample("abc", "foo.jpg")).unwrap();

        let err = cache.record_image(&sample("abc", "bar.jpg")).unwrap_err();
        assert!(matches!(err, ApodError::Storage(_)));
        assert_eq!(cache.list_images().unwrap().len(), 1);
    }

    #[test]
    fn list_returns_newest_first() {
        let cache = ImageCache::open_in_memory().unwrap();
        cache.record_image(&sample("one", "a.jpg")).unwrap();
        cache.record_image(&sample("two", "b.jpg")).unwrap();

        let hashes: Vec<_> = cache
            .list_images()
            .unwrap()
            .into_iter()
            .map(|i| i.content_hash)
            .collect();
        assert_eq!(hashes, ["two", "one"]);
    }

    #[test]
    fn oversized_length_is_rejected_not_clamped() {
        let cache = ImageCache::open_in_memory().unwrap();
        let mut image = sample("abc", "foo.jpg");
        image.size_bytes = u64::MAX;

        let err = cache.record_image(&image).unwrap_err();
        assert!(matches!(err, ApodError::Storage(_)));
        assert!(!cache.image_already_cached("abc").unwrap());
    }

    #[test]
    fn negative_stored_size_is_a_storage_error() {
        let cache = ImageCache::open_in_memory().unwrap();
        cache
            .conn
            .execute(
                "INSERT INTO apod_images (image_path, image_url, image_size, image_sha256) VALUES (?1, ?2, ?3, ?4)",
                params!["/tmp/apod/foo.jpg", "https://example.com/img/foo.jpg", -1i64, "abc"],
            )
            .unwrap();

        assert!(matches!(cache.list_images(), Err(ApodError::Storage(_))));
        assert!(matches!(cache.find_by_hash("abc"), Err(ApodError::Storage(_))));
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = ImageCache::open_in_dir(dir.path()).unwrap();
            cache.record_image(&sample("abc", "foo.jpg")).unwrap();
        }
        assert!(dir.path().join(DB_FILENAME).is_file());

        let cache = ImageCache::open_in_dir(dir.path()).unwrap();
        assert!(cache.image_already_cached("abc").unwrap());
    }
}
