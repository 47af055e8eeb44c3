// schema.rs — 缓存数据库表结构
// 只有一张表，不做版本迁移：每次启动执行 CREATE ... IF NOT EXISTS 即可

use crate::error::Result;
use log::debug;
use rusqlite::Connection;

/// 数据库文件名，位于图片目录下
pub const DB_FILENAME: &str = "apod_images.db";

/// 创建表和索引（幂等）
///
/// image_sha256 上的唯一索引保证同一内容只有一行记录
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS apod_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image_path TEXT NOT NULL,
            image_url TEXT NOT NULL,
            image_size INTEGER NOT NULL,
            image_sha256 TEXT NOT NULL,
            apod_date TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_apod_images_sha256 ON apod_images(image_sha256);
        "#,
    )?;

    debug!("cache schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='apod_images'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn duplicate_hash_is_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let insert = "INSERT INTO apod_images (image_path, image_url, image_size, image_sha256)
                      VALUES ('/a.jpg', 'https://x/a.jpg', 1, 'abc')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
