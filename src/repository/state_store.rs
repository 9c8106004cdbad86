// ==========================================
// 电商卖家库存决策支持系统 - 持久化状态存储
// ==========================================
// 职责: 不透明 key-value 存储（get/put/delete + 可选逐键过期）
// 存储: state_kv 表 (key, value, expires_at)
// 约定: 不假设事务保证；键缺失视为首跑
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// StateStore - 状态存储抽象
// ==========================================

/// 持久化状态存储接口
///
/// 幽灵登记表与上期指标快照经由该接口持久化；
/// 核心层只依赖该抽象，不感知底层实现。
pub trait StateStore {
    /// 读取键值；键不存在或已过期返回 None
    fn get(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 写入键值；ttl_seconds 为 None 表示永不过期
    fn put(&self, key: &str, value: &str, ttl_seconds: Option<i64>) -> RepositoryResult<()>;

    /// 删除键（键不存在视为成功）
    fn delete(&self, key: &str) -> RepositoryResult<()>;
}

// ==========================================
// SqliteStateStore - SQLite 实现
// ==========================================

/// SQLite 状态存储
///
/// 过期策略: 读取时惰性判断 expires_at，过期键即删即报缺失。
pub struct SqliteStateStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStateStore {
    /// 打开（或创建）状态库
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// 从已有连接创建（幂等地再次应用统一 PRAGMA）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS state_kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                expires_at INTEGER,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let row: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM state_kv WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, expires_at)) => {
                if let Some(exp) = expires_at {
                    if exp <= Utc::now().timestamp() {
                        // 惰性过期：删除后按缺失处理
                        conn.execute("DELETE FROM state_kv WHERE key = ?1", params![key])?;
                        return Ok(None);
                    }
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str, ttl_seconds: Option<i64>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let expires_at = ttl_seconds.map(|ttl| Utc::now().timestamp() + ttl);

        conn.execute(
            r#"
            INSERT OR REPLACE INTO state_kv (key, value, expires_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![key, value, expires_at, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM state_kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ==========================================
// MemoryStateStore - 内存实现（测试用）
// ==========================================

/// 内存状态存储
///
/// 测试与一次性演算使用；ttl 以写入时刻的时间戳判定。
#[derive(Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, (String, Option<i64>)>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        if let Some((value, expires_at)) = entries.get(key).cloned() {
            if let Some(exp) = expires_at {
                if exp <= Utc::now().timestamp() {
                    entries.remove(key);
                    return Ok(None);
                }
            }
            return Ok(Some(value));
        }
        Ok(None)
    }

    fn put(&self, key: &str, value: &str, ttl_seconds: Option<i64>) -> RepositoryResult<()> {
        let expires_at = ttl_seconds.map(|ttl| Utc::now().timestamp() + ttl);
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        entries.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn delete(&self, key: &str) -> RepositoryResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
