// ==========================================
// 名片导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 规则: 缺失键回落默认值；存在但格式错误 → ImportError::Config
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_QR_MARGIN_MODULES, DEFAULT_QR_SIZE_PX, QR_MARGIN_MODULES_RANGE,
    QR_SIZE_PX_RANGE,
};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::types::{CardField, GenderPolicy};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{SourceSchema, DEFAULT_RECORD_ELEMENT, DEFAULT_SPREADSHEET_COLUMNS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取配置并解析；缺失时返回 None
    fn read_parsed<T, F>(&self, key: &str, parse: F) -> ImportResult<Option<T>>
    where
        F: FnOnce(&str) -> Result<T, String>,
    {
        match self.get_global_config_value(key)? {
            None => Ok(None),
            Some(raw) => parse(raw.trim()).map(Some).map_err(|message| {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误");
                ImportError::Config {
                    key: key.to_string(),
                    message,
                }
            }),
        }
    }

    fn read_u32(&self, key: &str, default: u32, range: RangeInclusive<u32>) -> ImportResult<u32> {
        let value = self.read_parsed(key, |raw| {
            let v = u32::from_str(raw).map_err(|e| format!("无法解析为整数: {}", e))?;
            if !range.contains(&v) {
                return Err(format!("取值须在 {} 到 {} 之间", range.start(), range.end()));
            }
            Ok(v)
        })?;
        Ok(value.unwrap_or(default))
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_spreadsheet_columns(&self) -> ImportResult<Vec<CardField>> {
        match self.get_global_config_value(config_keys::SPREADSHEET_COLUMNS)? {
            Some(raw) => SourceSchema::parse_columns(config_keys::SPREADSHEET_COLUMNS, &raw),
            None => Ok(DEFAULT_SPREADSHEET_COLUMNS.to_vec()),
        }
    }

    async fn get_markup_record_element(&self) -> ImportResult<String> {
        let value = self.read_parsed(config_keys::MARKUP_RECORD_ELEMENT, |raw| {
            if raw.is_empty() || raw.contains(char::is_whitespace) {
                Err("记录元素名不能为空或包含空白".to_string())
            } else {
                Ok(raw.to_string())
            }
        })?;
        Ok(value.unwrap_or_else(|| DEFAULT_RECORD_ELEMENT.to_string()))
    }

    async fn get_gender_policy(&self) -> ImportResult<GenderPolicy> {
        let value = self.read_parsed(config_keys::GENDER_POLICY, GenderPolicy::from_str)?;
        Ok(value.unwrap_or_default())
    }

    async fn get_qr_size_px(&self) -> ImportResult<u32> {
        self.read_u32(config_keys::QR_SIZE_PX, DEFAULT_QR_SIZE_PX, QR_SIZE_PX_RANGE)
    }

    async fn get_qr_margin_modules(&self) -> ImportResult<u32> {
        self.read_u32(
            config_keys::QR_MARGIN_MODULES,
            DEFAULT_QR_MARGIN_MODULES,
            QR_MARGIN_MODULES_RANGE,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 源映射
    pub const SPREADSHEET_COLUMNS: &str = "import.xlsx.columns";
    pub const MARKUP_RECORD_ELEMENT: &str = "import.xml.record_element";

    // 校验
    pub const GENDER_POLICY: &str = "import.gender_policy";

    // 二维码
    pub const QR_SIZE_PX: &str = "qr.size_px";
    pub const QR_MARGIN_MODULES: &str = "qr.margin_modules";
}
