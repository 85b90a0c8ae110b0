// ==========================================
// 名片导入系统 - 名片 Repository 实现
// ==========================================
// 职责: 实现名片数据访问（使用 rusqlite）
// 红线: Repository 不含校验规则，只做数据 CRUD
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::card::{CardRecord, ScannedCard, StoredCard};
use crate::domain::types::Gender;
use crate::repository::card_repo::CardRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CardRepositoryImpl
// ==========================================
pub struct CardRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CardRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
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

    /// 从已有连接创建（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_stored_card(row: &Row) -> rusqlite::Result<StoredCard> {
        let gender: Option<String> = row.get(2)?;
        let birth_date: Option<String> = row.get(3)?;
        let created_at: String = row.get(8)?;

        Ok(StoredCard {
            id: row.get(0)?,
            name: row.get(1)?,
            gender: gender.and_then(|g| g.parse::<Gender>().ok()),
            birth_date: birth_date
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            email: row.get(4)?,
            phone: row.get(5)?,
            address: row.get(6)?,
            image: row.get(7)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl CardRepository for CardRepositoryImpl {
    /// 批量插入名片（事务化）
    async fn bulk_insert(&self, cards: &[CardRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let created_at = Utc::now().to_rfc3339();
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO business_card (
                    name, gender, birth_date, email, phone, address, image_base64, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;

            for card in cards {
                stmt.execute(params![
                    card.name,
                    card.gender.as_str(),
                    card.birth_date.to_string(),
                    card.email,
                    card.phone,
                    card.address,
                    card.image,
                    created_at,
                ])?;
                count += 1;
            }
        }

        // 任一行失败时 tx 在此之前被 drop，自动回滚
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn insert_scanned(&self, card: &ScannedCard) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO business_card (
                name, gender, birth_date, email, phone, address, image_base64, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)
            "#,
            params![
                card.name,
                card.gender.map(|g| g.as_str()),
                card.birth_date.map(|d| d.to_string()),
                card.email,
                card.phone,
                card.address,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StoredCard>> {
        let conn = self.get_conn()?;

        let card = conn
            .query_row(
                r#"
                SELECT id, name, gender, birth_date, email, phone, address,
                       image_base64, created_at
                FROM business_card
                WHERE id = ?1
                "#,
                params![id],
                Self::map_stored_card,
            )
            .optional()?;

        Ok(card)
    }

    async fn count_cards(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM business_card", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, CardRepositoryImpl) {
        let temp_file = NamedTempFile::new().unwrap();
        let repo = CardRepositoryImpl::new(temp_file.path().to_str().unwrap()).unwrap();
        (temp_file, repo)
    }

    fn card(name: &str) -> CardRecord {
        CardRecord {
            name: name.to_string(),
            gender: Gender::Female,
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "111".to_string(),
            address: "Addr".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_bulk_insert_and_find() {
        let (_temp, repo) = setup();

        let inserted = repo.bulk_insert(&[card("Alice"), card("Bob")]).await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(repo.count_cards().await.unwrap(), 2);

        let stored = repo.find_by_id(1).await.unwrap().expect("card 1 should exist");
        assert_eq!(stored.name, "Alice");
        assert_eq!(stored.gender, Some(Gender::Female));
        assert_eq!(stored.birth_date, NaiveDate::from_ymd_opt(1990, 1, 1));
        assert_eq!(stored.address.as_deref(), Some("Addr"));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let (_temp, repo) = setup();
        assert!(repo.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_scanned_keeps_optional_fields_unset() {
        let (_temp, repo) = setup();
        let id = repo
            .insert_scanned(&ScannedCard {
                name: "X".to_string(),
                email: "x@x.com".to_string(),
                phone: "1".to_string(),
                address: None,
                birth_date: None,
                gender: None,
            })
            .await
            .unwrap();

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "X");
        assert_eq!(stored.address, None);
        assert_eq!(stored.birth_date, None);
        assert_eq!(stored.gender, None);
    }
}
