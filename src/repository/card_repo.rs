// ==========================================
// 名片导入系统 - 名片 Repository Trait
// ==========================================
// 职责: 定义名片数据访问接口（不包含业务逻辑）
// 红线: Repository 不含校验规则，只做数据 CRUD
// ==========================================

use crate::domain::card::{CardRecord, ScannedCard, StoredCard};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CardRepository Trait
// ==========================================
// 用途: 名片持久化
// 实现者: CardRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// 批量插入名片（单事务）
    ///
    /// # 返回
    /// - Ok(usize): 插入的记录数
    /// - Err: 数据库错误（整个事务回滚，不会部分写入）
    async fn bulk_insert(&self, cards: &[CardRecord]) -> RepositoryResult<usize>;

    /// 插入二维码恢复的名片
    ///
    /// # 返回
    /// - Ok(i64): 新记录 ID
    async fn insert_scanned(&self, card: &ScannedCard) -> RepositoryResult<i64>;

    /// 按 ID 查询
    ///
    /// # 返回
    /// - Ok(Some(card)): 找到
    /// - Ok(None): 不存在
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StoredCard>>;

    /// 统计名片数量
    async fn count_cards(&self) -> RepositoryResult<usize>;
}
