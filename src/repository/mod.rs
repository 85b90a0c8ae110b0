// ==========================================
// 名片导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含校验规则
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod card_repo;
pub mod card_repo_impl;
pub mod error;

// 重导出核心仓储
pub use card_repo::CardRepository;
pub use card_repo_impl::CardRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
