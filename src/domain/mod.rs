// ==========================================
// 名片导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod card;
pub mod types;

// 重导出核心类型
pub use card::{CardRecord, ImportOutcome, RawFieldBag, ScannedCard, StoredCard};
pub use types::{CardField, FileFormat, Gender, GenderPolicy};
