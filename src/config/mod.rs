// ==========================================
// 名片导入系统 - 配置层
// ==========================================
// 职责: 导入/二维码配置管理,数据库覆写 + 默认值兜底
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::{ImportConfigReader, ImportSettings};
