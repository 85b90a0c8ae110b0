// ==========================================
// 名片导入系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行及上层服务调用
// ==========================================

pub mod card_api;
pub mod error;
pub mod response;

// 重导出核心类型
pub use card_api::{CardApi, ImportSummary};
pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
