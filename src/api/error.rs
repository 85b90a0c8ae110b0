// ==========================================
// 名片导入系统 - API层错误类型
// ==========================================
// 职责: 汇总下层错误，统一提供面向用户的消息键
// ==========================================

use crate::importer::error::ImportError;
use crate::qr::error::QrError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Qr(#[from] QrError),

    #[error("数据库错误: {0}")]
    DatabaseError(String),
}

// ==========================================
// 从 RepositoryError 转换
// 用途: 打开数据库/建表阶段的失败
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl ApiError {
    /// 面向用户的消息键（locales/*.yml）及插值参数
    pub fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            ApiError::Import(err) => err.message_key(),
            ApiError::Qr(err) => err.message_key(),
            ApiError::DatabaseError(msg) => ("import.persistence", vec![("detail", msg.clone())]),
        }
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
