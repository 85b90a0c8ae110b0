// ==========================================
// 名片导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 只有整文件级失败才是错误；单行问题以 Skip 返回
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型（终止性错误）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 输入相关错误 =====
    #[error("文件为空")]
    EmptyInput,

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.csv/.xml）")]
    UnsupportedFormat(String),

    // ===== Excel 相关错误 =====
    #[error("不是有效的 Excel .xlsx 文件（文件签名不匹配）")]
    NotAValidContainer,

    #[error("Excel 文件无工作表")]
    NoWorksheet,

    #[error("文件中没有数据行")]
    NoDataFound,

    #[error("文件已损坏: {0}")]
    CorruptFile(String),

    // ===== XML 相关错误 =====
    #[error("XML 文件为空")]
    EmptyDocument,

    #[error("XML 格式错误: {0}")]
    MalformedMarkup(String),

    // ===== 汇总错误 =====
    #[error("文件中没有有效记录（跳过 {skipped} 行）")]
    NoValidRecords { skipped: usize },

    #[error("批量写入失败: {0}")]
    Persistence(String),

    // ===== 配置错误 =====
    #[error("配置值格式错误 (key: {key}): {message}")]
    Config { key: String, message: String },
}

impl ImportError {
    /// 面向用户的消息键（locales/*.yml）及插值参数
    ///
    /// “没有可导入内容 / 文件不可读 / 部分行被拒绝”必须可区分
    pub fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            ImportError::EmptyInput => ("import.empty_input", vec![]),
            ImportError::UnsupportedFormat(ext) => {
                ("import.unsupported_format", vec![("ext", ext.clone())])
            }
            ImportError::NotAValidContainer => ("import.not_a_valid_container", vec![]),
            ImportError::NoWorksheet => ("import.no_worksheet", vec![]),
            ImportError::NoDataFound => ("import.no_data_found", vec![]),
            ImportError::CorruptFile(msg) => ("import.corrupt_file", vec![("detail", msg.clone())]),
            ImportError::EmptyDocument => ("import.empty_document", vec![]),
            ImportError::MalformedMarkup(msg) => {
                ("import.malformed_markup", vec![("detail", msg.clone())])
            }
            ImportError::NoValidRecords { skipped } => {
                ("import.no_valid_records", vec![("skipped", skipped.to_string())])
            }
            ImportError::Persistence(msg) => ("import.persistence", vec![("detail", msg.clone())]),
            ImportError::Config { key, message } => (
                "import.config",
                vec![("key", key.clone()), ("detail", message.clone())],
            ),
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CorruptFile(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::CorruptFile(err.to_string())
    }
}

// 实现 From<roxmltree::Error>
impl From<roxmltree::Error> for ImportError {
    fn from(err: roxmltree::Error) -> Self {
        ImportError::MalformedMarkup(err.to_string())
    }
}

// 实现 From<RepositoryError>
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        ImportError::Persistence(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
