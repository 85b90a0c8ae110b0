// ==========================================
// 名片导入系统 - 二维码模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 解码失败只终止本次扫码，不影响进行中的批量导入
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 二维码模块错误类型
#[derive(Error, Debug)]
pub enum QrError {
    // ===== 输入相关错误 =====
    #[error("未提供二维码图片")]
    ImageMissing,

    #[error("图片中未识别到二维码")]
    NotDecodable,

    #[error("图片无法解码: {0}")]
    InvalidImage(String),

    #[error("二维码生成失败: {0}")]
    Render(String),

    // ===== 内容相关错误 =====
    #[error("二维码缺少必填字段 {missing:?}（已识别: {found:?}）")]
    MissingRequiredFields {
        found: Vec<String>,
        missing: Vec<String>,
        raw_text: String,
    },

    #[error("名片不存在: id={0}")]
    CardNotFound(i64),

    // ===== 下游错误 =====
    #[error("名片写入失败: {0}")]
    Persistence(String),

    #[error("配置值格式错误 (key: {key}): {message}")]
    Config { key: String, message: String },
}

impl QrError {
    /// 面向用户的消息键（locales/*.yml）及插值参数
    pub fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            QrError::ImageMissing => ("qr.image_missing", vec![]),
            QrError::NotDecodable => ("qr.not_decodable", vec![]),
            QrError::InvalidImage(msg) => ("qr.invalid_image", vec![("detail", msg.clone())]),
            QrError::Render(msg) => ("qr.render", vec![("detail", msg.clone())]),
            QrError::MissingRequiredFields {
                found,
                missing,
                raw_text,
            } => (
                "qr.missing_required_fields",
                vec![
                    ("found", found.join(", ")),
                    ("missing", missing.join(", ")),
                    ("raw_text", raw_text.clone()),
                ],
            ),
            QrError::CardNotFound(id) => ("qr.card_not_found", vec![("id", id.to_string())]),
            QrError::Persistence(msg) => ("qr.persistence", vec![("detail", msg.clone())]),
            QrError::Config { key, message } => (
                "qr.config",
                vec![("key", key.clone()), ("detail", message.clone())],
            ),
        }
    }
}

// 实现 From<RepositoryError>
impl From<RepositoryError> for QrError {
    fn from(err: RepositoryError) -> Self {
        QrError::Persistence(err.to_string())
    }
}

// 配置读取复用导入模块的配置接口
impl From<ImportError> for QrError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Config { key, message } => QrError::Config { key, message },
            other => QrError::Persistence(other.to_string()),
        }
    }
}

// 实现 From<image::ImageError>
impl From<image::ImageError> for QrError {
    fn from(err: image::ImageError) -> Self {
        QrError::InvalidImage(err.to_string())
    }
}

/// Result 类型别名
pub type QrResult<T> = Result<T, QrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_args() {
        let err = QrError::MissingRequiredFields {
            found: vec!["Name".to_string(), "City".to_string()],
            missing: vec!["email".to_string(), "phone".to_string()],
            raw_text: "Name: X\nCity: Z".to_string(),
        };

        let (key, args) = err.message_key();
        assert_eq!(key, "qr.missing_required_fields");
        assert_eq!(args[0], ("found", "Name, City".to_string()));
        assert_eq!(args[1], ("missing", "email, phone".to_string()));
        assert_eq!(args[2].1, "Name: X\nCity: Z");
    }

    #[test]
    fn test_import_config_error_keeps_key() {
        let err: QrError = ImportError::Config {
            key: "qr.size_px".to_string(),
            message: "bad".to_string(),
        }
        .into();
        assert!(matches!(err, QrError::Config { key, .. } if key == "qr.size_px"));
    }
}
