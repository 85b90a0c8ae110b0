// ==========================================
// 名片导入系统 - 统一响应信封
// ==========================================
// 形态: { is_success, message_en, message_ar, data }
// 每个接口操作都返回该信封（成功与失败同形）
// ==========================================

use crate::api::error::ApiError;
use crate::i18n::{t_in, LOCALE_AR, LOCALE_EN};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub is_success: bool,
    pub message_en: String,
    pub message_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 成功响应
    pub fn success(key: &str, args: &[(&str, String)], data: T) -> Self {
        let (message_en, message_ar) = bilingual(key, args);
        Self {
            is_success: true,
            message_en,
            message_ar,
            data: Some(data),
        }
    }

    /// 失败响应（无数据）
    pub fn failure(err: &ApiError) -> Self {
        let (key, args) = err.message_key();
        let (message_en, message_ar) = bilingual(key, &args);
        Self {
            is_success: false,
            message_en,
            message_ar,
            data: None,
        }
    }
}

fn bilingual(key: &str, args: &[(&str, String)]) -> (String, String) {
    let args: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
    (t_in(LOCALE_EN, key, &args), t_in(LOCALE_AR, key, &args))
}
