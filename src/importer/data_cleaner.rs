// ==========================================
// 名片导入系统 - 字段清洗器（Field Normalizer）
// ==========================================
// 职责: TRIM / NULL 标准化 / 类型转换
// 说明: 清洗结果分三态，缺失与无法解析分开表达
// ==========================================

use crate::domain::types::Gender;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 清洗后的字段值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized<T> {
    /// 缺失或空白
    Absent,
    /// 清洗并转换成功
    Value(T),
    /// 非空但无法转换（保留原文用于日志）
    Invalid(String),
}

// 日期格式（按优先级尝试，与区域设置无关）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

pub struct DataCleaner;

impl DataCleaner {
    /// 标准化 NULL 值（空字符串/空白 → None），并 TRIM
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 解析出生日期（宽松语法）
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
                return Some(date);
            }
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt.date());
            }
        }

        // 带时区偏移的 ISO 8601（取本地日期部分）
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    }

    /// 清洗日期字段
    pub fn normalize_date(&self, value: Option<&str>) -> Normalized<NaiveDate> {
        match self.normalize_null(value) {
            None => Normalized::Absent,
            Some(v) => match self.parse_date(&v) {
                Some(date) => Normalized::Value(date),
                None => Normalized::Invalid(v),
            },
        }
    }

    /// 清洗性别字段（大小写不敏感）
    pub fn normalize_gender(&self, value: Option<&str>) -> Normalized<Gender> {
        match self.normalize_null(value) {
            None => Normalized::Absent,
            Some(v) => match v.parse::<Gender>() {
                Ok(gender) => Normalized::Value(gender),
                Err(_) => Normalized::Invalid(v),
            },
        }
    }
}
