// ==========================================
// 名片导入系统 - 名片领域模型
// ==========================================
// RawFieldBag  → 读取器产物（瞬时，校验后丢弃）
// CardRecord   → 校验通过的完整记录（可落库）
// ScannedCard  → 二维码解码路径的宽松记录
// StoredCard   → 持久化后的记录
// ImportOutcome → 导入调用的最终结果
// ==========================================

use crate::domain::types::{CardField, FileFormat, Gender};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// RawFieldBag - 原始字段包
// ==========================================
// 固定 7 个槽位，按 CardField 声明顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldBag {
    values: [Option<String>; CardField::COUNT],

    // 元信息
    pub row_number: usize, // 源文件中的数据行号/元素序号（从 1 开始）
}

impl RawFieldBag {
    pub fn new(row_number: usize) -> Self {
        Self {
            values: Default::default(),
            row_number,
        }
    }

    /// 写入字段；后写覆盖先写
    pub fn set(&mut self, field: CardField, value: impl Into<String>) {
        self.values[field.index()] = Some(value.into());
    }

    pub fn with(mut self, field: CardField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: CardField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// 按声明顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (CardField, Option<&str>)> + '_ {
        CardField::ALL
            .iter()
            .map(move |field| (*field, self.get(*field)))
    }

    /// 是否所有槽位都为空白
    pub fn is_blank(&self) -> bool {
        self.values
            .iter()
            .all(|v| v.as_deref().map(str::trim).unwrap_or("").is_empty())
    }
}

// ==========================================
// CardRecord - 校验通过的名片（ValidRecord）
// ==========================================
// 不变量: 除 image 外所有字段均存在且类型正确
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub image: Option<String>, // base64 文本
}

// ==========================================
// ScannedCard - 二维码恢复的名片
// ==========================================
// 不变量: name/email/phone 非空；其余字段缺失或无法解析时保持 None
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedCard {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

// ==========================================
// StoredCard - 持久化后的名片
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCard {
    pub id: i64,
    pub name: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
// 不变量: accepted.len() + skipped_count == 交给校验器的行数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub format: FileFormat,
    pub accepted: Vec<CardRecord>,
    pub skipped_count: usize,
    pub elapsed_time: Duration,
}

impl ImportOutcome {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// 交给校验器的总行数
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.skipped_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_bag_set_and_get() {
        let bag = RawFieldBag::new(3)
            .with(CardField::Name, "Alice")
            .with(CardField::Email, "a@x.com");

        assert_eq!(bag.get(CardField::Name), Some("Alice"));
        assert_eq!(bag.get(CardField::Phone), None);
        assert_eq!(bag.row_number, 3);
    }

    #[test]
    fn test_field_bag_iter_in_declared_order() {
        let bag = RawFieldBag::new(1).with(CardField::Image, "abc");
        let fields: Vec<CardField> = bag.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, CardField::ALL.to_vec());
    }

    #[test]
    fn test_field_bag_is_blank() {
        assert!(RawFieldBag::new(1).is_blank());
        assert!(RawFieldBag::new(1).with(CardField::Name, "   ").is_blank());
        assert!(!RawFieldBag::new(1).with(CardField::Name, "x").is_blank());
    }
}
