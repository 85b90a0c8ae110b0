// ==========================================
// 名片导入系统 - 二维码载荷编解码
// ==========================================
// 编码: 固定顺序 Name / Email / Phone / Address，每个非空字段一行 "Key: Value"
// 解码: 按换行拆分，每行只在第一个冒号处切分，两侧去空白，
//       键大小写不敏感，重复键后者覆盖前者
// ==========================================

use crate::domain::card::{CardRecord, RawFieldBag, StoredCard};
use crate::domain::types::CardField;
use std::fmt;

/// 载荷字段及其固定顺序
pub const PAYLOAD_FIELDS: [CardField; 4] = [
    CardField::Name,
    CardField::Email,
    CardField::Phone,
    CardField::Address,
];

// ==========================================
// QrCardFields - 参与编码的名片公开字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrCardFields<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: Option<&'a str>,
}

impl QrCardFields<'_> {
    fn value(&self, field: CardField) -> Option<&str> {
        match field {
            CardField::Name => Some(self.name),
            CardField::Email => Some(self.email),
            CardField::Phone => Some(self.phone),
            CardField::Address => self.address,
            _ => None,
        }
    }
}

impl<'a> From<&'a CardRecord> for QrCardFields<'a> {
    fn from(record: &'a CardRecord) -> Self {
        Self {
            name: &record.name,
            email: &record.email,
            phone: &record.phone,
            address: Some(&record.address),
        }
    }
}

impl<'a> From<&'a StoredCard> for QrCardFields<'a> {
    fn from(card: &'a StoredCard) -> Self {
        Self {
            name: &card.name,
            email: &card.email,
            phone: &card.phone,
            address: card.address.as_deref(),
        }
    }
}

// ==========================================
// QrPayload - 编码结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    lines: Vec<(CardField, String)>,
}

impl QrPayload {
    /// 编码（确定性：同一输入总是得到同一文本）
    pub fn encode(fields: &QrCardFields<'_>) -> Self {
        let lines = PAYLOAD_FIELDS
            .iter()
            .filter_map(|field| {
                let value = single_line(fields.value(*field)?);
                (!value.is_empty()).then_some((*field, value))
            })
            .collect();

        Self { lines }
    }

    pub fn lines(&self) -> &[(CardField, String)] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {}", field.display_key(), value)?;
        }
        Ok(())
    }
}

/// 值内换行会破坏按行解码，折叠为空格
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ==========================================
// DecodedFieldMap - 解码结果
// ==========================================
// 同一字段的不同别名视为同一个键（如 BirthDate / Birth Date）
// 保留首次出现的位置与最后一次写入的键名/值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFieldMap {
    entries: Vec<(String, String)>,
}

impl DecodedFieldMap {
    pub fn parse(raw_text: &str) -> Self {
        let mut map = Self::default();

        for line in raw_text.split(['\r', '\n']) {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            map.insert(key, value.trim());
        }

        map
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| same_key(k, key)) {
            Some(entry) => *entry = (key.to_string(), value.to_string()),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// 大小写不敏感查找（识别别名）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| same_key(k, key))
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 转为字段包，交给校验器（未识别的键忽略）
    pub fn to_field_bag(&self) -> RawFieldBag {
        let mut bag = RawFieldBag::new(1);
        for (key, value) in &self.entries {
            if let Some(field) = CardField::from_key(key) {
                bag.set(field, value.clone());
            }
        }
        bag
    }
}

fn same_key(a: &str, b: &str) -> bool {
    match (CardField::from_key(a), CardField::from_key(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.eq_ignore_ascii_case(b),
    }
}
