// ==========================================
// 名片导入系统 - 领域类型定义
// ==========================================
// 职责: 语义字段名 / 性别枚举 / 文件格式 / 性别解析策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 语义字段 (Card Field)
// ==========================================
// 所有格式读取器都归一到这 7 个字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Name,
    Gender,
    Email,
    Phone,
    BirthDate,
    Address,
    Image,
}

impl CardField {
    /// 字段总数（RawFieldBag 的槽位数）
    pub const COUNT: usize = 7;

    /// 声明顺序
    pub const ALL: [CardField; CardField::COUNT] = [
        CardField::Name,
        CardField::Gender,
        CardField::Email,
        CardField::Phone,
        CardField::BirthDate,
        CardField::Address,
        CardField::Image,
    ];

    /// 槽位下标
    pub fn index(self) -> usize {
        match self {
            CardField::Name => 0,
            CardField::Gender => 1,
            CardField::Email => 2,
            CardField::Phone => 3,
            CardField::BirthDate => 4,
            CardField::Address => 5,
            CardField::Image => 6,
        }
    }

    /// 规范名（snake_case，用于配置与日志）
    pub fn as_str(self) -> &'static str {
        match self {
            CardField::Name => "name",
            CardField::Gender => "gender",
            CardField::Email => "email",
            CardField::Phone => "phone",
            CardField::BirthDate => "birth_date",
            CardField::Address => "address",
            CardField::Image => "image",
        }
    }

    /// 二维码载荷 / XML 元素中使用的展示键名
    pub fn display_key(self) -> &'static str {
        match self {
            CardField::Name => "Name",
            CardField::Gender => "Gender",
            CardField::Email => "Email",
            CardField::Phone => "Phone",
            CardField::BirthDate => "BirthDate",
            CardField::Address => "Address",
            CardField::Image => "ImageBase64",
        }
    }

    /// 按别名识别字段（大小写不敏感，忽略空格/下划线/连字符）
    ///
    /// 例: "birthDate" / "birth_date" / "Birth Date" → BirthDate
    pub fn from_key(key: &str) -> Option<CardField> {
        let folded: String = key
            .trim()
            .trim_start_matches('\u{feff}')
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "name" => Some(CardField::Name),
            "gender" => Some(CardField::Gender),
            "email" => Some(CardField::Email),
            "phone" => Some(CardField::Phone),
            "birthdate" => Some(CardField::BirthDate),
            "address" => Some(CardField::Address),
            "image" | "imagebase64" => Some(CardField::Image),
            _ => None,
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardField::from_key(s).ok_or_else(|| format!("未知字段: {}", s))
    }
}

// ==========================================
// 性别 (Gender)
// ==========================================
// 默认值 Male 与历史数据保持一致（枚举首项）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    /// 大小写不敏感
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("无法识别的性别: {}", other)),
        }
    }
}

// ==========================================
// 性别解析策略 (Gender Policy)
// ==========================================
// Lenient: 非空但无法识别 → 取默认值（兼容历史行为）
// Strict:  非空但无法识别 → 整行跳过
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderPolicy {
    #[default]
    Lenient,
    Strict,
}

impl fmt::Display for GenderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderPolicy::Lenient => write!(f, "LENIENT"),
            GenderPolicy::Strict => write!(f, "STRICT"),
        }
    }
}

impl FromStr for GenderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LENIENT" => Ok(GenderPolicy::Lenient),
            "STRICT" => Ok(GenderPolicy::Strict),
            other => Err(format!("未知的性别策略: {}", other)),
        }
    }
}

// ==========================================
// 文件格式 (File Format)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Spreadsheet, // .xlsx
    Delimited,   // .csv
    Markup,      // .xml
}

impl FileFormat {
    /// 从文件名或裸扩展名识别格式（大小写不敏感）
    ///
    /// 接受 "cards.XLSX" / ".csv" / "xml"；其余返回 None
    pub fn detect(file_name: &str) -> Option<FileFormat> {
        let trimmed = file_name.trim();
        let ext = match trimmed.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => trimmed,
        };

        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(FileFormat::Spreadsheet),
            "csv" => Some(FileFormat::Delimited),
            "xml" => Some(FileFormat::Markup),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Spreadsheet => "xlsx",
            FileFormat::Delimited => "csv",
            FileFormat::Markup => "xml",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_field_aliases() {
        assert_eq!(CardField::from_key("birthDate"), Some(CardField::BirthDate));
        assert_eq!(CardField::from_key("Birth Date"), Some(CardField::BirthDate));
        assert_eq!(CardField::from_key("birth_date"), Some(CardField::BirthDate));
        assert_eq!(CardField::from_key("ImageBase64"), Some(CardField::Image));
        assert_eq!(CardField::from_key("\u{feff}name"), Some(CardField::Name));
        assert_eq!(CardField::from_key("City"), None);
    }

    #[test]
    fn test_card_field_index_matches_order() {
        for (i, field) in CardField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_gender_case_insensitive() {
        assert_eq!("female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(" MALE ".parse::<Gender>(), Ok(Gender::Male));
        assert!("other".parse::<Gender>().is_err());
        assert_eq!(Gender::default(), Gender::Male);
    }

    #[test]
    fn test_file_format_detect() {
        assert_eq!(FileFormat::detect("cards.XLSX"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::detect(".csv"), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::detect("xml"), Some(FileFormat::Markup));
        assert_eq!(FileFormat::detect("cards.xls"), None);
        assert_eq!(FileFormat::detect("cards.json"), None);
    }
}
