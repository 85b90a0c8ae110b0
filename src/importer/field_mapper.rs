// ==========================================
// 名片导入系统 - 字段映射描述（Source Schema）
// ==========================================
// 职责: 源列/元素 → 语义字段的映射声明
// 说明: 同一格式在不同来源版本中列顺序不一致，
//       映射在构造读取器时从配置解析，不在读取器中写死
// ==========================================

use crate::domain::types::{CardField, FileFormat};
use crate::importer::error::{ImportError, ImportResult};

/// 历史版本的 Excel 列顺序
pub const DEFAULT_SPREADSHEET_COLUMNS: [CardField; CardField::COUNT] = [
    CardField::Name,
    CardField::Gender,
    CardField::Email,
    CardField::Phone,
    CardField::BirthDate,
    CardField::Address,
    CardField::Image,
];

/// XML 默认记录元素名
pub const DEFAULT_RECORD_ELEMENT: &str = "Card";

// ==========================================
// SourceSchema - 按格式打标签的映射描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSchema {
    /// 按位置映射（Excel）：第 i 列 → columns[i]
    Positional { columns: Vec<CardField> },

    /// 按表头映射（CSV）：表头名大小写不敏感，经 CardField::from_key 识别
    Headed,

    /// 按元素名映射（XML）：record_element 下的子元素名 → 字段
    Tagged {
        record_element: String,
        elements: Vec<(CardField, String)>,
    },
}

impl SourceSchema {
    /// 默认映射
    pub fn default_for(format: FileFormat) -> SourceSchema {
        match format {
            FileFormat::Spreadsheet => SourceSchema::Positional {
                columns: DEFAULT_SPREADSHEET_COLUMNS.to_vec(),
            },
            FileFormat::Delimited => SourceSchema::Headed,
            FileFormat::Markup => SourceSchema::tagged(DEFAULT_RECORD_ELEMENT),
        }
    }

    /// 按记录元素名构造 XML 映射（子元素使用展示键名）
    pub fn tagged(record_element: &str) -> SourceSchema {
        SourceSchema::Tagged {
            record_element: record_element.to_string(),
            elements: CardField::ALL
                .iter()
                .map(|f| (*f, f.display_key().to_string()))
                .collect(),
        }
    }

    /// 解析列顺序配置（如 "name,email,phone,gender,address,birth_date"）
    ///
    /// # 规则
    /// - 逗号分隔，字段名经 CardField::from_key 识别
    /// - 不允许未知字段、重复字段或空列表
    pub fn parse_columns(key: &str, raw: &str) -> ImportResult<Vec<CardField>> {
        let mut columns = Vec::new();
        for part in raw.split(',') {
            let field = CardField::from_key(part).ok_or_else(|| ImportError::Config {
                key: key.to_string(),
                message: format!("未知字段: {}", part.trim()),
            })?;
            if columns.contains(&field) {
                return Err(ImportError::Config {
                    key: key.to_string(),
                    message: format!("重复字段: {}", field),
                });
            }
            columns.push(field);
        }

        if columns.is_empty() {
            return Err(ImportError::Config {
                key: key.to_string(),
                message: "列顺序为空".to_string(),
            });
        }

        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_per_format() {
        assert_eq!(
            SourceSchema::default_for(FileFormat::Spreadsheet),
            SourceSchema::Positional {
                columns: DEFAULT_SPREADSHEET_COLUMNS.to_vec()
            }
        );
        assert_eq!(
            SourceSchema::default_for(FileFormat::Delimited),
            SourceSchema::Headed
        );

        match SourceSchema::default_for(FileFormat::Markup) {
            SourceSchema::Tagged {
                record_element,
                elements,
            } => {
                assert_eq!(record_element, "Card");
                assert!(elements.contains(&(CardField::BirthDate, "BirthDate".to_string())));
                assert!(elements.contains(&(CardField::Image, "ImageBase64".to_string())));
            }
            other => panic!("unexpected schema: {:?}", other),
        }
    }

    #[test]
    fn test_parse_columns_alternate_order() {
        let columns = SourceSchema::parse_columns(
            "import.xlsx.columns",
            "name, email, phone, gender, address, birthDate",
        )
        .unwrap();

        assert_eq!(
            columns,
            vec![
                CardField::Name,
                CardField::Email,
                CardField::Phone,
                CardField::Gender,
                CardField::Address,
                CardField::BirthDate,
            ]
        );
    }

    #[test]
    fn test_parse_columns_rejects_unknown_and_duplicates() {
        assert!(matches!(
            SourceSchema::parse_columns("k", "name,city"),
            Err(ImportError::Config { .. })
        ));
        assert!(matches!(
            SourceSchema::parse_columns("k", "name,Name"),
            Err(ImportError::Config { .. })
        ));
    }
}
