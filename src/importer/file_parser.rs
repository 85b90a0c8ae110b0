// ==========================================
// 名片导入系统 - 文件读取器实现
// ==========================================
// 支持: Excel (.xlsx) / CSV (.csv) / XML (.xml)
// 红线: 字段缺失只表现为空值；只有结构性失败才返回错误
// ==========================================

use crate::domain::card::RawFieldBag;
use crate::domain::types::CardField;
use crate::importer::card_importer_trait::FormatReader;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::SourceSchema;
use calamine::{Data, Reader, Xlsx};
use csv::{ReaderBuilder, Trim};
use std::io::Cursor;
use tracing::{debug, warn};

/// .xlsx 为 zip 容器，前两个字节固定为 "PK"
const XLSX_SIGNATURE: [u8; 2] = [0x50, 0x4B];

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct SpreadsheetReader {
    columns: Vec<CardField>,
}

impl SpreadsheetReader {
    pub fn new(columns: Vec<CardField>) -> Self {
        Self { columns }
    }
}

impl FormatReader for SpreadsheetReader {
    fn read(&self, file_bytes: &[u8]) -> ImportResult<Vec<RawFieldBag>> {
        // 签名检查先于结构解析
        if file_bytes.len() < XLSX_SIGNATURE.len() || file_bytes[..2] != XLSX_SIGNATURE {
            return Err(ImportError::NotAValidContainer);
        }

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(file_bytes))?;

        // 只读第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::NoWorksheet)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let (Some((header_row, _)), Some((end_row, _))) = (range.start(), range.end()) else {
            return Err(ImportError::NoDataFound);
        };
        if range.is_empty() {
            return Err(ImportError::NoDataFound);
        }

        // 首个非空行为表头（其上的空行忽略），其余按位置映射
        // 列按工作表绝对坐标取值，避免整列为空时错位
        let mut bags = Vec::new();
        for abs_row in header_row + 1..=end_row {
            let mut bag = RawFieldBag::new(abs_row as usize);
            for (col, field) in self.columns.iter().enumerate() {
                if let Some(text) = range.get_value((abs_row, col as u32)).and_then(cell_text) {
                    bag.set(*field, text);
                }
            }

            // 跳过完全空白的行
            if bag.is_blank() {
                continue;
            }

            bags.push(bag);
        }

        if bags.is_empty() {
            return Err(ImportError::NoDataFound);
        }

        debug!(sheet = %sheet_name, rows = bags.len(), "Excel 读取完成");
        Ok(bags)
    }
}

/// 单元格 → 文本（日期单元格统一为 ISO 格式）
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ==========================================
// CSV Reader 实现
// ==========================================
// 表头大小写不敏感；多余列忽略，缺失列为空值
pub struct DelimitedReader;

impl FormatReader for DelimitedReader {
    fn read(&self, file_bytes: &[u8]) -> ImportResult<Vec<RawFieldBag>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(Trim::All)
            .from_reader(file_bytes);

        // 表头 → 字段（无法识别的列为 None）
        let mapping: Vec<Option<CardField>> = reader
            .byte_headers()?
            .iter()
            .map(|h| CardField::from_key(&String::from_utf8_lossy(h)))
            .collect();

        let mut bags = Vec::new();
        for (idx, result) in reader.byte_records().enumerate() {
            let mut bag = RawFieldBag::new(idx + 1);

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    // 单行损坏不影响整个文件，以空字段包交给校验器
                    warn!(row_number = idx + 1, error = %e, "CSV 行解析失败");
                    bags.push(bag);
                    continue;
                }
            };

            for (col, value) in record.iter().enumerate() {
                if let Some(Some(field)) = mapping.get(col) {
                    // 重复表头取第一列
                    if bag.get(*field).is_none() {
                        bag.set(*field, String::from_utf8_lossy(value));
                    }
                }
            }

            // 跳过完全空白的行
            if bag.is_blank() {
                continue;
            }

            bags.push(bag);
        }

        debug!(rows = bags.len(), "CSV 读取完成");
        Ok(bags)
    }
}

// ==========================================
// XML Reader 实现
// ==========================================
// 根元素下每个记录元素贡献一个字段包；子元素顺序无关
pub struct MarkupReader {
    record_element: String,
    elements: Vec<(CardField, String)>,
}

impl MarkupReader {
    pub fn new(record_element: String, elements: Vec<(CardField, String)>) -> Self {
        Self {
            record_element,
            elements,
        }
    }
}

impl FormatReader for MarkupReader {
    fn read(&self, file_bytes: &[u8]) -> ImportResult<Vec<RawFieldBag>> {
        let text = std::str::from_utf8(file_bytes)
            .map_err(|e| ImportError::MalformedMarkup(e.to_string()))?
            .trim_start_matches('\u{feff}');

        if text.trim().is_empty() {
            return Err(ImportError::EmptyDocument);
        }

        // 语法错误无法部分解析，整文件失败
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();

        let bags: Vec<RawFieldBag> = root
            .children()
            .filter(|n| n.is_element() && n.has_tag_name(self.record_element.as_str()))
            .enumerate()
            .map(|(idx, card)| {
                let mut bag = RawFieldBag::new(idx + 1);
                for (field, element) in &self.elements {
                    let child = card
                        .children()
                        .find(|n| n.is_element() && n.has_tag_name(element.as_str()));
                    if let Some(child) = child {
                        bag.set(*field, element_text(child));
                    }
                }
                bag
            })
            .collect();

        debug!(root = root.tag_name().name(), records = bags.len(), "XML 读取完成");
        Ok(bags)
    }
}

/// 元素内全部文本（含子孙节点）
fn element_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

// ==========================================
// 通用读取器（根据映射描述选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按映射描述构造读取器
    pub fn reader_for(schema: SourceSchema) -> Box<dyn FormatReader> {
        match schema {
            SourceSchema::Positional { columns } => Box::new(SpreadsheetReader::new(columns)),
            SourceSchema::Headed => Box::new(DelimitedReader),
            SourceSchema::Tagged {
                record_element,
                elements,
            } => Box::new(MarkupReader::new(record_element, elements)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FileFormat;
    use crate::importer::field_mapper::DEFAULT_SPREADSHEET_COLUMNS;
    use rust_xlsxwriter::Workbook;

    fn xlsx_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    // ===== CSV =====

    #[test]
    fn test_csv_header_matching_case_insensitive() {
        let data = "NAME,Email,phone,GENDER,address,birthDate\nA,a@x.com,111,Male,Addr,1990-01-01\n";
        let bags = DelimitedReader.read(data.as_bytes()).unwrap();

        assert_eq!(bags.len(), 1);
        assert_eq!(bags[0].get(CardField::Name), Some("A"));
        assert_eq!(bags[0].get(CardField::BirthDate), Some("1990-01-01"));
        assert_eq!(bags[0].get(CardField::Image), None);
    }

    #[test]
    fn test_csv_tolerates_missing_and_extra_columns() {
        let data = "name,city,email\nA,Paris,a@x.com\nB,Rome\n";
        let bags = DelimitedReader.read(data.as_bytes()).unwrap();

        assert_eq!(bags.len(), 2);
        assert_eq!(bags[0].get(CardField::Email), Some("a@x.com"));
        assert_eq!(bags[0].get(CardField::Phone), None);
        assert_eq!(bags[1].get(CardField::Name), Some("B"));
        assert_eq!(bags[1].get(CardField::Email), None);
    }

    #[test]
    fn test_csv_skip_blank_rows() {
        let data = "name,email\nA,a@x.com\n,\nB,b@x.com\n";
        let bags = DelimitedReader.read(data.as_bytes()).unwrap();
        assert_eq!(bags.len(), 2);
    }

    #[test]
    fn test_csv_header_only() {
        let data = "name,gender,email,phone,birthDate,address,image\n";
        let bags = DelimitedReader.read(data.as_bytes()).unwrap();
        assert!(bags.is_empty());
    }

    // ===== XML =====

    #[test]
    fn test_xml_elements_in_any_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<Cards>
  <Card>
    <Email> a@x.com </Email>
    <Name>A</Name>
    <BirthDate>1990-01-01</BirthDate>
  </Card>
  <Other><Name>ignored</Name></Other>
  <Card><Name>B</Name></Card>
</Cards>"#;
        let reader = UniversalFileParser::reader_for(SourceSchema::default_for(FileFormat::Markup));
        let bags = reader.read(xml.as_bytes()).unwrap();

        assert_eq!(bags.len(), 2);
        assert_eq!(bags[0].get(CardField::Name), Some("A"));
        assert_eq!(bags[0].get(CardField::Email), Some(" a@x.com "));
        assert_eq!(bags[1].get(CardField::Email), None);
        assert_eq!(bags[1].row_number, 2);
    }

    #[test]
    fn test_xml_empty_document() {
        let reader = UniversalFileParser::reader_for(SourceSchema::default_for(FileFormat::Markup));
        assert!(matches!(reader.read(b"   \n"), Err(ImportError::EmptyDocument)));
    }

    #[test]
    fn test_xml_malformed() {
        let reader = UniversalFileParser::reader_for(SourceSchema::default_for(FileFormat::Markup));
        let result = reader.read(b"<Cards><Card><Name>Test</Name></Card");
        assert!(matches!(result, Err(ImportError::MalformedMarkup(_))));
    }

    // ===== Excel =====

    #[test]
    fn test_xlsx_positional_mapping() {
        let bytes = xlsx_bytes(&[
            &["Name", "Gender", "Email", "Phone", "BirthDate", "Address", "Image"],
            &["John Doe", "Male", "john@example.com", "1234567890", "1990-01-01", "123 Main St", ""],
            &["", "", "", "", "", "", ""],
            &["Jane Smith", "Female", "", "0987654321", "1995-05-15", "456 Oak Ave", ""],
        ]);
        let reader = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec());
        let bags = reader.read(&bytes).unwrap();

        assert_eq!(bags.len(), 2);
        assert_eq!(bags[0].get(CardField::Name), Some("John Doe"));
        assert_eq!(bags[0].get(CardField::Phone), Some("1234567890"));
        assert_eq!(bags[1].get(CardField::Email), None);
        assert_eq!(bags[1].get(CardField::Address), Some("456 Oak Ave"));
    }

    #[test]
    fn test_xlsx_alternate_column_order() {
        let bytes = xlsx_bytes(&[
            &["name", "email", "phone", "gender", "address", "birthDate"],
            &["A", "a@x.com", "111", "Male", "Addr", "1990-01-01"],
        ]);
        let columns = SourceSchema::parse_columns("k", "name,email,phone,gender,address,birth_date").unwrap();
        let bags = SpreadsheetReader::new(columns).read(&bytes).unwrap();

        assert_eq!(bags[0].get(CardField::Email), Some("a@x.com"));
        assert_eq!(bags[0].get(CardField::Gender), Some("Male"));
    }

    #[test]
    fn test_xlsx_empty_first_column_keeps_positions() {
        let bytes = xlsx_bytes(&[
            &["", "Gender", "Email", "Phone"],
            &["", "Male", "a@x.com", "111"],
        ]);
        let bags = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec())
            .read(&bytes)
            .unwrap();

        assert_eq!(bags[0].row_number, 1);
        assert_eq!(bags[0].get(CardField::Name), None);
        assert_eq!(bags[0].get(CardField::Gender), Some("Male"));
        assert_eq!(bags[0].get(CardField::Email), Some("a@x.com"));
    }

    #[test]
    fn test_xlsx_header_only_is_no_data() {
        let bytes = xlsx_bytes(&[&["Name", "Gender", "Email"]]);
        let reader = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec());
        assert!(matches!(reader.read(&bytes), Err(ImportError::NoDataFound)));
    }

    #[test]
    fn test_xlsx_empty_sheet_is_no_data() {
        let bytes = xlsx_bytes(&[]);
        let reader = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec());
        assert!(matches!(reader.read(&bytes), Err(ImportError::NoDataFound)));
    }

    #[test]
    fn test_xlsx_bad_signature() {
        let reader = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec());
        assert!(matches!(
            reader.read(b"name,email\nA,a@x.com"),
            Err(ImportError::NotAValidContainer)
        ));
        assert!(matches!(reader.read(b"P"), Err(ImportError::NotAValidContainer)));
    }

    #[test]
    fn test_xlsx_corrupt_container() {
        let reader = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec());
        let result = reader.read(b"PK\x03\x04 this is not really a zip archive");
        assert!(matches!(result, Err(ImportError::CorruptFile(_))));
    }

    #[test]
    fn test_xlsx_blank_rows_above_header() {
        let bytes = xlsx_bytes(&[
            &[],
            &[],
            &["Name", "Gender", "Email", "Phone", "BirthDate", "Address"],
            &["John", "Male", "j@x.com", "1", "1990-01-01", "Addr"],
        ]);
        let bags = SpreadsheetReader::new(DEFAULT_SPREADSHEET_COLUMNS.to_vec())
            .read(&bytes)
            .unwrap();

        assert_eq!(bags.len(), 1);
        assert_eq!(bags[0].row_number, 3);
        assert_eq!(bags[0].get(CardField::Name), Some("John"));
    }
}
