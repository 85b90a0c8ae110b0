// ==========================================
// 名片导入系统 - 导入层
// ==========================================
// 职责: 外部文件导入,生成校验后的名片记录
// 支持: Excel (.xlsx), CSV, XML
// ==========================================

// 模块声明
pub mod card_importer_impl;
pub mod card_importer_trait;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_validator;

// 重导出核心类型
pub use card_importer_impl::{fold_rows, CardImporterImpl, RowFold};
pub use data_cleaner::{DataCleaner, Normalized};
pub use error::{ImportError, ImportResult};
pub use field_mapper::SourceSchema;
pub use file_parser::{DelimitedReader, MarkupReader, SpreadsheetReader, UniversalFileParser};
pub use record_validator::{RecordValidator, RequiredFields, SkipReason, Validation};

// 重导出 Trait 接口
pub use card_importer_trait::{CardImporter, FormatReader, ImportFile};
