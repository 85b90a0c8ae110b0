// ==========================================
// 名片导入系统 - 核心库
// ==========================================
// 功能: 名片批量导入（.xlsx / .csv / .xml）+ 二维码生成与扫码建卡
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部文件
pub mod importer;

// 二维码层 - 载荷编解码与图片传输
pub mod qr;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CardField, CardRecord, FileFormat, Gender, GenderPolicy, ImportOutcome, RawFieldBag,
    ScannedCard, StoredCard,
};

// 导入
pub use importer::{CardImporter, CardImporterImpl, ImportError, ImportResult};

// 二维码
pub use qr::{CardQrService, DecodedFieldMap, QrError, QrPayload, QrTransport};

// API
pub use api::{ApiResponse, CardApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "card-import";
