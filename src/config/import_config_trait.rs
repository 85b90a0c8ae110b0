// ==========================================
// 名片导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入/二维码模块所需的配置读取接口
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{CardField, GenderPolicy};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{DEFAULT_RECORD_ELEMENT, DEFAULT_SPREADSHEET_COLUMNS};
use async_trait::async_trait;
use std::ops::RangeInclusive;

/// 二维码默认边长（像素）
pub const DEFAULT_QR_SIZE_PX: u32 = 250;

/// 二维码边长取值范围（像素）；下限为最小版本码的模块数
pub const QR_SIZE_PX_RANGE: RangeInclusive<u32> = 21..=2048;

/// 二维码默认静区宽度（模块数）
pub const DEFAULT_QR_MARGIN_MODULES: u32 = 2;

/// 静区宽度取值范围（模块数）
pub const QR_MARGIN_MODULES_RANGE: RangeInclusive<u32> = 0..=16;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入与二维码模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（静态值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 源映射配置 =====

    /// 获取 Excel 列顺序（第 i 列 → 返回值第 i 项）
    ///
    /// # 默认值
    /// - name, gender, email, phone, birth_date, address, image
    async fn get_spreadsheet_columns(&self) -> ImportResult<Vec<CardField>>;

    /// 获取 XML 记录元素名
    ///
    /// # 默认值
    /// - Card
    async fn get_markup_record_element(&self) -> ImportResult<String>;

    // ===== 校验配置 =====

    /// 获取性别解析策略
    ///
    /// # 返回
    /// - GenderPolicy::Lenient: 无法识别的性别按默认值 (Male) 接收
    /// - GenderPolicy::Strict: 无法识别的性别跳过该行
    ///
    /// # 默认值
    /// - LENIENT
    async fn get_gender_policy(&self) -> ImportResult<GenderPolicy>;

    // ===== 二维码配置 =====

    /// 获取二维码边长（像素，渲染时的目标尺寸）
    ///
    /// # 默认值
    /// - 250
    async fn get_qr_size_px(&self) -> ImportResult<u32>;

    /// 获取二维码静区宽度（模块数）
    ///
    /// # 默认值
    /// - 2
    async fn get_qr_margin_modules(&self) -> ImportResult<u32>;
}

// ==========================================
// ImportSettings - 静态配置
// ==========================================
// 用途: 无数据库场景（测试 / 命令行默认值）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub spreadsheet_columns: Vec<CardField>,
    pub record_element: String,
    pub gender_policy: GenderPolicy,
    pub qr_size_px: u32,
    pub qr_margin_modules: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            spreadsheet_columns: DEFAULT_SPREADSHEET_COLUMNS.to_vec(),
            record_element: DEFAULT_RECORD_ELEMENT.to_string(),
            gender_policy: GenderPolicy::default(),
            qr_size_px: DEFAULT_QR_SIZE_PX,
            qr_margin_modules: DEFAULT_QR_MARGIN_MODULES,
        }
    }
}

#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_spreadsheet_columns(&self) -> ImportResult<Vec<CardField>> {
        Ok(self.spreadsheet_columns.clone())
    }

    async fn get_markup_record_element(&self) -> ImportResult<String> {
        Ok(self.record_element.clone())
    }

    async fn get_gender_policy(&self) -> ImportResult<GenderPolicy> {
        Ok(self.gender_policy)
    }

    async fn get_qr_size_px(&self) -> ImportResult<u32> {
        Ok(self.qr_size_px)
    }

    async fn get_qr_margin_modules(&self) -> ImportResult<u32> {
        Ok(self.qr_margin_modules)
    }
}
