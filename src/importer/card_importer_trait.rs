// ==========================================
// 名片导入系统 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::card::{ImportOutcome, RawFieldBag};
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// CardImporter Trait
// ==========================================
// 用途: 名片导入主接口
// 实现者: CardImporterImpl
#[async_trait]
pub trait CardImporter: Send + Sync {
    /// 导入一个文件
    ///
    /// # 参数
    /// - file_bytes: 文件内容（整体读入内存）
    /// - file_name: 文件名或扩展名（决定读取器）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 已落库的记录 + 跳过行数
    /// - Err: 终止性错误（此时没有任何记录落库）
    ///
    /// # 流程
    /// 1. 空输入检查
    /// 2. 按扩展名选择读取器
    /// 3. 读取为 RawFieldBag 序列
    /// 4. 逐行校验（fold 出 accepted + skipped）
    /// 5. 零有效记录 → NoValidRecords
    /// 6. 单事务批量落库
    async fn import(&self, file_bytes: &[u8], file_name: &str) -> ImportResult<ImportOutcome>;

    /// 批量导入多个文件（并发执行）
    ///
    /// # 说明
    /// - 每个文件独立事务，互不影响
    /// - 结果顺序与输入顺序一致
    async fn batch_import(&self, files: Vec<ImportFile>) -> Vec<ImportResult<ImportOutcome>>;
}

/// 批量导入的单个文件
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// ==========================================
// FormatReader Trait
// ==========================================
// 用途: 文件 → RawFieldBag 序列
// 实现者: SpreadsheetReader, DelimitedReader, MarkupReader
pub trait FormatReader: Send + Sync {
    /// 解析文件为原始字段包
    ///
    /// # 返回
    /// - Ok(Vec<RawFieldBag>): 按源顺序排列，每个数据行/元素一个
    /// - Err: 结构性失败（签名错误、容器损坏、XML 语法错误）
    fn read(&self, file_bytes: &[u8]) -> ImportResult<Vec<RawFieldBag>>;
}
