// ==========================================
// 名片导入系统 - 名片导入器实现
// ==========================================
// 职责: 整合导入流程，从文件字节到数据库
// 流程: 识别格式 → 解析映射 → 读取 → 逐行校验 → 汇总 → 单事务落库
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::card::{CardRecord, ImportOutcome, RawFieldBag};
use crate::domain::types::FileFormat;
use crate::importer::card_importer_trait::{CardImporter, ImportFile};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::SourceSchema;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_validator::{RecordValidator, SkipReason, Validation};
use crate::repository::CardRepository;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// RowFold - 逐行校验的汇总结果
// ==========================================
// 不变量: accepted.len() + skipped.len() == 输入行数
#[derive(Debug, Default)]
pub struct RowFold {
    pub accepted: Vec<CardRecord>,
    pub skipped: Vec<SkipReason>,
}

/// 逐行校验并汇总（保持源顺序）
pub fn fold_rows<I>(validator: &RecordValidator, rows: I) -> RowFold
where
    I: IntoIterator<Item = RawFieldBag>,
{
    rows.into_iter()
        .fold(RowFold::default(), |mut acc, bag| {
            match validator.validate_import(&bag) {
                Validation::Valid(record) => acc.accepted.push(record),
                Validation::Skip(reason) => acc.skipped.push(reason),
            }
            acc
        })
}

// ==========================================
// CardImporterImpl - 名片导入器实现
// ==========================================
pub struct CardImporterImpl<R, C>
where
    R: CardRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    card_repo: R,

    // 配置读取器
    config: C,
}

impl<R, C> CardImporterImpl<R, C>
where
    R: CardRepository,
    C: ImportConfigReader,
{
    /// 创建新的 CardImporter 实例
    ///
    /// # 参数
    /// - card_repo: 名片仓储
    /// - config: 配置读取器（列顺序 / 记录元素名 / 性别策略）
    pub fn new(card_repo: R, config: C) -> Self {
        Self { card_repo, config }
    }

    pub fn card_repo(&self) -> &R {
        &self.card_repo
    }

    /// 按格式解析源映射（读取器构造前从配置取得）
    async fn resolve_schema(&self, format: FileFormat) -> ImportResult<SourceSchema> {
        let schema = match format {
            FileFormat::Spreadsheet => SourceSchema::Positional {
                columns: self.config.get_spreadsheet_columns().await?,
            },
            FileFormat::Delimited => SourceSchema::Headed,
            FileFormat::Markup => {
                SourceSchema::tagged(&self.config.get_markup_record_element().await?)
            }
        };
        Ok(schema)
    }
}

#[async_trait]
impl<R, C> CardImporter for CardImporterImpl<R, C>
where
    R: CardRepository,
    C: ImportConfigReader,
{
    #[instrument(skip(self, file_bytes), fields(batch_id))]
    async fn import(&self, file_bytes: &[u8], file_name: &str) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, file_name = %file_name, size = file_bytes.len(), "开始导入名片数据");

        if file_bytes.is_empty() {
            error!(file_name = %file_name, "文件为空");
            return Err(ImportError::EmptyInput);
        }

        let format = FileFormat::detect(file_name).ok_or_else(|| {
            error!(file_name = %file_name, "文件格式不支持");
            ImportError::UnsupportedFormat(file_name.to_string())
        })?;

        // === 步骤 1: 解析映射与校验策略 ===
        debug!(format = %format, "步骤 1: 解析源映射");
        let schema = self.resolve_schema(format).await?;
        let validator = RecordValidator::new(self.config.get_gender_policy().await?);

        // === 步骤 2: 读取文件 ===
        debug!("步骤 2: 读取文件");
        let bags = UniversalFileParser::reader_for(schema)
            .read(file_bytes)
            .map_err(|e| {
                error!(error = %e, "文件读取失败");
                e
            })?;
        info!(total_rows = bags.len(), "文件读取完成");

        // === 步骤 3: 逐行校验 ===
        debug!("步骤 3: 逐行校验");
        let fold = fold_rows(&validator, bags);
        for reason in &fold.skipped {
            warn!(
                row_number = reason.row_number,
                missing = ?reason.missing,
                unparsable = ?reason.unparsable,
                "跳过无效行"
            );
        }

        let skipped_count = fold.skipped.len();
        if fold.accepted.is_empty() {
            error!(skipped = skipped_count, "没有有效记录");
            return Err(ImportError::NoValidRecords {
                skipped: skipped_count,
            });
        }

        // === 步骤 4: 批量落库（单事务） ===
        debug!(count = fold.accepted.len(), "步骤 4: 批量落库");
        let inserted = self.card_repo.bulk_insert(&fold.accepted).await.map_err(|e| {
            error!(error = %e, "批量写入失败，事务已回滚");
            ImportError::from(e)
        })?;

        let elapsed_time = start_time.elapsed();
        info!(
            batch_id = %batch_id,
            format = %format,
            accepted = inserted,
            skipped = skipped_count,
            elapsed_ms = elapsed_time.as_millis() as u64,
            "名片导入完成"
        );

        Ok(ImportOutcome {
            batch_id,
            format,
            accepted: fold.accepted,
            skipped_count,
            elapsed_time,
        })
    }

    async fn batch_import(&self, files: Vec<ImportFile>) -> Vec<ImportResult<ImportOutcome>> {
        use futures::future::join_all;

        info!(count = files.len(), "开始批量导入文件");

        let import_tasks = files.iter().map(|file| async move {
            let result = self.import(&file.bytes, &file.file_name).await;
            match &result {
                Ok(outcome) => info!(
                    file = %file.file_name,
                    accepted = outcome.accepted_count(),
                    skipped = outcome.skipped_count,
                    "文件导入成功"
                ),
                Err(e) => error!(file = %file.file_name, error = %e, "文件导入失败"),
            }
            result
        });

        // 并发执行所有导入任务（每个文件独立事务）
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}
