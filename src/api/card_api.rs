// ==========================================
// 名片导入系统 - 名片 API
// ==========================================
// 职责: 封装导入 / 生成二维码 / 扫码建卡，统一返回双语信封
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::card::{ImportOutcome, StoredCard};
use crate::domain::types::FileFormat;
use crate::importer::{CardImporter, CardImporterImpl, ImportFile};
use crate::qr::CardQrService;
use crate::repository::error::RepositoryError;
use crate::repository::{CardRepository, CardRepositoryImpl};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::error;

/// 导入结果摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// 导入批次ID
    pub batch_id: String,
    pub format: FileFormat,
    /// 新增名片数
    pub added: usize,
    /// 跳过行数
    pub skipped: usize,
    /// 导入耗时（毫秒）
    pub elapsed_ms: u64,
}

impl From<&ImportOutcome> for ImportSummary {
    fn from(outcome: &ImportOutcome) -> Self {
        Self {
            batch_id: outcome.batch_id.clone(),
            format: outcome.format,
            added: outcome.accepted_count(),
            skipped: outcome.skipped_count,
            elapsed_ms: outcome.elapsed_time.as_millis() as u64,
        }
    }
}

// ==========================================
// CardApi
// ==========================================
pub struct CardApi {
    db_path: String,
}

impl CardApi {
    /// 创建新的CardApi实例
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// 仓储与配置共用同一连接（每次调用新建）
    fn open_stores(&self) -> ApiResult<(CardRepositoryImpl, ConfigManager)> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(RepositoryError::from)?;

        let conn = Arc::new(Mutex::new(conn));
        let config = ConfigManager::from_connection(conn.clone())?;
        Ok((CardRepositoryImpl::from_connection(conn), config))
    }

    fn create_importer(&self) -> ApiResult<CardImporterImpl<CardRepositoryImpl, ConfigManager>> {
        let (repo, config) = self.open_stores()?;
        Ok(CardImporterImpl::new(repo, config))
    }

    async fn create_qr_service(&self) -> ApiResult<CardQrService<CardRepositoryImpl, ConfigManager>> {
        let (repo, config) = self.open_stores()?;
        Ok(CardQrService::from_config(repo, config).await?)
    }

    /// 导入名片文件（.xlsx / .csv / .xml）
    ///
    /// # 返回
    /// - 成功: "Cards imported successfully. Added: N, Skipped: M" + ImportSummary
    /// - 失败: 按错误类型给出可区分的双语消息
    pub async fn import_file(&self, file_name: &str, file_bytes: &[u8]) -> ApiResponse<ImportSummary> {
        let result = async {
            let importer = self.create_importer()?;
            Ok::<_, ApiError>(importer.import(file_bytes, file_name).await?)
        }
        .await;

        respond_import(result)
    }

    /// 批量导入（每个文件独立事务，结果顺序与输入一致）
    pub async fn batch_import(&self, files: Vec<ImportFile>) -> Vec<ApiResponse<ImportSummary>> {
        let importer = match self.create_importer() {
            Ok(importer) => importer,
            Err(e) => {
                error!(error = %e, "创建导入器失败");
                let failure = ApiResponse::failure(&e);
                return files.iter().map(|_| failure.clone()).collect();
            }
        };

        importer
            .batch_import(files)
            .await
            .into_iter()
            .map(|result| respond_import(result.map_err(ApiError::from)))
            .collect()
    }

    /// 生成名片二维码（base64 PNG）
    pub async fn generate_qr(&self, card_id: i64) -> ApiResponse<String> {
        let result = async {
            let service = self.create_qr_service().await?;
            Ok::<_, ApiError>(service.generate_for_card(card_id).await?)
        }
        .await;

        match result {
            Ok(base64_png) => ApiResponse::success("qr.generated", &[], base64_png),
            Err(e) => {
                error!(card_id, error = %e, "二维码生成失败");
                ApiResponse::failure(&e)
            }
        }
    }

    /// 从二维码图片创建名片
    pub async fn create_from_qr(&self, image_bytes: &[u8]) -> ApiResponse<StoredCard> {
        let result = async {
            let service = self.create_qr_service().await?;
            Ok::<_, ApiError>(service.create_from_image(image_bytes).await?)
        }
        .await;

        match result {
            Ok(card) => ApiResponse::success("qr.card_created", &[], card),
            Err(e) => {
                error!(error = %e, "扫码建卡失败");
                ApiResponse::failure(&e)
            }
        }
    }

    /// 名片总数
    pub async fn count_cards(&self) -> ApiResult<usize> {
        let repo = CardRepositoryImpl::new(&self.db_path)?;
        Ok(repo.count_cards().await?)
    }
}

fn respond_import(result: ApiResult<ImportOutcome>) -> ApiResponse<ImportSummary> {
    match result {
        Ok(outcome) => {
            let summary = ImportSummary::from(&outcome);
            ApiResponse::success(
                "import.success",
                &[
                    ("added", summary.added.to_string()),
                    ("skipped", summary.skipped.to_string()),
                ],
                summary,
            )
        }
        Err(e) => ApiResponse::failure(&e),
    }
}
