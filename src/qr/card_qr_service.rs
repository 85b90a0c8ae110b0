// ==========================================
// 名片导入系统 - 名片二维码服务
// ==========================================
// 职责:
// - 按 ID 为已存名片生成二维码（base64 PNG）
// - 从二维码图片恢复名片并落库
// 说明: 扫码载荷比结构化文件更"有损"，只要求 Name / Email / Phone
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::card::{ScannedCard, StoredCard};
use crate::importer::record_validator::{RecordValidator, Validation};
use crate::qr::error::{QrError, QrResult};
use crate::qr::payload::{DecodedFieldMap, QrCardFields, QrPayload};
use crate::qr::transport::{export_base64, BarcodeTransport, QrTransport};
use crate::repository::CardRepository;
use tracing::{error, info, instrument, warn};

/// 校验解码文本并转为 ScannedCard
///
/// 缺少必填键时报告已识别与缺失的键，便于排查扫码质量问题
pub fn decode_scanned(raw_text: &str, validator: &RecordValidator) -> QrResult<ScannedCard> {
    let map = DecodedFieldMap::parse(raw_text);

    match validator.validate_scanned(&map.to_field_bag()) {
        Validation::Valid(card) => Ok(card),
        Validation::Skip(reason) => Err(QrError::MissingRequiredFields {
            found: map.keys(),
            missing: reason
                .all_missing()
                .iter()
                .map(|f| f.display_key().to_string())
                .collect(),
            raw_text: raw_text.to_string(),
        }),
    }
}

// ==========================================
// CardQrService
// ==========================================
pub struct CardQrService<R, C>
where
    R: CardRepository,
    C: ImportConfigReader,
{
    card_repo: R,
    config: C,
    transport: Box<dyn BarcodeTransport>,
}

impl<R, C> CardQrService<R, C>
where
    R: CardRepository,
    C: ImportConfigReader,
{
    pub fn new(card_repo: R, config: C, transport: Box<dyn BarcodeTransport>) -> Self {
        Self {
            card_repo,
            config,
            transport,
        }
    }

    /// 使用配置中的静区宽度构造 QrTransport
    pub async fn from_config(card_repo: R, config: C) -> QrResult<Self> {
        let margin = config.get_qr_margin_modules().await?;
        Ok(Self::new(card_repo, config, Box::new(QrTransport::new(margin))))
    }

    /// 为已存名片生成二维码
    ///
    /// # 返回
    /// - Ok(String): base64 编码的 PNG
    /// - Err(CardNotFound): 名片不存在
    #[instrument(skip(self))]
    pub async fn generate_for_card(&self, card_id: i64) -> QrResult<String> {
        let card = self
            .card_repo
            .find_by_id(card_id)
            .await?
            .ok_or(QrError::CardNotFound(card_id))?;

        let payload = QrPayload::encode(&QrCardFields::from(&card));
        let size_px = self.config.get_qr_size_px().await?;
        let png = self.transport.render(&payload.to_text(), size_px)?;

        info!(card_id, lines = payload.lines().len(), size_px, "二维码生成完成");
        Ok(export_base64(&png))
    }

    /// 从二维码图片创建名片
    ///
    /// # 流程
    /// 1. 空图片 → ImageMissing
    /// 2. 识别文本（失败 → NotDecodable / InvalidImage）
    /// 3. 解码 + 精简必填校验（Name / Email / Phone）
    /// 4. 落库并返回存储后的记录
    #[instrument(skip(self, image_bytes), fields(size = image_bytes.len()))]
    pub async fn create_from_image(&self, image_bytes: &[u8]) -> QrResult<StoredCard> {
        if image_bytes.is_empty() {
            return Err(QrError::ImageMissing);
        }

        let raw_text = self.transport.scan(image_bytes).map_err(|e| {
            warn!(error = %e, "二维码识别失败");
            e
        })?;

        let validator = RecordValidator::new(self.config.get_gender_policy().await?);
        let card = decode_scanned(&raw_text, &validator).map_err(|e| {
            warn!(error = %e, "二维码内容缺少必填字段");
            e
        })?;

        let card_id = self.card_repo.insert_scanned(&card).await.map_err(|e| {
            error!(error = %e, "扫码名片写入失败");
            QrError::from(e)
        })?;

        info!(card_id, name = %card.name, "扫码名片创建完成");

        self.card_repo
            .find_by_id(card_id)
            .await?
            .ok_or(QrError::CardNotFound(card_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::domain::card::CardRecord;
    use crate::domain::types::Gender;
    use crate::repository::CardRepositoryImpl;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, CardQrService<CardRepositoryImpl, ImportSettings>) {
        let temp_file = NamedTempFile::new().unwrap();
        let repo = CardRepositoryImpl::new(temp_file.path().to_str().unwrap()).unwrap();
        let service = CardQrService::new(repo, ImportSettings::default(), Box::new(QrTransport::default()));
        (temp_file, service)
    }

    /// 直接返回固定文本的传输层
    struct FixedTextTransport(&'static str);

    impl BarcodeTransport for FixedTextTransport {
        fn render(&self, text: &str, _size_hint: u32) -> QrResult<Vec<u8>> {
            Ok(text.as_bytes().to_vec())
        }
        fn scan(&self, _image_bytes: &[u8]) -> QrResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_decode_scanned_with_unrecognized_key() {
        let card = decode_scanned(
            "Name: X\nEmail: x@x.com\nPhone: 1\nCity: Z",
            &RecordValidator::default(),
        )
        .unwrap();

        assert_eq!(card.name, "X");
        assert_eq!(card.email, "x@x.com");
        assert_eq!(card.phone, "1");
        assert_eq!(card.address, None);
    }

    #[test]
    fn test_decode_scanned_optional_fields_unparsable_left_unset() {
        let card = decode_scanned(
            "Name: X\nEmail: x@x.com\nPhone: 1\nBirthDate: someday\nGender: ?",
            &RecordValidator::default(),
        )
        .unwrap();

        assert_eq!(card.birth_date, None);
        assert_eq!(card.gender, None);
    }

    #[test]
    fn test_decode_scanned_reports_found_and_missing() {
        let err = decode_scanned("Name: X\nCity: Z", &RecordValidator::default()).unwrap_err();

        match err {
            QrError::MissingRequiredFields {
                found,
                missing,
                raw_text,
            } => {
                assert_eq!(found, vec!["Name".to_string(), "City".to_string()]);
                assert_eq!(missing, vec!["Email".to_string(), "Phone".to_string()]);
                assert_eq!(raw_text, "Name: X\nCity: Z");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_for_missing_card() {
        let (_temp, service) = setup();
        assert!(matches!(
            service.generate_for_card(7).await,
            Err(QrError::CardNotFound(7))
        ));
    }

    #[tokio::test]
    async fn test_generate_then_create_roundtrip() {
        let (_temp, service) = setup();
        service
            .card_repo
            .bulk_insert(&[CardRecord {
                name: "Alice".to_string(),
                gender: Gender::Female,
                birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                email: "a@x.com".to_string(),
                phone: "123".to_string(),
                address: "Main St".to_string(),
                image: None,
            }])
            .await
            .unwrap();

        let encoded = service.generate_for_card(1).await.unwrap();
        let png = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).unwrap();

        let created = service.create_from_image(&png).await.unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(created.name, "Alice");
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.phone, "123");
        assert_eq!(created.address.as_deref(), Some("Main St"));
        assert_eq!(created.gender, None);
    }

    #[tokio::test]
    async fn test_create_from_image_missing_fields_persists_nothing() {
        let temp_file = NamedTempFile::new().unwrap();
        let repo = CardRepositoryImpl::new(temp_file.path().to_str().unwrap()).unwrap();
        let service = CardQrService::new(
            repo,
            ImportSettings::default(),
            Box::new(FixedTextTransport("Name: X")),
        );

        assert!(matches!(
            service.create_from_image(b"img").await,
            Err(QrError::MissingRequiredFields { .. })
        ));
        assert!(matches!(service.create_from_image(b"").await, Err(QrError::ImageMissing)));
        assert_eq!(service.card_repo.count_cards().await.unwrap(), 0);
    }
}
