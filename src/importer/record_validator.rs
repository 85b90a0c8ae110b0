// ==========================================
// 名片导入系统 - 记录校验器（Record Validator）
// ==========================================
// 职责: 必填字段 + 类型转换校验，产出 Valid 或 Skip
// 红线: 单行失败只产生 Skip，不抛错、不中断批次
// ==========================================

use crate::domain::card::{CardRecord, RawFieldBag, ScannedCard};
use crate::domain::types::{CardField, Gender, GenderPolicy};
use crate::importer::data_cleaner::{DataCleaner, Normalized};
use chrono::NaiveDate;
use serde::Serialize;

// ==========================================
// RequiredFields - 必填字段集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFields(&'static [CardField]);

impl RequiredFields {
    /// 文件导入路径: image 以外全部必填
    pub const FULL_IMPORT: RequiredFields = RequiredFields(&[
        CardField::Name,
        CardField::Email,
        CardField::Phone,
        CardField::Gender,
        CardField::Address,
        CardField::BirthDate,
    ]);

    /// 二维码解码路径: 只要求 name / email / phone
    pub const SCANNED: RequiredFields =
        RequiredFields(&[CardField::Name, CardField::Email, CardField::Phone]);

    pub fn contains(&self, field: CardField) -> bool {
        self.0.contains(&field)
    }

    pub fn fields(&self) -> &'static [CardField] {
        self.0
    }
}

// ==========================================
// SkipReason - 跳过原因（用于日志/诊断）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipReason {
    pub row_number: usize,
    pub missing: Vec<CardField>,    // 必填字段为空
    pub unparsable: Vec<CardField>, // 必填字段无法解析
}

impl SkipReason {
    /// 视为“缺失”的全部字段（无法解析等同缺失）
    pub fn all_missing(&self) -> Vec<CardField> {
        let mut fields = self.missing.clone();
        fields.extend(self.unparsable.iter().copied());
        fields.sort();
        fields
    }
}

// ==========================================
// Validation - 单行校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    Valid(T),
    Skip(SkipReason),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Validation::Valid(v) => Validation::Valid(f(v)),
            Validation::Skip(reason) => Validation::Skip(reason),
        }
    }
}

// ==========================================
// CheckedFields - 通过必填校验后的类型化字段
// ==========================================
// 必填字段保证为 Some；非必填字段缺失/无法解析时为 None
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedFields {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

// ==========================================
// RecordValidator
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator {
    gender_policy: GenderPolicy,
}

impl RecordValidator {
    pub fn new(gender_policy: GenderPolicy) -> Self {
        Self { gender_policy }
    }

    pub fn gender_policy(&self) -> GenderPolicy {
        self.gender_policy
    }

    /// 通用校验入口（无内部状态，同一输入永远得到同一结果）
    pub fn validate(&self, bag: &RawFieldBag, required: RequiredFields) -> Validation<CheckedFields> {
        let cleaner = DataCleaner;
        let mut reason = SkipReason {
            row_number: bag.row_number,
            ..Default::default()
        };

        let mut text = |field: CardField| -> Option<String> {
            let value = cleaner.normalize_null(bag.get(field));
            if value.is_none() && required.contains(field) {
                reason.missing.push(field);
            }
            value
        };

        let name = text(CardField::Name);
        let email = text(CardField::Email);
        let phone = text(CardField::Phone);
        let address = text(CardField::Address);
        let image = text(CardField::Image);

        // 出生日期: 无法解析等同缺失
        let birth_date = match cleaner.normalize_date(bag.get(CardField::BirthDate)) {
            Normalized::Value(date) => Some(date),
            Normalized::Absent => {
                if required.contains(CardField::BirthDate) {
                    reason.missing.push(CardField::BirthDate);
                }
                None
            }
            Normalized::Invalid(_) => {
                if required.contains(CardField::BirthDate) {
                    reason.unparsable.push(CardField::BirthDate);
                }
                None
            }
        };

        // 性别: 空白按缺失处理；无法识别时按策略处理
        let gender = match cleaner.normalize_gender(bag.get(CardField::Gender)) {
            Normalized::Value(gender) => Some(gender),
            Normalized::Absent => {
                if required.contains(CardField::Gender) {
                    reason.missing.push(CardField::Gender);
                }
                None
            }
            Normalized::Invalid(_) if required.contains(CardField::Gender) => {
                match self.gender_policy {
                    GenderPolicy::Lenient => Some(Gender::default()),
                    GenderPolicy::Strict => {
                        reason.unparsable.push(CardField::Gender);
                        None
                    }
                }
            }
            Normalized::Invalid(_) => None,
        };

        if !reason.missing.is_empty() || !reason.unparsable.is_empty() {
            return Validation::Skip(reason);
        }

        Validation::Valid(CheckedFields {
            name,
            gender,
            birth_date,
            email,
            phone,
            address,
            image,
        })
    }

    /// 文件导入路径校验 → CardRecord
    pub fn validate_import(&self, bag: &RawFieldBag) -> Validation<CardRecord> {
        match self.validate(bag, RequiredFields::FULL_IMPORT) {
            Validation::Skip(reason) => Validation::Skip(reason),
            Validation::Valid(fields) => match into_card_record(fields) {
                Some(record) => Validation::Valid(record),
                None => Validation::Skip(SkipReason {
                    row_number: bag.row_number,
                    ..Default::default()
                }),
            },
        }
    }

    /// 二维码解码路径校验 → ScannedCard
    pub fn validate_scanned(&self, bag: &RawFieldBag) -> Validation<ScannedCard> {
        self.validate(bag, RequiredFields::SCANNED)
            .map(|fields| ScannedCard {
                name: fields.name.unwrap_or_default(),
                email: fields.email.unwrap_or_default(),
                phone: fields.phone.unwrap_or_default(),
                address: fields.address,
                birth_date: fields.birth_date,
                gender: fields.gender,
            })
    }
}

// FULL_IMPORT 校验通过时所有字段必然存在
fn into_card_record(fields: CheckedFields) -> Option<CardRecord> {
    Some(CardRecord {
        name: fields.name?,
        gender: fields.gender?,
        birth_date: fields.birth_date?,
        email: fields.email?,
        phone: fields.phone?,
        address: fields.address?,
        image: fields.image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_bag() -> RawFieldBag {
        RawFieldBag::new(1)
            .with(CardField::Name, " Alice ")
            .with(CardField::Gender, "female")
            .with(CardField::Email, "alice@example.com")
            .with(CardField::Phone, "111")
            .with(CardField::BirthDate, "1990-01-01")
            .with(CardField::Address, "1 Main St")
    }

    #[test]
    fn test_validate_import_accepts_complete_row() {
        let validator = RecordValidator::default();
        match validator.validate_import(&full_bag()) {
            Validation::Valid(record) => {
                assert_eq!(record.name, "Alice");
                assert_eq!(record.gender, Gender::Female);
                assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
                assert_eq!(record.image, None);
            }
            Validation::Skip(reason) => panic!("unexpected skip: {:?}", reason),
        }
    }

    #[test]
    fn test_validate_import_skips_each_missing_required_field() {
        let validator = RecordValidator::default();
        for field in RequiredFields::FULL_IMPORT.fields() {
            let bag = full_bag().with(*field, "   ");
            match validator.validate_import(&bag) {
                Validation::Skip(reason) => assert_eq!(reason.missing, vec![*field]),
                Validation::Valid(_) => panic!("{} should be required", field),
            }
        }
    }

    #[test]
    fn test_image_is_optional() {
        let validator = RecordValidator::default();
        let bag = full_bag().with(CardField::Image, "aGVsbG8=");
        match validator.validate_import(&bag) {
            Validation::Valid(record) => assert_eq!(record.image.as_deref(), Some("aGVsbG8=")),
            Validation::Skip(reason) => panic!("unexpected skip: {:?}", reason),
        }
    }

    #[test]
    fn test_unparsable_birth_date_skips() {
        let validator = RecordValidator::default();
        let bag = full_bag().with(CardField::BirthDate, "someday");
        match validator.validate_import(&bag) {
            Validation::Skip(reason) => {
                assert!(reason.missing.is_empty());
                assert_eq!(reason.unparsable, vec![CardField::BirthDate]);
                assert_eq!(reason.all_missing(), vec![CardField::BirthDate]);
            }
            Validation::Valid(_) => panic!("bad date must skip"),
        }
    }

    #[test]
    fn test_lenient_gender_defaults_unparsable_value() {
        let validator = RecordValidator::new(GenderPolicy::Lenient);
        let bag = full_bag().with(CardField::Gender, "unknown");
        match validator.validate_import(&bag) {
            Validation::Valid(record) => assert_eq!(record.gender, Gender::Male),
            Validation::Skip(reason) => panic!("lenient policy must accept: {:?}", reason),
        }
    }

    #[test]
    fn test_strict_gender_skips_unparsable_value() {
        let validator = RecordValidator::new(GenderPolicy::Strict);
        let bag = full_bag().with(CardField::Gender, "unknown");
        match validator.validate_import(&bag) {
            Validation::Skip(reason) => assert_eq!(reason.unparsable, vec![CardField::Gender]),
            Validation::Valid(_) => panic!("strict policy must skip"),
        }
    }

    #[test]
    fn test_blank_gender_skips_under_both_policies() {
        for policy in [GenderPolicy::Lenient, GenderPolicy::Strict] {
            let validator = RecordValidator::new(policy);
            let bag = full_bag().with(CardField::Gender, "");
            assert!(!validator.validate_import(&bag).is_valid());
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = RecordValidator::default();
        let good = full_bag();
        let bad = full_bag().with(CardField::Email, "");

        assert_eq!(validator.validate_import(&good), validator.validate_import(&good));
        assert_eq!(validator.validate_import(&bad), validator.validate_import(&bad));
    }

    #[test]
    fn test_validate_scanned_relaxed_fields() {
        let validator = RecordValidator::default();
        let bag = RawFieldBag::new(1)
            .with(CardField::Name, "X")
            .with(CardField::Email, "x@x.com")
            .with(CardField::Phone, "1")
            .with(CardField::BirthDate, "garbage")
            .with(CardField::Gender, "robot");

        match validator.validate_scanned(&bag) {
            Validation::Valid(card) => {
                assert_eq!(card.name, "X");
                assert_eq!(card.address, None);
                assert_eq!(card.birth_date, None);
                assert_eq!(card.gender, None);
            }
            Validation::Skip(reason) => panic!("unexpected skip: {:?}", reason),
        }
    }

    #[test]
    fn test_validate_scanned_reports_missing() {
        let validator = RecordValidator::default();
        let bag = RawFieldBag::new(1).with(CardField::Name, "X");

        match validator.validate_scanned(&bag) {
            Validation::Skip(reason) => {
                assert_eq!(reason.missing, vec![CardField::Email, CardField::Phone]);
            }
            Validation::Valid(_) => panic!("email/phone are required"),
        }
    }
}
