// ==========================================
// 名片导入系统 - 二维码模块
// ==========================================
// 职责: 名片 ⇄ 二维码载荷文本 ⇄ 二维码图片
// 流程: QrPayload::encode → BarcodeTransport::render
//       BarcodeTransport::scan → DecodedFieldMap → RecordValidator（精简必填）
// ==========================================

pub mod card_qr_service;
pub mod error;
pub mod payload;
pub mod transport;

pub use card_qr_service::{decode_scanned, CardQrService};
pub use error::{QrError, QrResult};
pub use payload::{DecodedFieldMap, QrCardFields, QrPayload};
pub use transport::{export_base64, BarcodeTransport, QrTransport};
