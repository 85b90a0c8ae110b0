// ==========================================
// 名片导入系统 - 条码传输层（图片 ⇄ 文本）
// ==========================================
// 职责: 文本 → 二维码 PNG；PNG/JPEG 等 → 文本
// 要求: 渲染确定性（同文本同参数得到同一图片）
//       识别需容忍旋转与反色（浅色码深色底）
// ==========================================

use crate::config::import_config_trait::DEFAULT_QR_MARGIN_MODULES;
use crate::qr::error::{QrError, QrResult};
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{Color, QrCode};
use tracing::debug;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

// ==========================================
// BarcodeTransport Trait
// ==========================================
// 实现者: QrTransport（qrcode 渲染 + rqrr 识别）
pub trait BarcodeTransport: Send + Sync {
    /// 渲染为 PNG 字节
    ///
    /// # 参数
    /// - text: 载荷文本
    /// - size_hint: 目标边长（像素）；模块过多时图片会大于该值
    fn render(&self, text: &str, size_hint: u32) -> QrResult<Vec<u8>>;

    /// 识别图片中的二维码文本
    ///
    /// # 返回
    /// - Ok(String): 第一个成功解码的码内容
    /// - Err(NotDecodable): 未找到可解码的二维码
    fn scan(&self, image_bytes: &[u8]) -> QrResult<String>;
}

// ==========================================
// QrTransport
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrTransport {
    margin_modules: u32,
}

impl Default for QrTransport {
    fn default() -> Self {
        Self::new(DEFAULT_QR_MARGIN_MODULES)
    }
}

impl QrTransport {
    pub fn new(margin_modules: u32) -> Self {
        Self { margin_modules }
    }

    /// 模块矩阵 → 灰度图（整数倍放大，居中于 size_hint 画布）
    fn rasterize(&self, code: &QrCode, size_hint: u32) -> GrayImage {
        let width = code.width() as u32;
        let colors = code.to_colors();
        let margin = self.margin_modules;

        let modules = width + 2 * margin;
        let scale = (size_hint / modules).max(1);
        let side = (modules * scale).max(size_hint);
        let offset = (side - modules * scale) / 2;

        GrayImage::from_fn(side, side, |x, y| {
            if x < offset || y < offset {
                return LIGHT;
            }
            let mx = (x - offset) / scale;
            let my = (y - offset) / scale;
            if mx < margin || my < margin || mx >= margin + width || my >= margin + width {
                return LIGHT;
            }
            match colors[((my - margin) * width + (mx - margin)) as usize] {
                Color::Dark => DARK,
                Color::Light => LIGHT,
            }
        })
    }
}

impl BarcodeTransport for QrTransport {
    fn render(&self, text: &str, size_hint: u32) -> QrResult<Vec<u8>> {
        let code = QrCode::new(text.as_bytes()).map_err(|e| QrError::Render(e.to_string()))?;
        let img = self.rasterize(&code, size_hint);

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::L8)
            .map_err(|e| QrError::Render(e.to_string()))?;

        debug!(modules = code.width(), side = img.width(), bytes = png.len(), "二维码渲染完成");
        Ok(png)
    }

    fn scan(&self, image_bytes: &[u8]) -> QrResult<String> {
        if image_bytes.is_empty() {
            return Err(QrError::ImageMissing);
        }

        let mut gray = image::load_from_memory(image_bytes)?.to_luma8();

        if let Some(text) = decode_first_grid(&gray) {
            return Ok(text);
        }

        // 反色重试（浅色码深色底）
        image::imageops::invert(&mut gray);
        decode_first_grid(&gray).ok_or(QrError::NotDecodable)
    }
}

/// 识别灰度图中的二维码（方向无关），返回第一个成功解码的内容
fn decode_first_grid(gray: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );

    let grids = prepared.detect_grids();
    debug!(grids = grids.len(), "二维码定位完成");

    grids
        .into_iter()
        .find_map(|grid| grid.decode().ok().map(|(_meta, content)| content))
}

/// PNG 字节 → base64 文本（供接口返回）
pub fn export_base64(png: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(png)
}
