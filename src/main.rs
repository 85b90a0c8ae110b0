// ==========================================
// 名片导入系统 - 命令行入口
// ==========================================
// 用法:
//   card-import import <file> [db_path]   导入 .xlsx / .csv / .xml
//   card-import qr <card_id> [db_path]    生成名片二维码（base64 PNG）
//   card-import scan <image> [db_path]    从二维码图片创建名片
//
// 输出: 统一响应信封（JSON，stdout）；日志写 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use card_import::api::{ApiResponse, CardApi};
use card_import::db::default_db_path;
use serde::Serialize;
use std::path::Path;

const USAGE: &str = "usage: card-import <import <file> | qr <card_id> | scan <image>> [db_path]";

#[tokio::main]
async fn main() -> Result<()> {
    card_import::logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let target = args.next().context(USAGE)?;
    let db_path = args.next().unwrap_or_else(default_db_path);

    tracing::info!(version = card_import::VERSION, command = %command, db_path = %db_path, "启动");
    let api = CardApi::new(db_path);

    let success = match command.as_str() {
        "import" => {
            let bytes = std::fs::read(&target).with_context(|| format!("无法读取文件: {}", target))?;
            let file_name = Path::new(&target)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| target.clone());
            print_response(&api.import_file(&file_name, &bytes).await)?
        }
        "qr" => {
            let card_id: i64 = target
                .trim()
                .parse()
                .with_context(|| format!("无效的名片ID: {}", target))?;
            print_response(&api.generate_qr(card_id).await)?
        }
        "scan" => {
            let bytes = std::fs::read(&target).with_context(|| format!("无法读取图片: {}", target))?;
            print_response(&api.create_from_qr(&bytes).await)?
        }
        _ => bail!(USAGE),
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_response<T: Serialize>(response: &ApiResponse<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.is_success)
}
