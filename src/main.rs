// ==========================================
// 电商卖家库存决策支持系统 - 批处理入口
// ==========================================
// 用法:
//   seller-insight <client_id> [growth_factor] [--config <path>] [--forecast]
//
// 输出: JSON 载荷写到 stdout；日志走 stderr (RUST_LOG 控制级别)
// ==========================================

use seller_insight::api::{DashboardApi, ForecastApi};
use seller_insight::config::ClientConfigStore;
use seller_insight::db::default_state_db_path;
use seller_insight::repository::SqliteStateStore;
use seller_insight::{logging, APP_NAME, VERSION};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "clients.json";

struct CliArgs {
    client_id: String,
    growth_factor: Option<f64>,
    config_path: String,
    forecast: bool,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut client_id: Option<String> = None;
    let mut growth_factor: Option<f64> = None;
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut forecast = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = args.next().ok_or("--config 需要一个路径参数")?;
            }
            "--forecast" => forecast = true,
            "--help" | "-h" => {
                return Err(format!(
                    "{APP_NAME} v{VERSION}\n用法: seller-insight <client_id> [growth_factor] [--config <path>] [--forecast]"
                ));
            }
            other if client_id.is_none() => client_id = Some(other.to_string()),
            other if growth_factor.is_none() => {
                let g: f64 = other
                    .parse()
                    .map_err(|_| format!("增长系数必须是数字: {other}"))?;
                growth_factor = Some(g);
            }
            other => return Err(format!("无法识别的参数: {other}")),
        }
    }

    let client_id = client_id.ok_or("缺少 client_id 参数（--help 查看用法）")?;
    Ok(CliArgs {
        client_id,
        growth_factor,
        config_path,
        forecast,
    })
}

fn run(args: CliArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = Arc::new(ClientConfigStore::load(Path::new(&args.config_path))?);

    if args.forecast {
        let api = ForecastApi::new(config);
        let payload = api.forecast(&args.client_id, args.growth_factor)?;
        return Ok(serde_json::to_string_pretty(&payload)?);
    }

    let store = Arc::new(SqliteStateStore::new(&default_state_db_path())?);
    let api = DashboardApi::new(config, store);
    let payload = api.load(&args.client_id)?;
    Ok(serde_json::to_string_pretty(&payload)?)
}

fn main() -> ExitCode {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(version = VERSION, client_id = %args.client_id, "批处理启动");
    match run(args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "批处理失败");
            eprintln!("批处理失败: {e}");
            ExitCode::FAILURE
        }
    }
}
