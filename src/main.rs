// ==========================================
// 采购风险评估 - 命令行入口
// ==========================================
// 用法: procurement-risk [--db PATH] [--offline] <命令> [参数]
// 输出: 结果以 JSON 打印到 stdout, 日志写到 stderr
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;

use procurement_risk::config::ConfigManager;
use procurement_risk::db::{get_default_db_path, init_schema, open_sqlite_connection};
use procurement_risk::domain::SupplierFilter;
use procurement_risk::i18n::{t, t_with_args, DEFAULT_LOCALE};
use procurement_risk::{logging, FeedMode, RiskApi};

/// 文本生成服务密钥环境变量 (覆盖 config_kv 中的值)
const NARRATIVE_API_KEY_ENV: &str = "NARRATIVE_API_KEY";

struct CliArgs {
    db_path: String,
    mode: FeedMode,
    command: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut db_path = None;
    let mut mode = FeedMode::Live;
    let mut command = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                db_path = Some(iter.next().ok_or_else(|| anyhow!("--db 缺少路径参数"))?);
            }
            "--offline" => mode = FeedMode::Offline,
            _ => command.push(arg),
        }
    }

    Ok(CliArgs {
        db_path: db_path.unwrap_or_else(get_default_db_path),
        mode,
        command,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_id(raw: Option<&String>, name: &str) -> Result<i64> {
    let raw = raw.ok_or_else(|| anyhow!("缺少参数 {}", name))?;
    raw.parse::<i64>()
        .with_context(|| format!("{} 必须为整数: {}", name, raw))
}

/// 打开数据库, 加载配置, 组装 API
fn build_api(db_path: &str, mode: FeedMode) -> Result<RiskApi> {
    let conn = open_sqlite_connection(db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let mut config = ConfigManager::from_connection(conn.clone())?.load_analysis_config()?;
    if let Ok(key) = std::env::var(NARRATIVE_API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.narrative_api_key = key.trim().to_string();
        }
    }

    Ok(RiskApi::from_connection(conn, config, mode)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = parse_args(std::env::args().skip(1))?;
    let Some(command) = cli.command.first() else {
        eprintln!("{}", t(DEFAULT_LOCALE, "cli.usage"));
        return Ok(());
    };

    tracing::info!(
        version = procurement_risk::VERSION,
        db_path = %cli.db_path,
        command = %command,
        "{}",
        procurement_risk::APP_NAME
    );

    match command.as_str() {
        "init" => {
            let conn = open_sqlite_connection(&cli.db_path)?;
            init_schema(&conn)?;
            println!(
                "{}",
                t_with_args(
                    DEFAULT_LOCALE,
                    "cli.db_initialized",
                    &[("path", &cli.db_path)]
                )
            );
        }
        "config" => {
            let manager = ConfigManager::new(&cli.db_path)?;
            match (cli.command.get(1), cli.command.get(2)) {
                (Some(key), Some(value)) => {
                    manager.set_global_config_value(key, value)?;
                    // 写入后整体校验一次
                    manager.load_analysis_config()?;
                }
                (Some(key), None) => print_json(&manager.get_global_config_value(key)?)?,
                (None, _) => print_json(&manager.load_analysis_config()?)?,
            }
        }
        "suppliers" => {
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.list_suppliers(&SupplierFilter::default())?)?;
        }
        "analyze" => {
            let supplier_id = parse_id(cli.command.get(1), "SUPPLIER_ID")?;
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.analyze_supplier(supplier_id).await?)?;
        }
        "fleet" => {
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.analyze_fleet().await?)?;
        }
        "recommend" => {
            let user_id = parse_id(cli.command.get(1), "USER_ID")?;
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.recommend_for_user(user_id)?)?;
        }
        "overview" => {
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.suppliers_overview()?)?;
        }
        "country" => {
            let country = cli
                .command
                .get(1)
                .ok_or_else(|| anyhow!("缺少参数 COUNTRY"))?;
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.get_country_risk(country)?)?;
        }
        "refresh" => {
            let api = build_api(&cli.db_path, cli.mode)?;
            print_json(&api.refresh_country_signals().await?)?;
        }
        other => {
            eprintln!("{}", t(DEFAULT_LOCALE, "cli.usage"));
            bail!("未知命令: {}", other);
        }
    }

    Ok(())
}
