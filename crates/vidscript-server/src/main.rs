//! vidscript: short-video script assistant backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vidscript_core::{AppConfig, DataPaths, MatchStrategy};
use vidscript_extract::{decode_upload, extract_product_info_with};
use vidscript_llm::{extract_product_info_with_ai, AiParser, LLMConfig};
use vidscript_server::{build_router, AppState};
use vidscript_store::ScriptStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("VIDSCRIPT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("vidscript: short-video script assistant backend");
    println!();
    println!("Usage: vidscript [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve                          Start the server");
    println!("  extract <file> [--strategy S] [--ai]    Extract product info from a brief");
    println!("  help                                    Show this help message");
    println!();
    println!("Strategies: first-match, most-matches (default)");
}

/// `vidscript extract <file> [--strategy first-match|most-matches] [--ai]`
async fn run_extract(args: &[String]) -> anyhow::Result<()> {
    let mut file: Option<&str> = None;
    let mut strategy = MatchStrategy::default();
    let mut use_ai = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ai" => use_ai = true,
            "--strategy" => {
                let raw = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--strategy needs a value"))?;
                strategy = raw.parse()?;
            }
            other if file.is_none() => file = Some(other),
            other => anyhow::bail!("Unexpected argument: {}", other),
        }
    }
    let file = file.ok_or_else(|| anyhow::anyhow!("Usage: vidscript extract <file>"))?;

    let bytes = std::fs::read(file)?;
    let filename = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    let text = decode_upload(filename, &bytes)?;

    let info = if use_ai {
        let paths = DataPaths::new(resolve_data_dir())?;
        let llm_config = LLMConfig::load(&paths.llm_config_file);
        let parser = AiParser::from_config(&llm_config, strategy);
        let extraction = extract_product_info_with_ai(&parser, &text, strategy).await;
        info!(
            "Extraction source={:?} confidence={:?}",
            extraction.source, extraction.confidence
        );
        extraction.info
    } else {
        extract_product_info_with(&text, strategy)
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "extract" => return run_extract(&args[2..]).await,
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'vidscript help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = AppConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = ScriptStore::open(&config.data_paths.database)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let state = Arc::new(AppState::new(config, store));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("vidscript server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
