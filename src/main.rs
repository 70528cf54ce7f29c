use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sketchwright::agent::ChatClient;
use sketchwright::config::Config;
use sketchwright::fonts::load_font_database;
use sketchwright::server::{AppState, serve};
use sketchwright::tools::Variant;

/// Natural-language drawing service
#[derive(Parser, Debug)]
#[command(name = "sketchwright")]
#[command(version)]
#[command(about = "Serve an LLM drawing agent that returns PNG images over HTTP", long_about = None)]
struct Args {
    /// Path to a config file (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Tool palette used when a request does not name one
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Base URL of the OpenAI-compatible model server
    #[arg(long, value_name = "URL")]
    llm_url: Option<String>,

    /// Model name sent with every completion request
    #[arg(long)]
    model: Option<String>,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => {
            if !path.is_file() {
                return Err(format!("Config file not found: {}", path.display()));
            }
            Config::load(path).map_err(|e| e.to_string())?
        }
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(variant) = args.variant {
        config.agent.variant = variant;
    }
    if let Some(url) = args.llm_url {
        config.llm.base_url = url;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }
    if config.llm.api_key.is_none() {
        config.llm.api_key = std::env::var("SKETCHWRIGHT_API_KEY").ok();
    }

    log::info!(
        "model {} at {}, default variant {}",
        config.llm.model,
        config.llm.base_url,
        config.agent.variant.name()
    );

    let fonts = load_font_database();
    let chat = Arc::new(ChatClient::new(&config.llm));
    let state = Arc::new(AppState::new(config, fonts, chat));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;
    runtime.block_on(serve(state))
}
