use clap::Parser;
use serde::Deserialize;
use sketchwright::config::Config;
use sketchwright::fonts::load_font_database;
use sketchwright::session::{DrawingSession, ToolCall};
use sketchwright::tools::Variant;
use std::path::PathBuf;

/// Replay a script of drawing tool calls and save the canvas as PNG
#[derive(Parser, Debug)]
#[command(name = "sketchwright-render")]
#[command(version)]
#[command(about = "Render a JSON script of drawing tool calls to a PNG image", long_about = None)]
struct Args {
    /// Input .json script (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Tool palette, overriding the script's
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Config file (TOML or YAML) supplying planner constants
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Deserialize)]
struct Script {
    #[serde(default)]
    variant: Variant,
    calls: Vec<ToolCall>,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    let source = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let script: Script =
        serde_json::from_str(&source).map_err(|e| format!("Failed to parse script: {}", e))?;
    let variant = args.variant.unwrap_or(script.variant);

    let mut session = DrawingSession::new(variant, load_font_database(), config.planner)
        .map_err(|e| e.to_string())?;
    for call in &script.calls {
        let outcome = session.invoke(call);
        eprintln!("{}: {}", call.name, outcome);
    }

    let canvas = session
        .canvas()
        .ok_or("Script never created a canvas (call create_canvas first)")?;
    let png_data = canvas.encode_png().map_err(|e| e.to_string())?;
    std::fs::write(&args.output, png_data).map_err(|e| format!("Failed to write PNG: {}", e))?;
    eprintln!("PNG saved to: {}", args.output.display());

    Ok(())
}
