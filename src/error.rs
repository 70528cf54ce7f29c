//! Error types shared across the drawing, agent and service layers.

use thiserror::Error;

/// Result type for anything that paints onto a canvas or dispatches a tool.
pub type DrawResult<T> = Result<T, DrawError>;

/// Drawing failures.
///
/// These are reported back to the calling agent as text rather than aborting
/// the request, so every variant carries a message an LLM can act on.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("Canvas not created. Call create_canvas first")]
    CanvasNotInitialized,

    #[error("Need at least {required} points for {shape}, got {got}")]
    InsufficientPoints {
        shape: &'static str,
        required: usize,
        got: usize,
    },

    #[error("Invalid canvas dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Failures talking to the hosted model.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    Transport(String),

    #[error("LLM API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

impl From<ureq::Error> for AgentError {
    fn from(err: ureq::Error) -> Self {
        AgentError::Transport(err.to_string())
    }
}

/// Failures loading the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file {path} as TOML or YAML")]
    Parse { path: String },
}
