/// Shared error type used across all Sindri crates.
///
/// `ParserNoMatch` is deliberately absent: per spec, "no tool calls
/// detected" is not an error, it's an empty `Vec` return from the parser.
/// `CheckpointWriteFailed` likewise never reaches the caller as an `Err` —
/// the recovery manager logs a `tracing::warn!` and returns a best-effort
/// bool instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("database: {0}")]
    Database(String),

    #[error("model {model} unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    #[error("model {model} returned a malformed response: {message}")]
    ModelProtocolError { model: String, message: String },

    #[error(
        "VRAM exhausted: need {needed_gb:.1} GB, only {available_gb:.1} GB free after eviction"
    )]
    VRAMExhausted { needed_gb: f64, available_gb: f64 },

    #[error("unknown tool: {0}")]
    ToolUnknown(String),

    #[error("invalid arguments for tool {tool}: {message}")]
    ToolInvalidArgs { tool: String, message: String },

    #[error("tool {tool} failed: {message}")]
    ToolExecutionFailed { tool: String, message: String },

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("agent is stuck after {nudges} nudges")]
    StuckAgent { nudges: u32 },

    #[error("task reached max_iterations ({0})")]
    MaxIterations(u32),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
