use std::path::PathBuf;

use lexcon_constraints::ResolverError;
use thiserror::Error;

/// Errors raised while evaluating generation outputs
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("IO error: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse record at `{path}` line {line}: `{source}`")]
    Record {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to load tokenizer: `{0}`")]
    Tokenizer(#[from] tokenizers::Error),
    #[error("Failed to tokenize `{text}`: `{source}`")]
    Resolve {
        text: String,
        #[source]
        source: ResolverError,
    },
    #[error("Configuration error: `{0}`")]
    Config(#[from] config::ConfigError),
    #[error("Evaluation task failed: `{0}`")]
    Join(#[from] tokio::task::JoinError),
}
