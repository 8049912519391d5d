// Error types shared by the library and the binary.
//
// Every failure is sorted into a category the binary can turn into an exit
// code: authentication, resolution (not found), validation and remote.

use crate::size::SizeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("quota not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("invalid size: {0}")]
    Size(#[from] SizeError),

    #[error("request rejected by cluster (HTTP {status})")]
    Api { status: u16, messages: Vec<String> },

    #[error("remote call failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ToolError>;

impl ToolError {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Config(_) | ToolError::Io(_) => 1,
            ToolError::Auth(_) => 2,
            ToolError::NotFound(_) => 3,
            ToolError::Validation(_) | ToolError::Size(_) => 4,
            ToolError::Api { .. } | ToolError::Transport(_) => 5,
        }
    }

    /// Lines to show the operator. The cluster may return several messages
    /// for one rejected request; each gets its own line.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            ToolError::Api { messages, .. } if !messages.is_empty() => messages
                .iter()
                .map(|m| format!("ERROR:  {}", m))
                .collect(),
            ToolError::Validation(msg) => vec![msg.clone()],
            other => vec![format!("error: {}", other)],
        }
    }
}
