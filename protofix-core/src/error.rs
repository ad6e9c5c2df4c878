/// Error type for pipeline results. Exit code 2 = bad configuration, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid exclusion glob `{pattern}`: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::InvalidGlob { .. } => 2,
            ToolError::Internal(_) => 1,
        }
    }
}
