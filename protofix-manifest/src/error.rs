use thiserror::Error;

/// Failures while producing a dependency manifest. All of them are fatal.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no command configured for {tool}")]
    EmptyCommand { tool: String },

    /// The tool binary could not be started (usually: not installed).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and reported failure.
    #[error("`{command}` exited with {status}: {stderr}")]
    ToolFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("invalid FileDescriptorSet: {message}")]
    Decode { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
