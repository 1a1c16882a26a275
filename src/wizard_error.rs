use thiserror::Error;

/// Page-level failures. None of these crash the wizard; each ends up in a status message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Failed to fetch. The local server may have stopped. Please restart the app. ({0})")]
    Network(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Operation timed out after {attempts} status checks")]
    OperationTimeout { attempts: u32 },

    #[error("{0}")]
    OperationFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid theme file: {0}")]
    InvalidTheme(String),

    #[error("Theme file I/O failed: {0}")]
    Io(String),
}
