use thiserror::Error;

/// Main error type for parlance operations
#[derive(Error, Debug)]
pub enum ParlanceError {
    /// Malformed query input. The original query string is kept in the
    /// message so callers can trace a failure back to what the user typed.
    #[error("[{input}] : {msg}")]
    Parse { input: String, msg: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid field value for {field}: {value} ({detail})")]
    InvalidFieldValue {
        field: String,
        value: String,
        detail: String,
    },

    #[error("Dialect error: {0}")]
    Dialect(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for parlance operations
pub type Result<T> = std::result::Result<T, ParlanceError>;

impl ParlanceError {
    /// Build a parse error carrying the original input string.
    pub fn parse(input: impl Into<String>, msg: impl Into<String>) -> Self {
        ParlanceError::Parse {
            input: input.into(),
            msg: msg.into(),
        }
    }

    /// Check if this error came from the parse phase (as opposed to field
    /// validation, dialect rendering, or construction).
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ParlanceError::Parse { .. })
    }

    /// Check if this error relates to the field registry
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            ParlanceError::UnknownField(_) | ParlanceError::InvalidFieldValue { .. }
        )
    }
}
