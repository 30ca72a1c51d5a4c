use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid image descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("dimension `{axis}` index {value} is outside extent {extent}")]
    DimensionOutOfRange {
        axis: String,
        value: usize,
        extent: usize,
    },

    #[error("unknown history path: {0}")]
    UnknownHistoryPath(String),

    #[error("invalid value for `{path}`: {reason}")]
    InvalidHistoryValue { path: String, reason: String },

    #[error("invalid color `{0}`: expected six hex digits")]
    InvalidColor(String),
}
