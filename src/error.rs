use thiserror::Error;

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Failures that stop a caller before validation starts.
///
/// Problems *inside* a layout document are never reported through this type;
/// they become [`Violation`](crate::violation::Violation)s.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid rule override '{key}': {reason}")]
    InvalidOverride { key: String, reason: String },
}
