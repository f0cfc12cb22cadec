use std::fmt;
use std::path::PathBuf;

/// Errors raised while converting annotations.
///
/// Only `FatalConfiguration` aborts a run. `SkippableFile` is logged by the
/// pipeline and the batch moves on to the next input.
#[derive(Debug)]
pub enum ConvertError {
    SkippableFile { path: PathBuf, reason: String },
    FatalConfiguration(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    pub fn skip(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConvertError::SkippableFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ConvertError::FatalConfiguration(message.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::FatalConfiguration(_))
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConvertError::SkippableFile { path, reason } => {
                write!(f, "[SkippableFile] {}: {}", path.display(), reason)
            }
            ConvertError::FatalConfiguration(message) => {
                write!(f, "[FatalConfiguration] {}", message)
            }
            ConvertError::Io(e) => write!(f, "[Io] {}", e),
            ConvertError::Json(e) => write!(f, "[Json] {}", e),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Io(e) => Some(e),
            ConvertError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        ConvertError::Io(e)
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(e: serde_json::Error) -> Self {
        ConvertError::Json(e)
    }
}
