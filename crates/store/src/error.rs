use std::fmt;
use std::path::PathBuf;

/// Error type for store persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the preferences file failed
    Io { path: PathBuf, message: String },
    /// Values could not be encoded as JSON
    Serialize(String),
    /// The preferences file is not valid JSON of the expected shape
    Parse { path: PathBuf, message: String },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), message: err.to_string() }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "I/O error on {}: {message}", path.display()),
            Self::Serialize(msg) => write!(f, "cannot encode preferences: {msg}"),
            Self::Parse { path, message } => {
                write!(f, "cannot parse {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}
