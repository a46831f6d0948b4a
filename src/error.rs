use std::path::PathBuf;

/// Failure of a conversion, split by the side that failed.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The source is missing, unreadable, or not a valid image.
    #[error("Failed to decode {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    /// The destination format is unknown or the file can't be written.
    #[error("Failed to encode {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
impl ConvertError {
    pub(crate) fn decode(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn encode(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Encode {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Decode { path, .. } | Self::Encode { path, .. } => path,
        }
    }
}
