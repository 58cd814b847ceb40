//! Error types for report assembly and transport.

/// Result type for report assembly.
pub type ReportResult<T> = Result<T, ReportError>;

/// Failure reported by a chart renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    #[error("Nothing to plot for '{0}'")]
    EmptySeries(String),

    #[error("Chart backend error: {0}")]
    Backend(String),
}

/// Failure reported by a document renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("Document rendering failed: {0}")]
    Render(String),
}

/// A report could not be built. Nothing is retried and no partial report is
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to render chart '{chart}': {source}")]
    Chart {
        chart: String,
        #[source]
        source: ChartError,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// The flat transport map could not be turned back into a report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Missing transport key '{0}'")]
    MissingKey(String),

    #[error("Malformed transport key '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("Unsupported transport version '{0}'")]
    UnsupportedVersion(String),

    #[error("Transport checksum mismatch")]
    ChecksumMismatch,
}

impl TransportError {
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        TransportError::Malformed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Transport key the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            TransportError::MissingKey(key) | TransportError::Malformed { key, .. } => Some(key),
            _ => None,
        }
    }
}
