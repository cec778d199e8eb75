use std::path::PathBuf;
use thiserror::Error;

/// Everything that prevents producing both charts.
/// None of these are recoverable, the caller reports and exits.
#[derive(Debug, Error)]
pub enum MpuPlotError {
    /// The sample table does not have the expected shape.
    #[error("invalid input: {reason}; check the file content and the number of columns")]
    InvalidInput { reason: String },

    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read csv record: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not render chart '{chart}': {reason}")]
    Render { chart: String, reason: String },
}

impl MpuPlotError {
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        MpuPlotError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        MpuPlotError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MpuPlotError::InvalidInput { .. })
    }
}
