use std::time::Duration;

/// Why a data source could not be turned into a dataset.
///
/// These never escape the store: callers get an empty dataset and the error
/// is logged.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch `{source_id}`: {reason}")]
    Fetch { source_id: String, reason: String },

    #[error("loading `{source_id}` exceeded {timeout:?}")]
    Timeout { source_id: String, timeout: Duration },

    #[error("failed to parse `{source_id}`: {reason}")]
    Parse { source_id: String, reason: String },
}

impl LoadError {
    pub fn fetch(source_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch { source_id: source_id.into(), reason: reason.to_string() }
    }

    pub fn parse(source_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse { source_id: source_id.into(), reason: reason.to_string() }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
