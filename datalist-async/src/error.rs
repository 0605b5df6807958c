use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Errors surfaced by data sources and the virtualizing bridge.
///
/// The type is `Clone` because a memoized fetch hands the same outcome to every caller waiting
/// on it, failures included.
#[derive(Clone, Debug, Error)]
pub enum DataListError {
    #[error("index {index} is out of range for a list of {count} items")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("destination has room for {available} items but {needed} are required")]
    DestinationTooSmall { needed: usize, available: usize },

    #[error("cannot modify a read-only collection")]
    ReadOnly,

    /// A fetch completed but did not carry the information the caller was waiting for.
    #[error("fetch result is missing {0}")]
    IncompleteResult(&'static str),

    #[error("page numbers start at 1, got {0}")]
    InvalidPage(usize),

    /// A fetch hook failed.
    #[error("fetch failed: {0}")]
    Fetch(#[source] Arc<dyn StdError + Send + Sync>),
}

impl DataListError {
    /// Wraps an error raised by a fetch hook.
    pub fn fetch(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Fetch(Arc::new(err))
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }
}

impl From<datalist::Error> for DataListError {
    fn from(err: datalist::Error) -> Self {
        match err {
            datalist::Error::IndexOutOfRange { index, len } => {
                Self::IndexOutOfRange { index, count: len }
            }
            datalist::Error::DestinationTooSmall { needed, available } => {
                Self::DestinationTooSmall { needed, available }
            }
            datalist::Error::ReadOnly => Self::ReadOnly,
        }
    }
}

pub type Result<T, E = DataListError> = std::result::Result<T, E>;
