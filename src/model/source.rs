use serde::{Deserialize, Serialize};

/// Where a piece of market data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

impl DataSource {
    pub fn is_fallback(self) -> bool {
        self == Self::Fallback
    }
}

/// A value tagged with its provenance, so callers can tell substituted
/// fallback data apart from a live provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub source: DataSource,
    pub data: T,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self {
            source: DataSource::Live,
            data,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            source: DataSource::Fallback,
            data,
        }
    }
}
