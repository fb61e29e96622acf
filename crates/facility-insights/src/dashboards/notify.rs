use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::Domain;
use super::loader::{LoadFailure, LoadFailureKind};

/// User-facing notice raised once per failed dataset load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFailureNotice {
    pub domain: Domain,
    pub kind: LoadFailureKind,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl LoadFailureNotice {
    pub fn new(domain: Domain, failure: &LoadFailure) -> Self {
        Self {
            domain,
            kind: failure.kind(),
            message: failure.to_string(),
            occurred_at: Utc::now(),
        }
    }

    /// Short text for a toast or banner.
    pub fn headline(&self) -> String {
        format!(
            "Failed to load {} data ({})",
            self.domain.label().to_lowercase(),
            self.kind.label()
        )
    }
}

/// Outbound hook for load failures (UI banner feed, log sink, pager...).
pub trait FailureNotifier: Send + Sync {
    fn publish(&self, notice: LoadFailureNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}
