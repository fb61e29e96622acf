//! Facility need dashboards for hospitals, schools and preschools.
//!
//! Datasets are fetched per domain, validated, and kept as immutable
//! snapshots. Every view (summary cards, charts, tables, map, filter
//! options) is a pure reduction of a snapshot under a [`FilterSelection`],
//! so the pipeline runs headless and the HTTP router only renders it.

pub mod aggregate;
pub mod domain;
pub mod filter;
pub mod loader;
pub mod notify;
pub mod record;
pub mod report;
pub mod router;
pub mod service;
pub mod state;
pub mod topics;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, aggregate_all, AggregateResult, NeedDistribution};
pub use domain::{classify, Domain, NeedCategory, ScoreAxis, UnknownAxis, UnknownDomain};
pub use filter::{apply_filter, cascade_options, compute_options, FilterOptions, FilterSelection};
pub use loader::{
    BackendSource, CsvDatasetSource, DatasetSource, HttpDatasetSource, LoadFailure,
    LoadFailureKind, LoadRequest, RetryPolicy,
};
pub use notify::{FailureNotifier, LoadFailureNotice, NoticeError};
pub use record::FacilityRecord;
pub use report::views::DashboardSnapshot;
pub use router::dashboard_router;
pub use service::{DashboardError, DashboardService};
pub use state::{DatasetSnapshot, DatasetStore};
pub use topics::TopicLayout;
