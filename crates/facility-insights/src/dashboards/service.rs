use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{Domain, ScoreAxis};
use super::filter::{
    apply_filter, cascade_options, entity_options_for, FilterOptions, FilterSelection,
};
use super::loader::{decode_payload, DatasetSource, LoadFailure, LoadRequest, RetryPolicy};
use super::notify::{FailureNotifier, LoadFailureNotice};
use super::report::views::DashboardSnapshot;
use super::report::{build_dashboard, export_csv};
use super::state::{DatasetSnapshot, DatasetStore, ReplaceOutcome};
use super::topics::TopicLayout;

/// Service composing the dataset source, the per-domain store and the
/// failure notifier.
pub struct DashboardService<S, N> {
    source: Arc<S>,
    notifier: Arc<N>,
    store: Arc<DatasetStore>,
    retry: RetryPolicy,
}

impl<S, N> DashboardService<S, N>
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    pub fn new(source: Arc<S>, notifier: Arc<N>, retry: RetryPolicy) -> Self {
        Self::with_store(source, notifier, Arc::new(DatasetStore::new()), retry)
    }

    pub fn with_store(
        source: Arc<S>,
        notifier: Arc<N>,
        store: Arc<DatasetStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            retry,
        }
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    /// Fetch, validate and install a dataset. On failure the current snapshot
    /// is left untouched and exactly one notice is published.
    pub async fn load(&self, request: LoadRequest) -> Result<Arc<DatasetSnapshot>, DashboardError> {
        let domain = request.domain;
        let ticket = self.store.begin_load(domain);

        let source = self.source.as_ref();
        let request = &request;
        let fetched = self
            .retry
            .run(move || source.fetch(request))
            .await
            .and_then(|payload| decode_payload(domain, payload));

        let records = match fetched {
            Ok(records) => records,
            Err(failure) => {
                warn!(%domain, kind = ?failure.kind(), error = %failure, "dataset load failed");
                if let Err(err) = self.notifier.publish(LoadFailureNotice::new(domain, &failure)) {
                    warn!(%domain, error = %err, "failed to publish load failure notice");
                }
                return Err(DashboardError::Load(failure));
            }
        };

        match self.store.replace_dataset(ticket, records) {
            ReplaceOutcome::Applied(snapshot) => {
                info!(
                    %domain,
                    records = snapshot.records.len(),
                    sequence = snapshot.sequence,
                    "dataset loaded"
                );
                Ok(snapshot)
            }
            ReplaceOutcome::Stale { current_sequence } => {
                warn!(
                    %domain,
                    sequence = ticket.sequence,
                    current_sequence,
                    "discarding stale dataset response"
                );
                self.snapshot(domain)
            }
        }
    }

    /// Reload a domain without server-side pre-filters.
    pub async fn refresh(&self, domain: Domain) -> Result<Arc<DatasetSnapshot>, DashboardError> {
        self.load(LoadRequest::new(domain)).await
    }

    /// Current snapshot, loading it first when the domain was never loaded.
    pub async fn ensure_loaded(
        &self,
        domain: Domain,
    ) -> Result<Arc<DatasetSnapshot>, DashboardError> {
        match self.store.current(domain) {
            Some(snapshot) => Ok(snapshot),
            None => self.refresh(domain).await,
        }
    }

    pub fn snapshot(&self, domain: Domain) -> Result<Arc<DatasetSnapshot>, DashboardError> {
        self.store
            .current(domain)
            .ok_or(DashboardError::NotLoaded(domain))
    }

    pub fn dashboard(
        &self,
        domain: Domain,
        selection: &FilterSelection,
    ) -> Result<DashboardSnapshot, DashboardError> {
        let snapshot = self.snapshot(domain)?;
        Ok(build_dashboard(&snapshot, selection))
    }

    /// Filter options; entity names cascade from `districts` when any are given.
    pub fn options(
        &self,
        domain: Domain,
        districts: &BTreeSet<String>,
    ) -> Result<FilterOptions, DashboardError> {
        let snapshot = self.snapshot(domain)?;
        let selection = FilterSelection {
            districts: districts.clone(),
            entity_names: BTreeSet::new(),
        };
        Ok(cascade_options(&snapshot.records, &selection))
    }

    /// Entity names selectable under `districts`.
    pub fn entity_options(
        &self,
        domain: Domain,
        districts: &BTreeSet<String>,
    ) -> Result<Vec<String>, DashboardError> {
        let snapshot = self.snapshot(domain)?;
        Ok(entity_options_for(&snapshot.records, districts))
    }

    pub fn export_csv(
        &self,
        domain: Domain,
        axis: ScoreAxis,
        selection: &FilterSelection,
    ) -> Result<Vec<u8>, DashboardError> {
        let snapshot = self.snapshot(domain)?;
        let view = apply_filter(&snapshot.records, selection);
        let layout = TopicLayout::for_domain(domain, axis);
        Ok(export_csv(domain, layout, &view)?)
    }
}

/// Error raised by the dashboard service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadFailure),
    #[error("no {0} dataset has been loaded yet")]
    NotLoaded(Domain),
    #[error("failed to write csv export: {0}")]
    Export(#[from] csv::Error),
}
