use facility_insights::dashboards::{FailureNotifier, LoadFailureNotice, NoticeError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

const NOTICE_CAPACITY: usize = 50;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) notices: InMemoryFailureNotifier,
}

/// Keeps the most recent load failure notices for the banner feed and
/// mirrors each one to the log.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFailureNotifier {
    events: Arc<Mutex<VecDeque<LoadFailureNotice>>>,
}

impl FailureNotifier for InMemoryFailureNotifier {
    fn publish(&self, notice: LoadFailureNotice) -> Result<(), NoticeError> {
        warn!(
            domain = %notice.domain,
            kind = notice.kind.label(),
            message = %notice.message,
            "{}",
            notice.headline()
        );
        let mut guard = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.len() == NOTICE_CAPACITY {
            guard.pop_front();
        }
        guard.push_back(notice);
        Ok(())
    }
}

impl InMemoryFailureNotifier {
    /// Notices, newest first.
    pub(crate) fn recent(&self) -> Vec<LoadFailureNotice> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facility_insights::dashboards::{Domain, LoadFailure};

    #[test]
    fn keeps_newest_notices_within_capacity() {
        let notifier = InMemoryFailureNotifier::default();
        for attempt in 0..(NOTICE_CAPACITY + 5) {
            let failure = LoadFailure::Network(format!("attempt {attempt}"));
            notifier
                .publish(LoadFailureNotice::new(Domain::Hospital, &failure))
                .expect("publish");
        }

        let recent = notifier.recent();
        assert_eq!(recent.len(), NOTICE_CAPACITY);
        assert_eq!(
            recent[0].message,
            format!("network error: attempt {}", NOTICE_CAPACITY + 4)
        );
    }
}
