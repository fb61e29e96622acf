use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::domain::Domain;
use super::record::FacilityRecord;

/// Immutable dataset for one domain as returned by a single successful load.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub domain: Domain,
    pub records: Vec<FacilityRecord>,
    pub loaded_at: DateTime<Utc>,
    /// Ticket of the load that produced this snapshot.
    pub sequence: u64,
}

/// Issued before a load starts; orders concurrent loads of one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub domain: Domain,
    pub sequence: u64,
}

#[derive(Debug)]
pub enum ReplaceOutcome {
    Applied(Arc<DatasetSnapshot>),
    /// A load issued later has already been applied; the result was dropped.
    Stale { current_sequence: u64 },
}

#[derive(Debug, Default)]
struct DomainSlot {
    issued: AtomicU64,
    current: RwLock<Option<Arc<DatasetSnapshot>>>,
}

/// Current dataset per domain. Readers clone the `Arc` and work lock-free;
/// writers swap the pointer under a short write lock, so a snapshot is
/// either wholly visible or not at all.
#[derive(Debug)]
pub struct DatasetStore {
    slots: HashMap<Domain, DomainSlot>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    pub fn new() -> Self {
        let slots = Domain::ordered()
            .into_iter()
            .map(|domain| (domain, DomainSlot::default()))
            .collect();
        Self { slots }
    }

    fn slot(&self, domain: Domain) -> &DomainSlot {
        // every domain gets a slot in `new`
        &self.slots[&domain]
    }

    pub fn current(&self, domain: Domain) -> Option<Arc<DatasetSnapshot>> {
        self.slot(domain)
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn begin_load(&self, domain: Domain) -> LoadTicket {
        let sequence = self.slot(domain).issued.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { domain, sequence }
    }

    /// Install `records` as the domain's dataset unless a later-issued load
    /// has already landed.
    pub fn replace_dataset(
        &self,
        ticket: LoadTicket,
        records: Vec<FacilityRecord>,
    ) -> ReplaceOutcome {
        let mut current = self
            .slot(ticket.domain)
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = current.as_ref() {
            if existing.sequence > ticket.sequence {
                return ReplaceOutcome::Stale {
                    current_sequence: existing.sequence,
                };
            }
        }

        let snapshot = Arc::new(DatasetSnapshot {
            domain: ticket.domain,
            records,
            loaded_at: Utc::now(),
            sequence: ticket.sequence,
        });
        *current = Some(snapshot.clone());
        ReplaceOutcome::Applied(snapshot)
    }
}
