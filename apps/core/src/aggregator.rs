use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::discovery::{AuxiliaryRegistry, OwnerProcess, WindowSource};
use crate::model::{Candidate, RawCandidate, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Started,
    AlreadyRunning,
}

/// Builds candidate snapshots from the registered sources.
///
/// At most one refresh pass runs at a time. Readers always get the last
/// completed snapshot; a pass in progress is never visible.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

struct Inner {
    primary: Box<dyn WindowSource>,
    auxiliary: AuxiliaryRegistry,
    state: Mutex<RefreshState>,
    published: ArcSwap<Snapshot>,
    subscribers: Mutex<Vec<Sender<Arc<Snapshot>>>>,
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    generation: u64,
}

/// Clears the in-flight flag when the pass ends, however it ends.
struct RefreshGuard {
    inner: Arc<Inner>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.inner.state.lock().refreshing = false;
    }
}

impl Aggregator {
    pub fn new(primary: Box<dyn WindowSource>, auxiliary: AuxiliaryRegistry) -> Self {
        Self {
            inner: Arc::new(Inner {
                primary,
                auxiliary,
                state: Mutex::new(RefreshState::default()),
                published: ArcSwap::new(Snapshot::empty()),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Starts a pass on the rayon pool and returns immediately.
    pub fn refresh(&self) -> RefreshOutcome {
        let Some(guard) = self.try_begin() else {
            debug!("refresh skipped; pass already in flight");
            return RefreshOutcome::AlreadyRunning;
        };

        rayon::spawn(move || {
            guard.inner.run_pass();
            drop(guard);
        });
        RefreshOutcome::Started
    }

    /// Runs a pass on the calling thread. `None` if another pass is in flight.
    pub fn refresh_blocking(&self) -> Option<Arc<Snapshot>> {
        let guard = self.try_begin()?;
        let snapshot = guard.inner.run_pass();
        drop(guard);
        Some(snapshot)
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.state.lock().refreshing
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.inner.published.load_full()
    }

    /// Receives every snapshot published after this call.
    pub fn subscribe(&self) -> Receiver<Arc<Snapshot>> {
        let (tx, rx) = unbounded();
        self.inner.subscribers.lock().push(tx);
        rx
    }

    fn try_begin(&self) -> Option<RefreshGuard> {
        let mut state = self.inner.state.lock();
        if state.refreshing {
            return None;
        }
        state.refreshing = true;
        Some(RefreshGuard {
            inner: Arc::clone(&self.inner),
        })
    }
}

impl Inner {
    fn run_pass(&self) -> Arc<Snapshot> {
        let owners = match self.primary.owners() {
            Ok(owners) => owners,
            Err(error) => {
                warn!(source = self.primary.source_name(), %error, "owner listing failed");
                Vec::new()
            }
        };

        let mut seen_keys = HashSet::new();
        let mut merged: Vec<RawCandidate> = self
            .collect_primary(&owners)
            .into_iter()
            .filter(|raw| !raw.is_blank())
            .filter(|raw| raw.native_key.map_or(true, |key| seen_keys.insert(key)))
            .collect();

        merged.extend(
            self.auxiliary
                .enumerate_sub_items(&owners)
                .into_iter()
                .filter(|raw| !raw.is_blank()),
        );

        let candidates = merged
            .into_iter()
            .enumerate()
            .map(|(id, raw)| Candidate::from_raw(id, raw))
            .collect();

        self.publish(candidates)
    }

    /// Fans out one task per owner and merges the results back in owner order.
    fn collect_primary(&self, owners: &[OwnerProcess]) -> Vec<RawCandidate> {
        let (tx, rx) = unbounded::<(usize, Vec<RawCandidate>)>();

        owners
            .par_iter()
            .enumerate()
            .for_each_with(tx, |tx, (unit, owner)| {
                let windows = match self.primary.enumerate_owner(owner) {
                    Ok(windows) => windows,
                    Err(error) => {
                        warn!(
                            source = self.primary.source_name(),
                            pid = owner.pid,
                            owner = %owner.name,
                            %error,
                            "owner enumeration failed"
                        );
                        Vec::new()
                    }
                };
                // The receiver outlives every sender, so this cannot fail.
                let _ = tx.send((unit, windows));
            });

        let mut units: Vec<(usize, Vec<RawCandidate>)> = rx.into_iter().collect();
        units.sort_by_key(|(unit, _)| *unit);
        units.into_iter().flat_map(|(_, windows)| windows).collect()
    }

    fn publish(&self, candidates: Vec<Candidate>) -> Arc<Snapshot> {
        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.generation
        };

        let snapshot = Arc::new(Snapshot::new(generation, candidates));
        self.published.store(Arc::clone(&snapshot));
        self.subscribers
            .lock()
            .retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());

        info!(generation, candidates = snapshot.len(), "snapshot published");
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::Aggregator;
    use crate::discovery::{AuxiliaryRegistry, StaticWindowSource};

    #[test]
    fn fresh_aggregator_publishes_empty_snapshot() {
        let aggregator = Aggregator::new(Box::new(StaticWindowSource::empty()), AuxiliaryRegistry::new());
        let snapshot = aggregator.current_snapshot();
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.is_empty());
        assert!(!aggregator.is_refreshing());
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_publish() {
        let aggregator = Aggregator::new(Box::new(StaticWindowSource::empty()), AuxiliaryRegistry::new());
        drop(aggregator.subscribe());
        let kept = aggregator.subscribe();

        aggregator.refresh_blocking().expect("pass should run");

        assert_eq!(aggregator.inner.subscribers.lock().len(), 1);
        assert_eq!(kept.try_recv().expect("snapshot should arrive").generation, 1);
    }
}
