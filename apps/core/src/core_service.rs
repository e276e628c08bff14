use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::activation::ActivationTarget;
use crate::aggregator::{Aggregator, RefreshOutcome};
use crate::config::{validate, Config, ConfigError};
use crate::discovery::{AuxiliaryRegistry, WindowSource};
use crate::history::{open_persistence, HistoryError, HistoryStore};
use crate::model::{ScoredCandidate, Snapshot};
use crate::pipeline::{ResultPipeline, SearchPage};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("history error: {0}")]
    History(#[from] HistoryError),
}

/// The switcher core: candidate aggregation, ranking session and search
/// history, created once at startup and handed to whoever drives the UI.
pub struct SwitcherService {
    config: Config,
    aggregator: Aggregator,
    history: Mutex<HistoryStore>,
    session: Mutex<ResultPipeline>,
}

impl SwitcherService {
    pub fn new(config: Config, aggregator: Aggregator, history: HistoryStore) -> Result<Self, ServiceError> {
        validate(&config)?;
        let session = ResultPipeline::new(config.initial_result_limit);
        Ok(Self {
            config,
            aggregator,
            history: Mutex::new(history),
            session: Mutex::new(session),
        })
    }

    /// Builds the aggregator from `primary`/`auxiliary` and opens the configured history backend.
    pub fn from_config(
        config: Config,
        primary: Box<dyn WindowSource>,
        auxiliary: AuxiliaryRegistry,
    ) -> Result<Self, ServiceError> {
        validate(&config)?;
        let persistence = open_persistence(&config)?;
        let history = HistoryStore::open(persistence, config.max_history_entries);
        Self::new(config, Aggregator::new(primary, auxiliary), history)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn refresh(&self) -> RefreshOutcome {
        self.aggregator.refresh()
    }

    pub fn refresh_blocking(&self) -> Option<Arc<Snapshot>> {
        self.aggregator.refresh_blocking()
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.aggregator.current_snapshot()
    }

    pub fn subscribe(&self) -> Receiver<Arc<Snapshot>> {
        self.aggregator.subscribe()
    }

    /// Sets the query and ranks the latest snapshot against it.
    pub fn search(&self, query: &str) -> SearchPage {
        let mut session = self.session.lock();
        session.set_query(query);
        self.evaluate(&session)
    }

    /// Re-evaluates the current query, e.g. after a new snapshot arrived.
    pub fn current_page(&self) -> SearchPage {
        let session = self.session.lock();
        self.evaluate(&session)
    }

    pub fn expand_limit(&self) -> SearchPage {
        let mut session = self.session.lock();
        session.expand_limit();
        self.evaluate(&session)
    }

    pub fn result_limit(&self) -> usize {
        self.session.lock().result_limit()
    }

    pub fn move_selection(&self, delta: i32) -> usize {
        let mut session = self.session.lock();
        let len = self.evaluate(&session).results.len();
        session.move_selection(delta, len)
    }

    pub fn selected(&self) -> Option<ScoredCandidate> {
        let session = self.session.lock();
        let page = self.evaluate(&session);
        session.selected(&page).cloned()
    }

    pub fn accept_selected(&self) -> Option<ActivationTarget> {
        let index = self.session.lock().selected_index();
        self.accept_at(index)
    }

    /// Accepts the result at `index` of the current page: records the query
    /// in history and returns the activation target. Out of range is a no-op.
    pub fn accept_at(&self, index: usize) -> Option<ActivationTarget> {
        let session = self.session.lock();
        let page = self.evaluate(&session);
        let chosen = page.results.get(index)?;

        if !session.query().trim().is_empty() {
            self.history.lock().add_search(session.query());
        }
        Some(ActivationTarget::from(&chosen.candidate))
    }

    pub fn add_to_history(&self, query: &str) {
        self.history.lock().add_search(query);
    }

    pub fn recent_searches(&self, limit: usize) -> Vec<String> {
        self.history.lock().recent_searches(limit)
    }

    pub fn default_recent_searches(&self) -> Vec<String> {
        self.recent_searches(self.config.recent_searches_limit)
    }

    pub fn autocomplete(&self, query: &str) -> Option<String> {
        self.history.lock().autocomplete(query)
    }

    pub fn history_older(&self) -> Option<String> {
        let recent = self.default_recent_searches();
        self.session.lock().history_older(&recent)
    }

    pub fn history_newer(&self) -> Option<String> {
        let recent = self.default_recent_searches();
        self.session.lock().history_newer(&recent)
    }

    fn evaluate(&self, session: &ResultPipeline) -> SearchPage {
        session.evaluate(&self.current_snapshot(), self.config.parallel_rank_threshold)
    }
}
