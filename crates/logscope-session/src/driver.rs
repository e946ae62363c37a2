use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::action::{FetchOutcome, FetchRequest};
use crate::dispatch::FetchDispatcher;
use crate::state::Session;
use logscope_client::LogBackend;

/// Couples a [`Session`] with the dispatcher that performs its fetches
pub struct SessionDriver {
    session: Session,
    dispatcher: FetchDispatcher,
    outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl SessionDriver {
    pub fn new(backend: Arc<dyn LogBackend>, page_size: usize) -> Self {
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();
        Self {
            session: Session::new(page_size),
            dispatcher: FetchDispatcher::new(backend, outcome_tx),
            outcomes,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// For synchronous transitions such as filtering and paging
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn mount(&mut self) {
        let requests = self.session.mount();
        self.dispatch(requests);
    }

    pub fn select_schema(&mut self, schema_id: impl Into<String>) {
        let requests = self.session.select_schema(schema_id);
        self.dispatch(requests);
    }

    pub fn select_module(&mut self, module_name: impl Into<String>) {
        let requests = self.session.select_module(module_name);
        self.dispatch(requests);
    }

    pub fn refresh(&mut self) {
        let requests = self.session.refresh();
        self.dispatch(requests);
    }

    /// Wait for the next fetch outcome and apply it.
    ///
    /// Returns `false` once nothing is left in flight.
    pub async fn step(&mut self) -> bool {
        if self.dispatcher.in_flight() == 0 && self.outcomes.is_empty() {
            return false;
        }
        match self.outcomes.recv().await {
            Some(outcome) => {
                let requests = self.session.apply(outcome);
                self.dispatch(requests);
                true
            }
            None => false,
        }
    }

    /// Apply outcomes until the session stops loading
    pub async fn settle(&mut self) {
        while self.session.is_loading() {
            if !self.step().await {
                warn!(phase = ?self.session.phase(), "no fetch left in flight while loading");
                break;
            }
        }
    }

    /// Cancel in-flight fetches
    pub fn stop(&mut self) {
        self.dispatcher.stop();
    }

    fn dispatch(&mut self, requests: Vec<FetchRequest>) {
        self.dispatcher.dispatch_all(requests);
    }
}
