use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::{FetchOutcome, FetchRequest, LogScope};
use logscope_client::LogBackend;
use logscope_logs::{ModuleListShape, normalize_logs, normalize_modules, normalize_schemas};

/// Runs fetch requests against a backend and reports normalized outcomes
pub struct FetchDispatcher {
    backend: Arc<dyn LogBackend>,

    /// Where completed fetches are sent
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,

    /// Cancellation token for in-flight fetches
    cancel: CancellationToken,

    /// Fetch task handles
    tasks: Vec<JoinHandle<()>>,
}

impl FetchDispatcher {
    pub fn new(
        backend: Arc<dyn LogBackend>,
        outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    ) -> Self {
        Self {
            backend,
            outcome_tx,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Spawn one fetch. Its outcome arrives on the outcome channel.
    pub fn dispatch(&mut self, request: FetchRequest) {
        self.tasks.retain(|t| !t.is_finished());

        let backend = Arc::clone(&self.backend);
        let outcome_tx = self.outcome_tx.clone();
        let cancel = self.cancel.clone();

        debug!(?request, "dispatching fetch");
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                outcome = run(backend.as_ref(), request) => {
                    // Receiver gone means the session is shutting down
                    let _ = outcome_tx.send(outcome);
                }
            }
        });
        self.tasks.push(task);
    }

    pub fn dispatch_all(&mut self, requests: impl IntoIterator<Item = FetchRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    /// Cancel every in-flight fetch
    pub fn stop(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        // Fresh token for later fetches
        self.cancel = CancellationToken::new();
    }

    /// Number of fetches still running
    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }
}

impl Drop for FetchDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(backend: &dyn LogBackend, request: FetchRequest) -> FetchOutcome {
    match request {
        FetchRequest::Schemas { ticket } => {
            let result = backend.list_schemas().await.map(|raw| normalize_schemas(&raw));
            FetchOutcome::Schemas { ticket, result }
        }
        FetchRequest::Modules { ticket, schema_id } => {
            let result = backend.list_modules(&schema_id).await.map(|raw| {
                if matches!(ModuleListShape::classify(&raw), ModuleListShape::Unrecognized) {
                    warn!(%schema_id, "unrecognized module list shape, treating as empty");
                }
                normalize_modules(&raw, &schema_id)
            });
            FetchOutcome::Modules { ticket, result }
        }
        FetchRequest::Logs { ticket, scope } => {
            let raw = match &scope {
                LogScope::Module {
                    schema_name,
                    module_name,
                } => backend.list_logs(schema_name, module_name).await,
                LogScope::Schema { schema_id } => backend.list_logs_by_schema(schema_id).await,
            };
            let result = raw.map(|raw| {
                if !raw.is_array() {
                    warn!(?scope, "log response is not a list, treating as empty");
                }
                normalize_logs(&raw)
            });
            FetchOutcome::Logs { ticket, result }
        }
    }
}
