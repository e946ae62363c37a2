use tracing::{debug, warn};

use crate::action::{FetchOutcome, FetchRequest, LogScope, Ticket};
use crate::error::SessionError;
use logscope_client::ClientError;
use logscope_logs::LogView;
use logscope_types::{FilterSpec, LogEntry, Module, Schema};

/// Where the schema → module → log cascade currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    LoadingSchemas,
    SchemasLoaded,
    LoadingModules,
    ModulesLoaded,
    LoadingLogs,
    LogsLoaded,
}

/// Generation and in-flight flag of one fetched slice
#[derive(Clone, Copy, Debug, Default)]
struct FetchSlot {
    latest: Ticket,
    pending: bool,
}

impl FetchSlot {
    /// Start a fetch, superseding whatever is in flight
    fn begin(&mut self) -> Ticket {
        self.pending = true;
        self.latest.advance()
    }

    /// Forget the fetch in flight; its outcome will be dropped
    fn invalidate(&mut self) {
        self.pending = false;
        self.latest.advance();
    }

    /// Accept an outcome only if it answers the latest outstanding fetch
    fn finish(&mut self, slice: &str, ticket: Ticket) -> bool {
        if !self.pending || ticket != self.latest {
            warn!(slice, ?ticket, latest = ?self.latest, "discarding superseded fetch outcome");
            return false;
        }
        self.pending = false;
        true
    }
}

/// Owned state container for the log viewer.
///
/// All mutation goes through the transition methods below. A transition
/// returns the fetches it needs; their outcomes come back through
/// [`Session::apply`].
#[derive(Debug)]
pub struct Session {
    /// Last completed step; loading phases are derived from the slots
    settled: Phase,
    schemas: Vec<Schema>,
    modules: Vec<Module>,
    selected_schema: String,
    selected_module: String,
    logs: LogView,
    error: Option<SessionError>,
    schemas_fetch: FetchSlot,
    modules_fetch: FetchSlot,
    logs_fetch: FetchSlot,
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            settled: Phase::Idle,
            schemas: Vec::new(),
            modules: Vec::new(),
            selected_schema: String::new(),
            selected_module: String::new(),
            logs: LogView::new(page_size),
            error: None,
            schemas_fetch: FetchSlot::default(),
            modules_fetch: FetchSlot::default(),
            logs_fetch: FetchSlot::default(),
        }
    }

    // ------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------

    /// Load the schema list
    pub fn mount(&mut self) -> Vec<FetchRequest> {
        self.error = None;
        let ticket = self.schemas_fetch.begin();
        vec![FetchRequest::Schemas { ticket }]
    }

    /// Select a schema and load its modules.
    ///
    /// Always refetches, even when `schema_id` is already selected.
    pub fn select_schema(&mut self, schema_id: impl Into<String>) -> Vec<FetchRequest> {
        let schema_id = schema_id.into();
        debug!(%schema_id, "schema selected");

        self.clear_modules();
        self.selected_schema = schema_id.clone();
        if schema_id.is_empty() {
            self.settled = Phase::SchemasLoaded;
            return Vec::new();
        }

        self.error = None;
        let ticket = self.modules_fetch.begin();
        vec![FetchRequest::Modules { ticket, schema_id }]
    }

    /// Select a module (empty to clear) and reload the log set
    pub fn select_module(&mut self, module_name: impl Into<String>) -> Vec<FetchRequest> {
        self.selected_module = module_name.into();
        debug!(module = %self.selected_module, "module selected");
        self.request_logs()
    }

    /// Reload modules and logs for the current schema
    pub fn refresh(&mut self) -> Vec<FetchRequest> {
        if self.selected_schema.is_empty() {
            return Vec::new();
        }
        let schema_id = self.selected_schema.clone();
        self.select_schema(schema_id)
    }

    /// Apply a completed fetch. Outcomes superseded by a later request of
    /// the same kind are dropped.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Vec<FetchRequest> {
        match outcome {
            FetchOutcome::Schemas { ticket, result } => {
                if !self.schemas_fetch.finish("schemas", ticket) {
                    return Vec::new();
                }
                self.on_schemas(result)
            }
            FetchOutcome::Modules { ticket, result } => {
                if !self.modules_fetch.finish("modules", ticket) {
                    return Vec::new();
                }
                self.on_modules(result)
            }
            FetchOutcome::Logs { ticket, result } => {
                if !self.logs_fetch.finish("logs", ticket) {
                    return Vec::new();
                }
                self.on_logs(result);
                Vec::new()
            }
        }
    }

    /// Filter the fetched set. Synchronous; resets to page 1.
    pub fn apply_filter(&mut self, spec: FilterSpec) {
        self.logs.apply_filter(spec);
    }

    pub fn change_page(&mut self, page: usize, page_size: usize) {
        self.logs.change_page(page, page_size);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ------------------------------------------------------------------
    // Outcome handling
    // ------------------------------------------------------------------

    fn on_schemas(&mut self, result: Result<Vec<Schema>, ClientError>) -> Vec<FetchRequest> {
        self.settled = Phase::SchemasLoaded;
        match result {
            Ok(schemas) => {
                debug!(count = schemas.len(), "schemas loaded");
                self.schemas = schemas;
                match self.schemas.first().map(|s| s.id.clone()) {
                    Some(first) => self.select_schema(first),
                    None => {
                        self.reset_selection();
                        Vec::new()
                    }
                }
            }
            Err(e) => {
                self.schemas.clear();
                self.reset_selection();
                self.error = Some(SessionError::SchemasUnavailable(e.to_string()));
                Vec::new()
            }
        }
    }

    fn on_modules(&mut self, result: Result<Vec<Module>, ClientError>) -> Vec<FetchRequest> {
        self.settled = Phase::ModulesLoaded;
        match result {
            Ok(modules) => {
                debug!(count = modules.len(), schema = %self.selected_schema, "modules loaded");
                self.modules = modules;
                // A module picked while the list was loading survives if it exists
                let keep = !self.selected_module.is_empty()
                    && self.modules.iter().any(|m| m.name == self.selected_module);
                if !keep {
                    self.selected_module = self
                        .modules
                        .first()
                        .map(|m| m.name.clone())
                        .unwrap_or_default();
                }
                self.request_logs()
            }
            Err(e) => {
                self.clear_modules();
                self.error = Some(SessionError::ModulesUnavailable(e.to_string()));
                Vec::new()
            }
        }
    }

    fn on_logs(&mut self, result: Result<Vec<LogEntry>, ClientError>) {
        self.settled = Phase::LogsLoaded;
        match result {
            Ok(entries) => self.logs.replace(entries),
            Err(e) => {
                self.logs.clear();
                self.error = Some(SessionError::LogsUnavailable(e.to_string()));
            }
        }
    }

    /// Work out which log endpoint the current selection maps to
    fn request_logs(&mut self) -> Vec<FetchRequest> {
        if self.selected_schema.is_empty() {
            return Vec::new();
        }

        let Some(schema) = self.schemas.iter().find(|s| s.id == self.selected_schema) else {
            self.clear_logs();
            self.settled = Phase::LogsLoaded;
            self.error = Some(SessionError::SchemaNotFound(self.selected_schema.clone()));
            return Vec::new();
        };

        let scope = if !self.selected_module.trim().is_empty() {
            LogScope::Module {
                schema_name: schema.name.clone(),
                module_name: self.selected_module.clone(),
            }
        } else if let Some(first) = self.modules.first() {
            LogScope::Module {
                schema_name: schema.name.clone(),
                module_name: first.name.clone(),
            }
        } else {
            LogScope::Schema {
                schema_id: self.selected_schema.clone(),
            }
        };

        self.logs.clear();
        self.error = None;
        let ticket = self.logs_fetch.begin();
        vec![FetchRequest::Logs { ticket, scope }]
    }

    // Each clear also invalidates in-flight fetches of the slices it empties.

    fn reset_selection(&mut self) {
        self.selected_schema.clear();
        self.clear_modules();
    }

    fn clear_modules(&mut self) {
        self.modules.clear();
        self.selected_module.clear();
        self.modules_fetch.invalidate();
        self.clear_logs();
    }

    fn clear_logs(&mut self) {
        self.logs.clear();
        self.logs_fetch.invalidate();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The most upstream slice still loading, else the last completed step
    pub fn phase(&self) -> Phase {
        if self.schemas_fetch.pending {
            Phase::LoadingSchemas
        } else if self.modules_fetch.pending {
            Phase::LoadingModules
        } else if self.logs_fetch.pending {
            Phase::LoadingLogs
        } else {
            self.settled
        }
    }

    /// True while any slice has a fetch outstanding
    pub fn is_loading(&self) -> bool {
        self.schemas_fetch.pending || self.modules_fetch.pending || self.logs_fetch.pending
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Selected schema id, empty when none
    pub fn selected_schema(&self) -> &str {
        &self.selected_schema
    }

    /// Selected module name, empty when none
    pub fn selected_module(&self) -> &str {
        &self.selected_module
    }

    /// Find a schema by id, falling back to name
    pub fn find_schema(&self, key: &str) -> Option<&Schema> {
        self.schemas
            .iter()
            .find(|s| s.id == key)
            .or_else(|| self.schemas.iter().find(|s| s.name == key))
    }

    pub fn logs(&self) -> &LogView {
        &self.logs
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }
}
