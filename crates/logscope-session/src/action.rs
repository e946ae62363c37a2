use logscope_client::ClientError;
use logscope_types::{LogEntry, Module, Schema};

/// Generation number of a fetch within one state slice.
///
/// Only the outcome carrying the latest ticket of its slice is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Move to the next generation and return it
    pub(crate) fn advance(&mut self) -> Ticket {
        self.0 += 1;
        *self
    }
}

/// Which log endpoint a log fetch uses
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogScope {
    /// Logs of one module, addressed by names
    Module {
        schema_name: String,
        module_name: String,
    },
    /// Every log of a schema, addressed by id
    Schema { schema_id: String },
}

/// A fetch the session wants performed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    Schemas { ticket: Ticket },
    Modules { ticket: Ticket, schema_id: String },
    Logs { ticket: Ticket, scope: LogScope },
}

impl FetchRequest {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Schemas { ticket } | Self::Modules { ticket, .. } | Self::Logs { ticket, .. } => {
                *ticket
            }
        }
    }
}

/// A completed fetch, already normalized
#[derive(Debug)]
pub enum FetchOutcome {
    Schemas {
        ticket: Ticket,
        result: Result<Vec<Schema>, ClientError>,
    },
    Modules {
        ticket: Ticket,
        result: Result<Vec<Module>, ClientError>,
    },
    Logs {
        ticket: Ticket,
        result: Result<Vec<LogEntry>, ClientError>,
    },
}
