//! Selection state for logscope
//!
//! This crate owns the schema → module → log-set cascade: the [`Session`]
//! state machine, the [`FetchDispatcher`] that runs its fetch requests, and
//! the [`SessionDriver`] tying the two together.

mod action;
mod dispatch;
mod driver;
mod error;
mod state;

pub use action::{FetchOutcome, FetchRequest, LogScope, Ticket};
pub use dispatch::FetchDispatcher;
pub use driver::SessionDriver;
pub use error::SessionError;
pub use state::{Phase, Session};

// Re-export types used in our public API
pub use logscope_logs::LogView;
pub use logscope_types::{FilterSpec, Module, Schema};
