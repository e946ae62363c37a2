//! Log processing for logscope
//!
//! This crate turns loosely typed backend responses into canonical values and
//! derives filtered and paginated views over a fetched log set.

mod collections;
mod filter;
mod normalize;
mod view;

pub use collections::{ModuleListShape, normalize_modules, normalize_schemas};
pub use filter::{CompiledFilter, apply_filter, page_count, paginate};
pub use normalize::{LogNormalizer, normalize_logs};
pub use view::{LevelCounts, LogView};

// Re-export types used in our public API
pub use logscope_types::{ArcLogEntry, FilterSpec, LogEntry, LogLevel, Module, Pagination, Schema};
