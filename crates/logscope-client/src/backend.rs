use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use logscope_types::CreateLogRequest;

/// Operations the viewer needs from a log backend.
///
/// Read operations return the raw JSON body; callers never assume a fixed
/// backend schema and run the result through the normalizers.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// List all schemas
    async fn list_schemas(&self) -> Result<Value>;

    /// List the modules of a schema, in whatever shape the backend returns
    async fn list_modules(&self, schema_id: &str) -> Result<Value>;

    /// List logs scoped to a schema and module, both by name
    async fn list_logs(&self, schema_name: &str, module_name: &str) -> Result<Value>;

    /// List every log of a schema
    async fn list_logs_by_schema(&self, schema_id: &str) -> Result<Value>;

    /// Create a log record. Failures are never absorbed.
    async fn create_log(&self, request: &CreateLogRequest) -> Result<Value>;

    /// Look up a schema by name
    async fn get_schema(&self, name: &str) -> Result<Value>;

    /// Create a schema, or return the existing one with that name
    async fn create_schema(&self, name: &str) -> Result<Value>;
}
