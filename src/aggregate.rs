use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::domain::{DatabaseDescriptor, DatasetId};
use crate::error::ExportError;
use crate::export::{ProgressEvent, ProgressSink};
use crate::metaspace::MetaspaceClient;
use crate::table::ResultTable;

pub const DATABASE_COLUMN: &str = "Database";
pub const VERSION_COLUMN: &str = "Version";

/// Fetches results for each database in order, tags every row with the
/// database name and version, and concatenates them. Stops at the first
/// failed fetch.
pub fn aggregate<C: MetaspaceClient + ?Sized>(
    client: &C,
    dataset: &DatasetId,
    databases: &[DatabaseDescriptor],
    sink: &dyn ProgressSink,
) -> Result<ResultTable, ExportError> {
    let mut combined = ResultTable::new();
    for database in databases {
        sink.event(ProgressEvent {
            message: format!(
                "Processing database: {}, version: {}",
                database.name, database.version
            ),
            elapsed: None,
        });
        let started = Instant::now();
        let mut table = client.results(dataset, database)?;
        table.set_constant(DATABASE_COLUMN, Value::String(database.name.clone()));
        table.set_constant(VERSION_COLUMN, Value::String(database.version.clone()));
        info!(
            database = %database.name,
            version = %database.version,
            rows = table.len(),
            "fetched annotations"
        );
        sink.event(ProgressEvent {
            message: format!("fetched {} annotations", table.len()),
            elapsed: Some(started.elapsed()),
        });
        combined.append(table);
    }
    Ok(combined)
}
