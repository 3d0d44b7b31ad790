use std::time::Duration;

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::aggregate::aggregate;
use crate::derive::derive_columns;
use crate::domain::{DatabaseDescriptor, DatasetId};
use crate::error::ExportError;
use crate::filename::output_filename;
use crate::metaspace::MetaspaceClient;
use crate::resolver::{Resolution, resolve};
use crate::table::ResultTable;
use crate::writer::write_csv;

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub dataset: DatasetId,
    pub database: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub dataset: String,
    pub path: String,
    pub databases: Vec<DatabaseDescriptor>,
    /// Databases whose label starts with the requested name.
    pub matched: Vec<DatabaseDescriptor>,
    /// Several versions matched and no version was requested; all were
    /// exported.
    pub ambiguous: bool,
    pub rows: usize,
    pub columns: Vec<String>,
    pub exported_at: String,
    #[serde(skip)]
    pub table: ResultTable,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);

    /// The requested database name matched nothing.
    fn database_not_found(&self, _requested: &str, _available: &[DatabaseDescriptor]) {}

    /// Several versions matched and no version was requested.
    fn ambiguous_versions(&self, _requested: &str, _matched: &[DatabaseDescriptor]) {}
}

pub struct Exporter<C: MetaspaceClient> {
    client: C,
    output_dir: Utf8PathBuf,
}

impl<C: MetaspaceClient> Exporter<C> {
    pub fn new(client: C, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    /// Runs a full export. Returns `Ok(None)` without writing anything when
    /// the requested database name matches none of the dataset's databases.
    pub fn export(
        &self,
        request: &ExportRequest,
        sink: &dyn ProgressSink,
    ) -> Result<Option<ExportReport>, ExportError> {
        sink.event(ProgressEvent {
            message: format!("resolving databases of dataset {}", request.dataset),
            elapsed: None,
        });
        let available = self.client.database_details(&request.dataset)?;

        let database = request.database.as_deref();
        let (selected, matched, ambiguous) =
            match resolve(&available, database, request.version.as_deref()) {
                Resolution::NotFound {
                    requested,
                    available,
                } => {
                    sink.database_not_found(&requested, &available);
                    return Ok(None);
                }
                Resolution::Resolved {
                    selected,
                    matched,
                    ambiguous,
                } => {
                    if ambiguous {
                        sink.ambiguous_versions(database.unwrap_or_default(), &matched);
                    }
                    (selected, matched, ambiguous)
                }
            };

        let mut table = aggregate(&self.client, &request.dataset, &selected, sink)?;
        derive_columns(&mut table);

        let path = self.output_dir.join(output_filename(database, &matched));
        write_csv(&table, &path)?;
        info!(path = %path, rows = table.len(), "results saved");
        sink.event(ProgressEvent {
            message: format!("Results saved to {path}"),
            elapsed: None,
        });

        Ok(Some(ExportReport {
            dataset: request.dataset.to_string(),
            path: path.to_string(),
            databases: selected,
            matched,
            ambiguous,
            rows: table.len(),
            columns: table.columns().to_vec(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            table,
        }))
    }
}
