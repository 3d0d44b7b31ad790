use std::io::{self, Write};

use serde::Serialize;

use crate::domain::DatabaseDescriptor;
use crate::export::{ExportReport, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

/// Prints progress and diagnostics to stdout as the export runs.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_report(report: &ExportReport) {
        println!("Columns: {}", report.columns.join(", "));
        println!("Number of columns: {}", report.columns.len());
        println!("Number of rows: {}", report.rows);
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => println!("{} ({:.2}s)", event.message, elapsed.as_secs_f64()),
            None => println!("{}", event.message),
        }
    }

    fn database_not_found(&self, requested: &str, available: &[DatabaseDescriptor]) {
        println!("Could not find database: {requested}");
        println!("Available databases and versions:");
        for db in available {
            println!("{}", db.label());
        }
    }

    fn ambiguous_versions(&self, requested: &str, matched: &[DatabaseDescriptor]) {
        println!("Warning: Multiple versions found for database {requested}.");
        println!("Available versions:");
        for db in matched {
            println!("{}", db.label());
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundOutput<'a> {
    pub requested: &'a str,
    pub available: Vec<String>,
}

/// Silent while running; prints the outcome as a single JSON document.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &ExportReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_not_found(requested: &str, available: &[DatabaseDescriptor]) -> io::Result<()> {
        Self::print_json(&NotFoundOutput {
            requested,
            available: available.iter().map(DatabaseDescriptor::label).collect(),
        })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}

    fn database_not_found(&self, requested: &str, available: &[DatabaseDescriptor]) {
        if let Err(err) = Self::print_not_found(requested, available) {
            tracing::error!(%err, "failed to print JSON output");
        }
    }
}
