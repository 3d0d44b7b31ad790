use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use metaspace_export::config::ConfigLoader;
use metaspace_export::domain::DatasetId;
use metaspace_export::error::ExportError;
use metaspace_export::export::{ExportRequest, Exporter, ProgressSink};
use metaspace_export::metaspace::MetaspaceHttpClient;
use metaspace_export::output::{ConsoleOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "metaspace-export")]
#[command(about = "Export METASPACE annotation results for a dataset to CSV")]
#[command(version, author)]
struct Cli {
    /// Dataset id or dataset URL, e.g. 2022-08-05_17h28m56s
    dataset: String,

    /// Database name to export (prefix-matched against "name version")
    database: Option<String>,

    /// Database version; all matching versions are exported when omitted
    #[arg(value_name = "VERSION", requires = "database")]
    db_version: Option<String>,

    #[arg(long)]
    config: Option<String>,

    /// Print the outcome as JSON instead of a console summary
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ExportError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ExportError) -> u8 {
    match error {
        ExportError::DatasetNotFound(_) | ExportError::ConfigRead(_) => 2,
        ExportError::MetaspaceHttp(_)
        | ExportError::MetaspaceStatus { .. }
        | ExportError::GraphQl(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let request = ExportRequest {
        dataset: cli.dataset.parse::<DatasetId>()?,
        database: cli.database,
        version: cli.db_version,
    };

    let client = MetaspaceHttpClient::new(&config)?;
    let exporter = Exporter::new(client, config.output_dir.clone());

    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::Console => &ConsoleOutput,
        OutputMode::Json => &JsonOutput,
    };
    let Some(report) = exporter.export(&request, sink)? else {
        return Ok(());
    };

    match output_mode {
        OutputMode::Console => ConsoleOutput::print_report(&report),
        OutputMode::Json => JsonOutput::print_report(&report).into_diagnostic()?,
    }
    Ok(())
}
