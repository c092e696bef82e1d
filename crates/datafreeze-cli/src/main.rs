mod config;
mod logging;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use datafreeze_core::{DataSource, EscapeMode, Error as CoreError};
use datafreeze_emit::{
    BoundSource, DEFAULT_OUTPUT_FILE, EmitError, EmitOptions, Emitter, resolve_output,
    write_bytes_atomic, write_json_atomic,
};
use datafreeze_introspect::PostgresSource;
use logging::{LogFormat, init_logging};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine for connection {0}")]
    UnsupportedEngine(String),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "datafreeze", version, about = "Freeze database rows into C# literals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// appsettings.json style document with a ConnectionStrings section.
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Output file; defaults to FrozenData.cs in Models/ or beside the config.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Namespace for the generated file, overriding annotations and the project.
    #[arg(long)]
    namespace: Option<String>,
    /// Tool settings; defaults to datafreeze.toml beside the config.
    #[arg(long)]
    settings_file: Option<PathBuf>,
    /// Skip tables whose rows cannot be read instead of aborting.
    #[arg(long, default_value_t = false)]
    skip_failed_tables: bool,
    /// Copy strings into literals without escaping.
    #[arg(long, default_value_t = false)]
    no_escape_literals: bool,
    /// Schema name(s) to include.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
    /// Print the generated file to stdout instead of writing it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Write the run report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    init_logging(args.log_format)?;

    let settings = config::load_settings(args.settings_file.as_deref(), &args.config)?;
    let connections = config::load_connection_strings(&args.config)?;

    let mut catalog = settings.catalog.clone();
    if !args.schema.is_empty() {
        catalog.schemas = Some(args.schema.clone());
    }

    let escape_literals = !args.no_escape_literals && settings.escape_literals.unwrap_or(true);
    let mut options = EmitOptions {
        namespace: args.namespace.clone().or(settings.namespace.clone()),
        escape: if escape_literals {
            EscapeMode::Escaped
        } else {
            EscapeMode::Verbatim
        },
        skip_failed_tables: args.skip_failed_tables || settings.skip_failed_tables.unwrap_or(false),
        ..EmitOptions::default()
    };
    if let Some(fallback) = &settings.fallback_namespace {
        options.fallback_namespace = fallback.clone();
    }

    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        started_at = %started_at.to_rfc3339(),
        config = %args.config.display(),
        sources = connections.len()
    );
    if options.escape == EscapeMode::Verbatim {
        tracing::warn!("string escaping disabled; quotes or line breaks in data break the output");
    }

    let timer = Instant::now();

    let mut sources = Vec::with_capacity(connections.len());
    for (key, url) in connections {
        detect_engine(&url)?;
        let source = DataSource::new(key, url.clone())?;
        sources.push(BoundSource::new(source, PostgresSource::new(url, catalog.clone())));
    }

    let file_name = settings.output_file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE);
    let target = resolve_output(&args.config, file_name)?;
    let output_path = args.out.clone().unwrap_or_else(|| target.path.clone());

    let emitted = Emitter::new(options)
        .emit(&sources, target.project_namespace.as_deref())
        .await?;

    if args.dry_run {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(emitted.text.as_bytes())?;
        stdout.flush()?;
    } else {
        write_bytes_atomic(&output_path, emitted.text.as_bytes())?;
        tracing::info!(event = "output_written", path = %output_path.display(), bytes = emitted.report.bytes);
    }

    if let Some(report_path) = &args.report {
        write_json_atomic(report_path, &emitted.report)?;
        tracing::info!(event = "report_written", path = %report_path.display());
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = "success",
        namespace = %emitted.namespace,
        tables = emitted.report.tables_emitted,
        rows = emitted.report.rows_emitted,
        skipped = emitted.report.skipped.len(),
        duration_ms = duration_ms
    );

    Ok(())
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            datafreeze_core::redact_connection_string(conn),
        ))
    }
}
