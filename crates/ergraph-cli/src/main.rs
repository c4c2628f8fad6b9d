mod config;
mod registry;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use ergraph_core::{Dialect, DialectRegistry, Error as CoreError, Model, SchemaEntry};
use ergraph_reverse::{
    MetadataSource, PgMetadataSource, ReverseEngineer, ReverseEngineeringOptions, TracingNotifier,
};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use config::{ConfigError, ConnectionProfile, ConnectionSettings};
use registry::{RunContext, init_console_logging, init_run_logging, start_run, write_model};
use report::ModelReport;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Parser, Debug)]
#[command(name = "ergraph", version, about = "Reverse engineer database schemas into ER models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reverse engineer a database into a model report.
    Reverse(ReverseArgs),
    /// List schemas visible through the connection.
    Schemas(ConnectionArgs),
    /// List the connection's type catalog.
    Types(ConnectionArgs),
    /// List registered dialects.
    Dialects,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// TOML connection profile.
    #[arg(long, value_name = "PATH")]
    profile: Option<PathBuf>,
    /// Database connection URL.
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// Database user, overriding the URL.
    #[arg(long)]
    user: Option<String>,
    /// Database password, overriding the URL.
    #[arg(long)]
    password: Option<String>,
    /// Dialect name (see `ergraph dialects`).
    #[arg(long)]
    dialect: Option<String>,
}

#[derive(Args, Debug)]
struct ReverseArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Schema to reverse engineer, as `schema` or `catalog.schema`. Repeatable.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional extra output path for model.json.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Reverse(args) => run_reverse(args).await,
        Command::Schemas(args) => run_schemas(args).await,
        Command::Types(args) => run_types(args).await,
        Command::Dialects => run_dialects(),
    }
}

fn resolve_settings(
    args: ConnectionArgs,
    schemas: Vec<SchemaEntry>,
) -> Result<ConnectionSettings, CliError> {
    let profile = match &args.profile {
        Some(path) => ConnectionProfile::load(path)?,
        None => ConnectionProfile::default(),
    };
    let flags = ConnectionProfile {
        dialect: args.dialect,
        url: args.url,
        user: args.user,
        password: args.password,
        schemas,
    };
    Ok(profile.overridden_by(flags).into_settings()?)
}

async fn connect(settings: &ConnectionSettings) -> Result<PgMetadataSource, CliError> {
    settings.engine()?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(settings.connect_options()?)
        .await?;
    Ok(PgMetadataSource::new(pool))
}

async fn run_reverse(args: ReverseArgs) -> Result<(), CliError> {
    let ReverseArgs {
        connection,
        schema,
        run_dir,
        out,
    } = args;

    let schemas = schema.iter().map(|value| SchemaEntry::parse(value)).collect();
    let settings = resolve_settings(connection, schemas)?;
    let engine_name = settings.engine()?;
    let dialect = DialectRegistry::with_builtins().get(&settings.dialect)?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        dialect: settings.dialect.clone(),
        engine: engine_name.to_string(),
        schemas: settings.schemas.clone(),
        run_dir,
        connection: settings.redacted(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;
    tracing::info!(
        event = "cli_started",
        run_id = %run_id,
        dialect = %settings.dialect,
        connection = %run_ctx.connection.redacted
    );
    tracing::info!(event = "config_written", path = %run_paths.config_path.display());

    let timer = Instant::now();
    let source = connect(&settings).await?;

    let options = ReverseEngineeringOptions::with_schemas(settings.schemas.clone());
    let mut engine = ReverseEngineer::new(dialect.clone(), Arc::new(source))
        .with_notifier(Arc::new(TracingNotifier));
    let mut model = Model::new(dialect);

    let result = engine.reverse_engineer_into(&mut model, &options).await;
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            // Keep whatever was built for inspection.
            write_model(&run_paths, &ModelReport::new(&model, None), None)?;
            tracing::error!(event = "cli_failed", phase = ?engine.phase(), error = %err);
            return Err(err.into());
        }
    };

    write_model(
        &run_paths,
        &ModelReport::new(&model, Some(&summary)),
        out.as_deref(),
    )?;
    tracing::info!(event = "model_written", path = %run_paths.model_path.display());

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "cli_finished", status = "success", duration_ms = duration_ms);

    println!(
        "reverse engineered {} tables, {} relations ({} skipped, {} without indexes) into {}",
        summary.tables_loaded,
        summary.relations,
        summary.tables_skipped,
        summary.indexes_skipped.len(),
        run_paths.root.display()
    );
    Ok(())
}

async fn run_schemas(args: ConnectionArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let settings = resolve_settings(args, Vec::new())?;
    let source = connect(&settings).await?;

    for entry in source.schemas().await? {
        println!("{entry}");
    }
    Ok(())
}

async fn run_types(args: ConnectionArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let settings = resolve_settings(args, Vec::new())?;
    let dialect = DialectRegistry::with_builtins().get(&settings.dialect)?;
    let source = connect(&settings).await?;

    for info in source.type_info().await? {
        let mapped = if dialect.data_type(&info.name).is_some() {
            ""
        } else {
            "\tunmapped"
        };
        println!(
            "{}\t{}{mapped}",
            info.name,
            info.category.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn run_dialects() -> Result<(), CliError> {
    let registry = DialectRegistry::with_builtins();
    for dialect in registry.supported() {
        println!(
            "{}\tcase_sensitive={}\tschemas={}\ttypes={}",
            dialect.name(),
            dialect.is_case_sensitive(),
            dialect.supports_schema_information(),
            dialect.data_types().len()
        );
    }
    Ok(())
}
