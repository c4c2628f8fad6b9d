use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use ergraph_core::SchemaEntry;

use crate::config::RedactedConnection;
use crate::report::ModelReport;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub dialect: String,
    pub engine: String,
    pub schemas: Vec<SchemaEntry>,
    pub run_dir: PathBuf,
    pub connection: RedactedConnection,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    dialect: &'a str,
    engine: &'a str,
    schemas: Vec<String>,
    connection: &'a RedactedConnection,
    git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
struct GitInfo {
    commit: Option<String>,
    dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
    pub model_path: PathBuf,
}

/// Create `<run_dir>/<timestamp>__run_<id>/` with `config.json` and an empty
/// `logs.ndjson`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let paths = RunPaths {
        config_path: root.join("config.json"),
        logs_path: root.join("logs.ndjson"),
        model_path: root.join("model.json"),
        root,
    };

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        dialect: &ctx.dialect,
        engine: &ctx.engine,
        schemas: ctx.schemas.iter().map(ToString::to_string).collect(),
        connection: &ctx.connection,
        git: collect_git_info(),
    };
    write_json(&paths.config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

/// Write `model.json` into the run directory, and a copy to `out_path` when
/// given.
pub fn write_model(
    paths: &RunPaths,
    report: &ModelReport,
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    write_json(&paths.model_path, report)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        write_json(out_path, report)?;
    }

    Ok(())
}

fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
