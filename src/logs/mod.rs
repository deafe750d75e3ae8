use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::ReportKind;
use crate::error::ReportError;
use crate::export::ExportOutcome;
use crate::validate;

#[derive(Debug, Serialize)]
struct ExportLog {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    started_at: String,
    finished_at: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ReportKind>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageOp {
    Load,
    Save,
}

#[derive(Debug, Serialize)]
struct StorageLog {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    at: String,
    operation: StorageOp,
    path: String,
    report_count: usize,
    error: String,
}

pub fn logs_dir(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/eqreport/logs")
}

pub fn write_export_log(
    home_dir: &Path,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    requested_kind: &str,
    result: &Result<ExportOutcome, ReportError>,
) -> Result<PathBuf> {
    let (status, kind, count, path, error) = match result {
        Ok(ExportOutcome::Written { path, count }) => (
            "ok",
            validate::parse_report_kind(requested_kind).ok(),
            *count,
            Some(path.display().to_string()),
            None,
        ),
        Ok(ExportOutcome::NothingToExport { kind }) => ("empty", Some(*kind), 0, None, None),
        Err(err) => (
            "error",
            validate::parse_report_kind(requested_kind).ok(),
            0,
            None,
            Some(err.to_string()),
        ),
    };

    let log = ExportLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: "export",
        started_at: rfc3339(started_at),
        finished_at: rfc3339(finished_at),
        status,
        kind,
        count,
        path,
        error,
    };
    write_log(home_dir, "export", finished_at, &log)
}

pub fn write_storage_log(
    home_dir: &Path,
    at: OffsetDateTime,
    operation: StorageOp,
    path: &Path,
    report_count: usize,
    error: &ReportError,
) -> Result<PathBuf> {
    let log = StorageLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: "storage",
        at: rfc3339(at),
        operation,
        path: path.display().to_string(),
        report_count,
        error: error.to_string(),
    };
    write_log(home_dir, "storage", at, &log)
}

fn write_log<T: Serialize>(
    home_dir: &Path,
    prefix: &str,
    at: OffsetDateTime,
    log: &T,
) -> Result<PathBuf> {
    let dir = logs_dir(home_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("no se pudo crear el directorio de logs: {}", dir.display()))?;

    let pid = std::process::id();
    let ts = at.unix_timestamp_nanos();
    let path = dir.join(format!("{prefix}-{pid}-{ts}.json"));

    let buf = serde_json::to_vec_pretty(log).context("no se pudo serializar el log (JSON)")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("no se pudo escribir el log: {}", path.display()))?;
    Ok(path)
}

fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}
