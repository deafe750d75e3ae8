//! Plain-text export of one report kind: one `Display` line per report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use time::OffsetDateTime;

use crate::core::{Report, ReportKind};
use crate::error::ReportError;
use crate::store::write_atomic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    Written { path: PathBuf, count: usize },
    NothingToExport { kind: ReportKind },
}

/// Local wall-clock time, or UTC when the local offset is unknown.
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `Reporte_<Kind>_<YYYY-MM-DD>_<HH-mm-ss>.txt`
pub fn export_file_name(kind: ReportKind, at: OffsetDateTime) -> String {
    format!(
        "Reporte_{kind}_{}_{:02}-{:02}-{:02}.txt",
        at.date(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

pub fn render_lines(reports: &[&Report]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&report.to_string());
        out.push('\n');
    }
    out
}

/// Writes `reports` (already filtered and ordered) into `dir`. Never replaces
/// an existing export: a same-second collision gets a `_N` suffix.
pub fn write_export(
    dir: &Path,
    kind: ReportKind,
    reports: &[&Report],
    at: OffsetDateTime,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::ExportIo {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = unique_path(dir, &export_file_name(kind, at));
    write_atomic(&path, render_lines(reports).as_bytes()).map_err(|source| {
        ReportError::ExportIo {
            path: path.clone(),
            source,
        }
    })?;
    Ok(path)
}

fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    let mut n: u32 = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{n}.txt"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
