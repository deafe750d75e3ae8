//! The report collection: loaded once, kept authoritative in memory, and
//! rewritten in full to the storage file after every mutation.
//!
//! The store assumes it is the only writer of its file. Sharing it across
//! threads or processes needs external locking around add-then-save.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::core::{Report, ReportKind, Severity};
use crate::error::ReportError;
use crate::export::{self, ExportOutcome};
use crate::validate;

const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
struct StoredReportsRef<'a> {
    schema_version: &'static str,
    reports: &'a [Report],
}

#[derive(Debug, Deserialize)]
struct StoredReports {
    schema_version: String,
    reports: Vec<Report>,
}

#[derive(Debug)]
pub struct ReportStore {
    path: PathBuf,
    reports: Vec<Report>,
}

/// Result of opening a store. A load failure still yields a usable, empty
/// store; the failure is reported in `load_error`.
#[derive(Debug)]
pub struct Opened {
    pub store: ReportStore,
    pub load_error: Option<ReportError>,
}

impl ReportStore {
    pub fn open(path: impl Into<PathBuf>) -> Opened {
        let path = path.into();
        match load_reports(&path) {
            Ok(reports) => Opened {
                store: Self { path, reports },
                load_error: None,
            },
            Err(err) => Opened {
                store: Self {
                    path,
                    reports: Vec::new(),
                },
                load_error: Some(err),
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports in insertion order.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Appends and persists. On a save error the report stays in memory, so
    /// memory and disk diverge until the next successful save.
    pub fn add_report(&mut self, report: Report) -> Result<(), ReportError> {
        self.reports.push(report);
        self.save()
    }

    pub fn save(&self) -> Result<(), ReportError> {
        let storage_err = |source: std::io::Error| ReportError::StorageIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let doc = StoredReportsRef {
            schema_version: SCHEMA_VERSION,
            reports: &self.reports,
        };
        let buf = serde_json::to_vec_pretty(&doc)
            .map_err(|e| storage_err(std::io::Error::other(e)))?;
        write_atomic(&self.path, &buf).map_err(storage_err)
    }

    pub fn list_equipment_id_and_severity(&self) -> Vec<String> {
        sorted_by_date(self.reports.iter())
            .into_iter()
            .map(Report::summary_line)
            .collect()
    }

    pub fn list_severity_levels_present(&self) -> Vec<Severity> {
        let present: BTreeSet<Severity> = self.reports.iter().map(Report::severity).collect();
        present.into_iter().collect()
    }

    /// `(earliest, latest)` report date.
    pub fn date_range(&self) -> Result<(Date, Date), ReportError> {
        let mut dates = self.reports.iter().map(Report::report_date);
        let first = dates.next().ok_or(ReportError::EmptyCollection)?;
        Ok(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }

    pub fn query_by_equipment_id(&self, equipment_id: &str) -> Vec<&Report> {
        let wanted = equipment_id.to_lowercase();
        sorted_by_date(
            self.reports
                .iter()
                .filter(|r| r.equipment_id().to_lowercase() == wanted),
        )
    }

    pub fn query_by_severity(&self, severity: Severity) -> Vec<&Report> {
        sorted_by_date(self.reports.iter().filter(|r| r.severity() == severity))
    }

    /// Reports dated on or after `from`.
    pub fn query_by_date_from(&self, from: Date) -> Vec<&Report> {
        sorted_by_date(self.reports.iter().filter(|r| r.report_date() >= from))
    }

    pub fn query_by_kind(&self, kind: ReportKind) -> Vec<&Report> {
        sorted_by_date(self.reports.iter().filter(|r| r.kind() == kind))
    }

    /// Exports every report of `kind` ("Hardware" / "Software") into `dir`.
    pub fn generate_report_file(
        &self,
        kind: &str,
        dir: &Path,
    ) -> Result<ExportOutcome, ReportError> {
        self.generate_report_file_at(kind, dir, export::now_local())
    }

    pub fn generate_report_file_at(
        &self,
        kind: &str,
        dir: &Path,
        at: OffsetDateTime,
    ) -> Result<ExportOutcome, ReportError> {
        let kind = validate::parse_report_kind(kind)?;
        let reports = self.query_by_kind(kind);
        if reports.is_empty() {
            return Ok(ExportOutcome::NothingToExport { kind });
        }
        let path = export::write_export(dir, kind, &reports, at)?;
        Ok(ExportOutcome::Written {
            path,
            count: reports.len(),
        })
    }
}

fn sorted_by_date<'a>(reports: impl Iterator<Item = &'a Report>) -> Vec<&'a Report> {
    let mut out: Vec<&Report> = reports.collect();
    // stable: equal dates keep insertion order
    out.sort_by_key(|r| r.report_date());
    out
}

fn load_reports(path: &Path) -> Result<Vec<Report>, ReportError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ReportError::StorageIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let reason = match serde_json::from_slice::<StoredReports>(&bytes) {
        Ok(doc) if doc.schema_version == SCHEMA_VERSION => return Ok(doc.reports),
        Ok(doc) => format!("version de esquema no soportada: {}", doc.schema_version),
        Err(err) => err.to_string(),
    };

    let backup = corrupt_backup_path(path);
    let reason = match std::fs::rename(path, &backup) {
        Ok(()) => format!("{reason} (copia movida a {})", backup.display()),
        Err(err) => format!("{reason} (no se pudo apartar el archivo: {err})"),
    };
    Err(ReportError::StorageCorrupt {
        path: path.to_path_buf(),
        reason,
    })
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Writes to a sibling temp file and renames it over `path`, so readers only
/// ever see the old or the complete new contents.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp-{}", std::process::id()));

    let result = (|| {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}
