//! Equipment incident reports: hardware and software faults recorded from the
//! console, queried by equipment, severity or date, and exported to text.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod exit;
pub mod export;
pub mod logs;
pub mod store;
pub mod ui;
pub mod validate;

pub use crate::core::{IncidentHeader, Report, ReportDetails, ReportKind, Severity};
pub use error::ReportError;
pub use export::ExportOutcome;
pub use store::{Opened, ReportStore};
