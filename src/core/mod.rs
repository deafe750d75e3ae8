mod report;
mod severity;

pub use report::{IncidentHeader, Report, ReportDetails, ReportKind, yes_no};
pub use severity::Severity;
