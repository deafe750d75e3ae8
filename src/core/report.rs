use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::core::Severity;
use crate::error::ReportError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Fields shared by every report variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentHeader {
    pub equipment_id: String,
    pub description: String,
    pub severity: Severity,
    pub report_date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportDetails {
    Hardware {
        component_type: String,
        serial_number: i64,
        needs_replacement: bool,
    },
    Software {
        operating_system: String,
        software_name: String,
        version: String,
    },
}

/// One equipment incident. Fields are fixed at construction; callers are
/// expected to run the `validate` functions first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    equipment_id: String,
    description: String,
    severity: Severity,
    #[serde(with = "iso_date")]
    report_date: Date,
    #[serde(flatten)]
    details: ReportDetails,
}

impl Report {
    pub fn new(header: IncidentHeader, details: ReportDetails) -> Self {
        Self {
            equipment_id: header.equipment_id,
            description: header.description,
            severity: header.severity,
            report_date: header.report_date,
            details,
        }
    }

    pub fn hardware(
        header: IncidentHeader,
        component_type: impl Into<String>,
        serial_number: i64,
        needs_replacement: bool,
    ) -> Self {
        Self::new(
            header,
            ReportDetails::Hardware {
                component_type: component_type.into(),
                serial_number,
                needs_replacement,
            },
        )
    }

    pub fn software(
        header: IncidentHeader,
        operating_system: impl Into<String>,
        software_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(
            header,
            ReportDetails::Software {
                operating_system: operating_system.into(),
                software_name: software_name.into(),
                version: version.into(),
            },
        )
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn report_date(&self) -> Date {
        self.report_date
    }

    pub fn details(&self) -> &ReportDetails {
        &self.details
    }

    pub fn kind(&self) -> ReportKind {
        match self.details {
            ReportDetails::Hardware { .. } => ReportKind::Hardware,
            ReportDetails::Software { .. } => ReportKind::Software,
        }
    }

    /// `<id> (<severity>, <date>)`, used when offering ids to query.
    pub fn summary_line(&self) -> String {
        format!(
            "{} ({}, {})",
            self.equipment_id, self.severity, self.report_date
        )
    }
}

/// Export line: every field joined by `" - "` in declaration order.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.equipment_id, self.description, self.severity, self.report_date
        )?;
        match &self.details {
            ReportDetails::Hardware {
                component_type,
                serial_number,
                needs_replacement,
            } => write!(
                f,
                " - {component_type} - {serial_number} - {}",
                yes_no(*needs_replacement)
            ),
            ReportDetails::Software {
                operating_system,
                software_name,
                version,
            } => write!(f, " - {operating_system} - {software_name} - {version}"),
        }
    }
}

pub const fn yes_no(value: bool) -> &'static str {
    if value { "Si" } else { "No" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Hardware,
    Software,
}

impl ReportKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportKind::Hardware => "Hardware",
            ReportKind::Software => "Software",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hardware" => Ok(ReportKind::Hardware),
            "software" => Ok(ReportKind::Software),
            _ => Err(ReportError::InvalidReportKind(s.trim().to_string())),
        }
    }
}
