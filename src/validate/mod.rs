//! Input checks run before a `Report` is built. Stored reports are trusted and
//! never pass through here again.

use time::Date;
use time::macros::format_description;

use crate::core::{ReportKind, Severity};
use crate::error::ReportError;

pub fn parse_equipment_id(input: &str) -> Result<String, ReportError> {
    let id = input.trim();
    if id.is_empty() {
        return Err(ReportError::EmptyEquipmentId);
    }
    Ok(id.to_string())
}

pub fn validate_serial_number(serial_number: i64) -> Result<(), ReportError> {
    if serial_number <= 0 {
        return Err(ReportError::InvalidSerialNumber(serial_number.to_string()));
    }
    Ok(())
}

/// Parses and validates serial number text in one step.
pub fn parse_serial_number(input: &str) -> Result<i64, ReportError> {
    let input = input.trim();
    let serial_number = input
        .parse::<i64>()
        .map_err(|_| ReportError::InvalidSerialNumber(input.to_string()))?;
    validate_serial_number(serial_number)?;
    Ok(serial_number)
}

/// Accepts `A.B.C` where each part is one or more ASCII digits.
pub fn validate_software_version(version: &str) -> Result<(), ReportError> {
    let trimmed = version.trim();
    let mut parts = trimmed.split('.');
    let valid = (0..3).all(|_| {
        parts
            .next()
            .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    }) && parts.next().is_none();

    if !valid {
        return Err(ReportError::InvalidSoftwareVersion(trimmed.to_string()));
    }
    Ok(())
}

pub fn parse_severity(input: &str) -> Result<Severity, ReportError> {
    input
        .parse::<Severity>()
        .map_err(|_| ReportError::InvalidSeverity(input.trim().to_string()))
}

pub fn parse_date(input: &str) -> Result<Date, ReportError> {
    let input = input.trim();
    Date::parse(input, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ReportError::InvalidDate(input.to_string()))
}

pub fn parse_report_kind(input: &str) -> Result<ReportKind, ReportError> {
    input.parse::<ReportKind>()
}

/// Interactive yes/no answer; anything not recognised as yes is no.
pub fn parse_yes_no(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "si" | "sí" | "s" | "yes" | "y"
    )
}
