use anyhow::Error;
use std::io::{self, Write};
use time::Date;
use unicode_width::UnicodeWidthChar;

use crate::core::{Report, Severity};
use crate::export::ExportOutcome;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "Error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "Causa:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "Siguiente paso:");
    let _ = writeln!(
        stderr,
        "  - consulte `eqreport --help` para ver los comandos y opciones disponibles"
    );
}

/// Menu-style listing: `  - <export line>` per report.
pub fn write_report_lines(out: &mut dyn Write, reports: &[&Report]) -> io::Result<()> {
    for report in reports {
        writeln!(out, "  - {report}")?;
    }
    Ok(())
}

pub fn print_reports_table(reports: &[&Report], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    if reports.is_empty() {
        let _ = writeln!(out, "No se encontraron reportes.");
        return;
    }

    let rows = cfg.max_table_rows.max(1).min(reports.len());
    write_reports_table(&mut out, &reports[..rows], cfg.color);
    if reports.len() > rows {
        let _ = writeln!(out, "... ({} reportes mas)", reports.len() - rows);
    }
}

fn write_reports_table(out: &mut dyn Write, reports: &[&Report], color: bool) {
    let label_date = "Fecha";
    let label_id = "Equipo";
    let label_sev = "Severidad";
    let label_kind = "Tipo";
    let label_desc = "Descripcion";

    let date_w = visible_width_ansi(label_date).max(10);
    let id_w = reports
        .iter()
        .map(|r| visible_width_ansi(r.equipment_id()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_id));
    let sev_w = visible_width_ansi(label_sev).max(5);
    let kind_w = visible_width_ansi(label_kind).max(8);
    let desc_w = visible_width_ansi(label_desc);

    let _ = writeln!(
        out,
        "{}  {}  {}  {}  {}",
        pad_end_display(label_date, date_w),
        pad_end_display(label_id, id_w),
        pad_end_display(label_sev, sev_w),
        pad_end_display(label_kind, kind_w),
        label_desc
    );
    let _ = writeln!(
        out,
        "{}  {}  {}  {}  {}",
        "-".repeat(date_w),
        "-".repeat(id_w),
        "-".repeat(sev_w),
        "-".repeat(kind_w),
        "-".repeat(desc_w)
    );

    for report in reports {
        let date = pad_end_display(&report.report_date().to_string(), date_w);
        let id = pad_end_display(report.equipment_id(), id_w);
        let sev = pad_end_ansi(&format_severity(report.severity(), color), sev_w);
        let kind = pad_end_display(report.kind().as_str(), kind_w);
        let desc = truncate_end(report.description(), 60);
        let _ = writeln!(out, "{date}  {id}  {sev}  {kind}  {desc}");
    }
}

pub fn write_severities(
    out: &mut dyn Write,
    severities: &[Severity],
    color: bool,
) -> io::Result<()> {
    for severity in severities {
        writeln!(out, "  - {}", format_severity(*severity, color))?;
    }
    Ok(())
}

pub fn write_date_range(out: &mut dyn Write, earliest: Date, latest: Date) -> io::Result<()> {
    writeln!(out, "Fecha mas antigua: {earliest}")?;
    writeln!(out, "Fecha mas reciente: {latest}")
}

pub fn write_export_outcome(out: &mut dyn Write, outcome: &ExportOutcome) -> io::Result<()> {
    match outcome {
        ExportOutcome::Written { path, count } => writeln!(
            out,
            "Reporte generado en: {} ({count} lineas)",
            path.display()
        ),
        ExportOutcome::NothingToExport { kind } => {
            writeln!(out, "No hay reportes de tipo {kind}")
        }
    }
}

pub fn format_severity(severity: Severity, color: bool) -> String {
    let s = severity.as_str();
    if !color {
        return s.to_string();
    }

    let code = match severity {
        Severity::High => "31",
        Severity::Medium => "33",
        Severity::Low => "32",
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}

fn truncate_end(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let prefix: String = s.chars().take(keep).collect();
    format!("{prefix}...")
}

fn pad_end_ansi(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn pad_end_display(s: &str, width: usize) -> String {
    pad_end_ansi(s, width)
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for ch2 in chars.by_ref() {
                if ch2 == 'm' {
                    break;
                }
            }
            continue;
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}
