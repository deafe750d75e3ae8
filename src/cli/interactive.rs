use std::io::{BufRead, Write};

use anyhow::Result;
use thiserror::Error;

use crate::cli::Session;
use crate::core::{IncidentHeader, Report};
use crate::error::ReportError;
use crate::store::ReportStore;
use crate::validate;

#[derive(Debug, Error)]
#[error("fin de la entrada")]
struct EndOfInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    CreateHardware,
    CreateSoftware,
    QueryByEquipmentId,
    QueryBySeverity,
    QueryByDateFrom,
    Export,
    Exit,
}

pub(crate) fn parse_menu_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::CreateHardware),
        "2" => Some(MenuChoice::CreateSoftware),
        "3" => Some(MenuChoice::QueryByEquipmentId),
        "4" => Some(MenuChoice::QueryBySeverity),
        "5" => Some(MenuChoice::QueryByDateFrom),
        "6" => Some(MenuChoice::Export),
        "7" => Some(MenuChoice::Exit),
        _ => None,
    }
}

struct Console<'a> {
    input: &'a mut dyn BufRead,
    out: &'a mut dyn Write,
}

impl Console<'_> {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        // Lossy: invalid UTF-8 becomes U+FFFD instead of an I/O error.
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            writeln!(self.out)?;
            return Err(EndOfInput.into());
        }
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }
}

/// Runs the numbered menu until "7" or end of input. Domain errors are shown
/// and the menu continues; only I/O failures on the console end the loop.
pub(crate) fn run_menu<'a>(
    session: &Session,
    store: &mut ReportStore,
    input: &'a mut dyn BufRead,
    out: &'a mut dyn Write,
) -> Result<()> {
    let mut console = Console { input, out };
    writeln!(console.out, "=== Sistema de Gestion de Reportes de Equipos ===")?;

    loop {
        print_menu(console.out)?;
        let option = match console.ask("Opcion: ") {
            Ok(option) => option,
            Err(err) if err.is::<EndOfInput>() => return Ok(()),
            Err(err) => return Err(err),
        };

        let Some(choice) = parse_menu_choice(&option) else {
            writeln!(console.out, "Opcion invalida. Ingresa 1-7.")?;
            continue;
        };

        let result = match choice {
            MenuChoice::CreateHardware => create_hardware_report(session, store, &mut console),
            MenuChoice::CreateSoftware => create_software_report(session, store, &mut console),
            MenuChoice::QueryByEquipmentId => query_by_equipment_id(store, &mut console),
            MenuChoice::QueryBySeverity => query_by_severity(session, store, &mut console),
            MenuChoice::QueryByDateFrom => query_by_date_from(store, &mut console),
            MenuChoice::Export => export(session, store, &mut console),
            MenuChoice::Exit => {
                writeln!(console.out, "Saliendo...")?;
                return Ok(());
            }
        };

        match result {
            Ok(()) => {}
            Err(err) if err.is::<EndOfInput>() => return Ok(()),
            Err(err) => match err.downcast_ref::<ReportError>() {
                Some(report_err) => {
                    writeln!(console.out, "Error: {report_err}")?;
                    if report_err.is_storage() {
                        writeln!(
                            console.out,
                            "El reporte queda en memoria, pero el archivo de datos no esta actualizado."
                        )?;
                    }
                }
                None => return Err(err),
            },
        }
    }
}

fn print_menu(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Selecciona una opcion:")?;
    writeln!(out, "1. Crear reporte de Hardware")?;
    writeln!(out, "2. Crear reporte de Software")?;
    writeln!(out, "3. Consultar reportes por ID de equipo")?;
    writeln!(out, "4. Consultar reportes por nivel de severidad")?;
    writeln!(out, "5. Consultar reportes desde una fecha")?;
    writeln!(out, "6. Generar archivo de informe (txt)")?;
    writeln!(out, "7. Salir")
}

fn ask_header(console: &mut Console<'_>, kind: &str) -> Result<IncidentHeader> {
    let equipment_id = validate::parse_equipment_id(&console.ask("Ingresa ID del equipo: ")?)?;
    let description = console.ask(&format!("Descripcion incidente ({kind}): "))?;
    let severity = validate::parse_severity(&console.ask("Severidad (Alto/Medio/Bajo): ")?)?;
    let report_date = validate::parse_date(&console.ask("Fecha reporte (YYYY-MM-DD): ")?)?;
    Ok(IncidentHeader {
        equipment_id,
        description,
        severity,
        report_date,
    })
}

fn create_hardware_report(
    session: &Session,
    store: &mut ReportStore,
    console: &mut Console<'_>,
) -> Result<()> {
    let header = ask_header(console, "hardware")?;
    let component_type = console.ask("Tipo de componente (ej. Motherboard, Disk): ")?;
    let serial_number =
        validate::parse_serial_number(&console.ask("Numero de serie (entero positivo): ")?)?;
    let needs_replacement = validate::parse_yes_no(&console.ask("Necesita reemplazo? (Si/No): ")?);

    let report = Report::hardware(header, component_type, serial_number, needs_replacement);
    session.add_report(store, report)?;
    writeln!(console.out, "Reporte de hardware guardado.")?;
    Ok(())
}

fn create_software_report(
    session: &Session,
    store: &mut ReportStore,
    console: &mut Console<'_>,
) -> Result<()> {
    let header = ask_header(console, "software")?;
    let operating_system = console.ask("Sistema operativo (ej. Windows 10): ")?;
    let software_name = console.ask("Nombre del software: ")?;
    let version = console.ask("Version (A.B.C): ")?;
    validate::validate_software_version(&version)?;

    let report = Report::software(header, operating_system, software_name, version);
    session.add_report(store, report)?;
    writeln!(console.out, "Reporte de software guardado.")?;
    Ok(())
}

fn query_by_equipment_id(store: &ReportStore, console: &mut Console<'_>) -> Result<()> {
    let summary = store.list_equipment_id_and_severity();
    if summary.is_empty() {
        writeln!(console.out, "No hay reportes.")?;
        return Ok(());
    }
    writeln!(console.out, "Reportes (ID - Severidad - Fecha):")?;
    for line in &summary {
        writeln!(console.out, "{line}")?;
    }

    let equipment_id = console.ask("Ingresa ID del equipo a consultar: ")?;
    let found = store.query_by_equipment_id(&equipment_id);
    if found.is_empty() {
        writeln!(console.out, "No se encontraron reportes para {equipment_id}")?;
    } else {
        writeln!(console.out, "Resultados para {equipment_id}:")?;
        crate::ui::write_report_lines(console.out, &found)?;
    }
    Ok(())
}

fn query_by_severity(
    session: &Session,
    store: &ReportStore,
    console: &mut Console<'_>,
) -> Result<()> {
    let levels = store.list_severity_levels_present();
    if levels.is_empty() {
        writeln!(console.out, "No hay reportes.")?;
        return Ok(());
    }
    writeln!(console.out, "Severidades registradas:")?;
    crate::ui::write_severities(console.out, &levels, session.ui.color)?;

    let severity = validate::parse_severity(
        &console.ask("Ingresa severidad a consultar (Alto/Medio/Bajo): ")?,
    )?;
    let found = store.query_by_severity(severity);
    if found.is_empty() {
        writeln!(console.out, "No hay reportes con severidad {severity}")?;
    } else {
        writeln!(console.out, "Resultados para severidad {severity}:")?;
        crate::ui::write_report_lines(console.out, &found)?;
    }
    Ok(())
}

fn query_by_date_from(store: &ReportStore, console: &mut Console<'_>) -> Result<()> {
    let (earliest, latest) = store.date_range()?;
    crate::ui::write_date_range(console.out, earliest, latest)?;

    let from = validate::parse_date(&console.ask("Ingresa fecha desde (YYYY-MM-DD): ")?)?;
    let found = store.query_by_date_from(from);
    if found.is_empty() {
        writeln!(console.out, "No hay reportes desde {from}")?;
    } else {
        writeln!(console.out, "Resultados desde {from}:")?;
        crate::ui::write_report_lines(console.out, &found)?;
    }
    Ok(())
}

fn export(session: &Session, store: &ReportStore, console: &mut Console<'_>) -> Result<()> {
    let kind = console.ask("Tipo de informe a generar (Hardware/Software): ")?;
    let outcome = session.export(store, &kind)?;
    crate::ui::write_export_outcome(console.out, &outcome)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::UiConfig;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn temp_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "eqreport-menu-test-{}-{seq}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn session(dir: &Path) -> Session {
        Session {
            reports_dir: dir.join("reports"),
            log_home: None,
            ui: UiConfig {
                color: false,
                max_table_rows: 50,
                quiet: false,
                verbose: false,
            },
        }
    }

    fn drive(session: &Session, store: &mut ReportStore, script: &str) -> String {
        drive_bytes(session, store, script.as_bytes())
    }

    fn drive_bytes(session: &Session, store: &mut ReportStore, script: &[u8]) -> String {
        let mut input = Cursor::new(script.to_vec());
        let mut out = Vec::new();
        run_menu(session, store, &mut input, &mut out).expect("menu");
        String::from_utf8(out).expect("utf8")
    }

    const HARDWARE: &str = "1\nEQ1\nDisco dañado\nAlto\n2025-05-18\nDisk\n12345\nSi\n";

    #[test]
    fn parse_menu_choice_maps_numbers() {
        assert_eq!(parse_menu_choice(" 1 "), Some(MenuChoice::CreateHardware));
        assert_eq!(parse_menu_choice("7"), Some(MenuChoice::Exit));
        assert_eq!(parse_menu_choice("8"), None);
        assert_eq!(parse_menu_choice("uno"), None);
    }

    #[test]
    fn creates_hardware_report_and_persists_it() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive(&s, &mut store, &format!("{HARDWARE}7\n"));
        assert!(out.contains("Reporte de hardware guardado."));
        assert!(out.contains("Saliendo..."));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.reports()[0].to_string(),
            "EQ1 - Disco dañado - Alto - 2025-05-18 - Disk - 12345 - Si"
        );

        let reopened = ReportStore::open(dir.join("data.json"));
        assert_eq!(reopened.store.reports(), store.reports());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn validation_errors_do_not_end_the_loop() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let script = "2\nEQ2\nCuelgue\nAlto\n2025-05-18\nWindows\nOffice\n1.2\n\
                      1\nEQ1\nRuido\nmuy alto\n\
                      9\n7\n";
        let out = drive(&s, &mut store, script);
        assert!(out.contains("Error: Version invalida"));
        assert!(out.contains("Error: Severidad invalida"));
        assert!(out.contains("Opcion invalida. Ingresa 1-7."));
        assert!(out.contains("Saliendo..."));
        assert!(store.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_numeric_serial_is_rejected() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let script = "1\nEQ1\nRuido\nBajo\n2025-05-18\nFan\nABC\n7\n";
        let out = drive(&s, &mut store, script);
        assert!(out.contains("Error: Numero de serie invalido"));
        assert!(store.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn query_by_id_lists_summary_then_matches_case_insensitively() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive(&s, &mut store, &format!("{HARDWARE}3\neq1\n7\n"));
        assert!(out.contains("Reportes (ID - Severidad - Fecha):\nEQ1 (Alto, 2025-05-18)\n"));
        assert!(out.contains(
            "Resultados para eq1:\n  - EQ1 - Disco dañado - Alto - 2025-05-18 - Disk - 12345 - Si\n"
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn date_query_on_empty_store_reports_error_and_continues() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive(&s, &mut store, "5\n4\n7\n");
        assert!(out.contains("Error: No hay reportes registrados"));
        assert!(out.contains("No hay reportes.\n"));
        assert!(out.contains("Saliendo..."));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_writes_file_or_reports_nothing_to_do() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive(&s, &mut store, &format!("{HARDWARE}6\nSoftware\n6\nhardware\n7\n"));
        assert!(out.contains("No hay reportes de tipo Software"));
        assert!(out.contains("Reporte generado en: "));

        let files: Vec<String> = std::fs::read_dir(dir.join("reports"))
            .expect("reports dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("Reporte_Hardware_"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn end_of_input_exits_cleanly_mid_action() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive(&s, &mut store, "1\nEQ1\n");
        assert!(!out.contains("Saliendo..."));
        assert!(store.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_utf8_input_is_recoverable() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive_bytes(&s, &mut store, &[0xff, 0xfe, b'\n', b'7', b'\n']);
        assert!(out.contains("Opcion invalida. Ingresa 1-7."));
        assert!(out.contains("Saliendo..."));

        let mut script = b"1\nEQ1\n".to_vec();
        script.extend_from_slice(&[0xff, 0xfe, b'\n']);
        script.extend_from_slice(b"Alto\n2025-05-18\nDisk\n12345\nSi\n7\n");
        let out = drive_bytes(&s, &mut store, &script);
        assert!(out.contains("Reporte de hardware guardado."));
        assert!(out.contains("Saliendo..."));
        assert_eq!(store.reports()[0].description(), "\u{fffd}\u{fffd}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_equipment_id_is_rejected() {
        let dir = temp_dir();
        let s = session(&dir);
        let mut store = ReportStore::open(dir.join("data.json")).store;

        let out = drive(&s, &mut store, "1\n   \n7\n");
        assert!(out.contains("Error: ID de equipo vacio"));
        assert!(out.contains("Saliendo..."));
        assert!(store.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
