use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

fn eqreport_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eqreport"));
    cmd.env("HOME", home);
    cmd.current_dir(home);
    cmd.env_remove("EQREPORT_CONFIG");
    cmd.env_remove("EQREPORT_DATA_FILE");
    cmd.env_remove("EQREPORT_REPORTS_DIR");
    cmd.env_remove("EQREPORT_UI_COLOR");
    cmd.env_remove("EQREPORT_UI_MAX_TABLE_ROWS");
    cmd.env_remove("EQREPORT_LOGS_ENABLED");
    cmd
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!("eqreport-menu-test-{}-{seq}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn run_menu(home: &Path, script: &str) -> Output {
    let mut child = eqreport_cmd(home)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn eqreport");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(script.as_bytes())
        .expect("write script");
    child.wait_with_output().expect("wait eqreport")
}

#[test]
fn menu_session_survives_errors_and_persists_between_runs() {
    let home = make_temp_home();

    let script = "1\nEQ1\nDisco dañado\nAlto\n2025-05-18\nDisk\n12345\nSi\n\
                  1\nEQ9\nRuido\nAlto\n2025-05-18\nFan\n-1\n\
                  7\n";
    let out = run_menu(&home, script);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("Reporte de hardware guardado."));
    assert!(text.contains("Error: Numero de serie invalido"));
    assert!(text.contains("Saliendo..."));

    let out = run_menu(&home, "4\nalto\n7\n");
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("Severidades registradas:\n  - Alto\n"));
    assert!(text.contains(
        "Resultados para severidad Alto:\n  - EQ1 - Disco dañado - Alto - 2025-05-18 - Disk - 12345 - Si\n"
    ));
    assert!(!text.contains("EQ9"));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn menu_ends_on_closed_input() {
    let home = make_temp_home();
    let out = run_menu(&home, "");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("1. Crear reporte de Hardware"));
    let _ = std::fs::remove_dir_all(&home);
}
