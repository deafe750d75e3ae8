use eqreport::{IncidentHeader, Report, ReportStore, Severity};
use time::macros::date;

#[test]
fn storage_file_matches_golden() {
    let dir = std::env::temp_dir().join(format!("eqreport-golden-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("databaseReports.json");

    let mut store = ReportStore::open(path.clone()).store;
    store
        .add_report(Report::hardware(
            IncidentHeader {
                equipment_id: "EQ1".to_string(),
                description: "Disco dañado".to_string(),
                severity: Severity::High,
                report_date: date!(2025 - 05 - 18),
            },
            "Disk",
            12345,
            true,
        ))
        .expect("add hardware");
    store
        .add_report(Report::software(
            IncidentHeader {
                equipment_id: "EQ2".to_string(),
                description: "Error instalando".to_string(),
                severity: Severity::Medium,
                report_date: date!(2025 - 05 - 17),
            },
            "Windows",
            "Office",
            "2.3.1",
        ))
        .expect("add software");

    let bytes = std::fs::read(&path).expect("read storage");
    let actual: serde_json::Value = serde_json::from_slice(&bytes).expect("parse storage");
    let expected: serde_json::Value =
        serde_json::from_str(include_str!("golden/reports.json")).expect("parse golden json");
    assert_eq!(actual, expected);

    let reopened = ReportStore::open(path);
    assert!(reopened.load_error.is_none());
    assert_eq!(reopened.store.reports(), store.reports());
    let _ = std::fs::remove_dir_all(&dir);
}
