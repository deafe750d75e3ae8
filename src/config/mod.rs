use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
    pub logs: LogsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportConfig {
    pub reports_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsConfig {
    pub enabled: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_file: PathBuf::from("data/databaseReports.json"),
            },
            export: ExportConfig {
                reports_dir: PathBuf::from("reports"),
            },
            ui: UiConfig {
                color: true,
                max_table_rows: 50,
            },
            logs: LogsConfig { enabled: true },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    storage: Option<RawStorageConfig>,
    export: Option<RawExportConfig>,
    ui: Option<RawUiConfig>,
    logs: Option<RawLogsConfig>,
}

#[derive(Debug, Deserialize)]
struct RawStorageConfig {
    data_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawExportConfig {
    reports_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
    max_table_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawLogsConfig {
    enabled: Option<bool>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/eqreport/config.toml")
}

pub fn effective_home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("la variable de entorno HOME no esta definida"))
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path).with_context(|| {
            format!("no se pudo leer el archivo de configuracion: {}", path.display())
        })?;
        let raw: RawConfig =
            toml::from_str(&s).context("no se pudo interpretar la configuracion (TOML)")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    } else if config_path.is_some() {
        return Err(anyhow!(
            "el archivo de configuracion no existe: {}",
            path.display()
        ));
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(data_file) = raw.storage.and_then(|s| s.data_file) {
        cfg.storage.data_file = data_file;
    }

    if let Some(reports_dir) = raw.export.and_then(|e| e.reports_dir) {
        cfg.export.reports_dir = reports_dir;
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_table_rows) = ui.max_table_rows {
            cfg.ui.max_table_rows = max_table_rows;
        }
    }

    if let Some(enabled) = raw.logs.and_then(|l| l.enabled) {
        cfg.logs.enabled = enabled;
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("EQREPORT_DATA_FILE") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.storage.data_file = PathBuf::from(v);
        }
    }
    if let Ok(v) = std::env::var("EQREPORT_REPORTS_DIR") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.export.reports_dir = PathBuf::from(v);
        }
    }
    if let Ok(v) = std::env::var("EQREPORT_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "EQREPORT_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("EQREPORT_UI_MAX_TABLE_ROWS") {
        cfg.ui.max_table_rows = v
            .trim()
            .parse::<usize>()
            .with_context(|| "EQREPORT_UI_MAX_TABLE_ROWS")?;
    }
    if let Ok(v) = std::env::var("EQREPORT_LOGS_ENABLED") {
        cfg.logs.enabled = parse_bool(&v).with_context(|| "EQREPORT_LOGS_ENABLED")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" | "si" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!(
            "valor booleano invalido: {s} (use true|false|1|0|yes|no|on|off)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_overrides_only_present_keys() {
        let mut cfg = EffectiveConfig::default();
        let raw: RawConfig = toml::from_str(
            r#"
[export]
reports_dir = "out/informes"

[ui]
max_table_rows = 5
"#,
        )
        .expect("parse toml");
        apply_raw_config(&mut cfg, raw);

        assert_eq!(cfg.export.reports_dir, PathBuf::from("out/informes"));
        assert_eq!(cfg.ui.max_table_rows, 5);
        assert!(cfg.ui.color);
        assert_eq!(
            cfg.storage.data_file,
            PathBuf::from("data/databaseReports.json")
        );
        assert!(cfg.logs.enabled);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for s in ["1", "true", "YES", " on ", "si"] {
            assert!(parse_bool(s).unwrap(), "{s}");
        }
        for s in ["0", "false", "No", "off"] {
            assert!(!parse_bool(s).unwrap(), "{s}");
        }
        assert!(parse_bool("maybe").is_err());
    }
}
