use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;

use crate::core::{IncidentHeader, Report};
use crate::error::ReportError;
use crate::export::ExportOutcome;
use crate::logs::StorageOp;
use crate::store::ReportStore;
use crate::ui::UiConfig;
use crate::validate;

mod interactive;

#[derive(Debug, Parser)]
#[command(
    name = "eqreport",
    version,
    about = "Registro de incidentes de equipos (hardware y software): alta, consultas y exportacion"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,
    #[arg(long, global = true)]
    pub reports_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Menu,
    Add(AddArgs),
    List,
    Severities,
    Range,
    Query(QueryArgs),
    Export(ExportArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(subcommand)]
    pub command: AddCommand,
}

#[derive(Debug, Subcommand)]
pub enum AddCommand {
    Hardware(AddHardwareArgs),
    Software(AddSoftwareArgs),
}

#[derive(Debug, Args)]
pub struct HeaderArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub severity: String,
    #[arg(long)]
    pub date: String,
}

#[derive(Debug, Args)]
pub struct AddHardwareArgs {
    #[command(flatten)]
    pub header: HeaderArgs,
    #[arg(long)]
    pub component: String,
    #[arg(long, allow_hyphen_values = true)]
    pub serial: String,
    #[arg(long)]
    pub needs_replacement: bool,
}

#[derive(Debug, Args)]
pub struct AddSoftwareArgs {
    #[command(flatten)]
    pub header: HeaderArgs,
    #[arg(long)]
    pub os: String,
    #[arg(long)]
    pub software: String,
    #[arg(long = "software-version")]
    pub software_version: String,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("filter").required(true).args(["id", "severity", "from"])))]
pub struct QueryArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub severity: Option<String>,
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Hardware | Software
    pub kind: String,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

/// Settings shared by every command once configuration is resolved.
pub(crate) struct Session {
    pub reports_dir: PathBuf,
    /// Home directory for operation logs; `None` when logging is disabled.
    pub log_home: Option<PathBuf>,
    pub ui: UiConfig,
}

impl Session {
    /// Adds and persists. A save failure is logged and returned, but the
    /// report remains in memory.
    pub(crate) fn add_report(
        &self,
        store: &mut ReportStore,
        report: Report,
    ) -> Result<(), ReportError> {
        let result = store.add_report(report);
        if let Err(err) = &result {
            self.log_storage_failure(StorageOp::Save, store, err);
        }
        result
    }

    pub(crate) fn export(
        &self,
        store: &ReportStore,
        kind: &str,
    ) -> Result<ExportOutcome, ReportError> {
        let started_at = time::OffsetDateTime::now_utc();
        let result = store.generate_report_file(kind, &self.reports_dir);
        let finished_at = time::OffsetDateTime::now_utc();

        if let Some(home) = &self.log_home {
            match crate::logs::write_export_log(home, started_at, finished_at, kind, &result) {
                Ok(path) if self.ui.verbose => eprintln!("log: {}", path.display()),
                Ok(_) => {}
                Err(err) => eprintln!("Advertencia: no se pudo escribir el log: {err:#}"),
            }
        }
        result
    }

    pub(crate) fn log_storage_failure(&self, op: StorageOp, store: &ReportStore, err: &ReportError) {
        let Some(home) = &self.log_home else {
            return;
        };
        let at = time::OffsetDateTime::now_utc();
        match crate::logs::write_storage_log(home, at, op, store.path(), store.len(), err) {
            Ok(path) if self.ui.verbose => eprintln!("log: {}", path.display()),
            Ok(_) => {}
            Err(log_err) => eprintln!("Advertencia: no se pudo escribir el log: {log_err:#}"),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdout_is_tty = io::stdout().is_terminal();

    let home_dir = crate::config::effective_home_dir()?;

    let env_config_path = std::env::var_os("EQREPORT_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;
    if let Some(data_file) = &cli.data_file {
        cfg.storage.data_file = data_file.clone();
    }
    if let Some(reports_dir) = &cli.reports_dir {
        cfg.export.reports_dir = reports_dir.clone();
    }

    let ui_cfg = UiConfig {
        color: stdout_is_tty && cfg.ui.color && !cli.no_color,
        max_table_rows: cfg.ui.max_table_rows,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let command = cli.command.unwrap_or(Commands::Menu);
    match &command {
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "eqreport", &mut out);
            return Ok(());
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `eqreport config --show`");
            }
            return Ok(());
        }
        _ => {}
    }

    let session = Session {
        reports_dir: cfg.export.reports_dir.clone(),
        log_home: cfg.logs.enabled.then(|| home_dir.clone()),
        ui: ui_cfg,
    };

    if session.ui.verbose {
        eprintln!("almacenamiento: {}", cfg.storage.data_file.display());
        eprintln!("informes: {}", session.reports_dir.display());
    }

    let opened = ReportStore::open(&cfg.storage.data_file);
    let mut store = opened.store;
    if let Some(err) = &opened.load_error {
        eprintln!("Advertencia: {err}");
        eprintln!("Se continua con una coleccion vacia.");
        session.log_storage_failure(StorageOp::Load, &store, err);
    }

    match command {
        Commands::Menu => {
            if cli.json {
                return Err(crate::exit::invalid_args(
                    "el menu interactivo no admite --json",
                ));
            }
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout().lock();
            interactive::run_menu(&session, &mut store, &mut input, &mut out)?;
        }
        Commands::Add(args) => {
            let report = match args.command {
                AddCommand::Hardware(a) => build_hardware(a)?,
                AddCommand::Software(a) => build_software(a)?,
            };
            session
                .add_report(&mut store, report.clone())
                .context("el reporte no se pudo guardar en disco")?;
            if cli.json {
                write_json(&report)?;
            } else if !session.ui.quiet {
                println!("Reporte de {} guardado.", report.kind().as_str().to_lowercase());
            }
        }
        Commands::List => {
            let lines = store.list_equipment_id_and_severity();
            if cli.json {
                write_json(&lines)?;
            } else if !session.ui.quiet {
                if lines.is_empty() {
                    println!("No hay reportes.");
                }
                for line in lines {
                    println!("{line}");
                }
            }
        }
        Commands::Severities => {
            let levels = store.list_severity_levels_present();
            if cli.json {
                write_json(&levels)?;
            } else if !session.ui.quiet {
                if levels.is_empty() {
                    println!("No hay reportes.");
                }
                crate::ui::write_severities(&mut io::stdout().lock(), &levels, session.ui.color)?;
            }
        }
        Commands::Range => {
            let (earliest, latest) = store.date_range()?;
            if cli.json {
                write_json(&DateRangeJson {
                    earliest: earliest.to_string(),
                    latest: latest.to_string(),
                })?;
            } else if !session.ui.quiet {
                crate::ui::write_date_range(&mut io::stdout().lock(), earliest, latest)?;
            }
        }
        Commands::Query(args) => {
            let found = if let Some(id) = &args.id {
                store.query_by_equipment_id(id.trim())
            } else if let Some(severity) = &args.severity {
                store.query_by_severity(validate::parse_severity(severity)?)
            } else if let Some(from) = &args.from {
                store.query_by_date_from(validate::parse_date(from)?)
            } else {
                return Err(crate::exit::invalid_args(
                    "query: indique --id, --severity o --from",
                ));
            };
            if cli.json {
                write_json(&found)?;
            } else {
                crate::ui::print_reports_table(&found, &session.ui);
            }
        }
        Commands::Export(args) => {
            let outcome = session.export(&store, &args.kind)?;
            if cli.json {
                write_json(&outcome)?;
            } else if !session.ui.quiet {
                crate::ui::write_export_outcome(&mut io::stdout().lock(), &outcome)?;
            }
        }
        Commands::Completion(_) | Commands::Config(_) => {}
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct DateRangeJson {
    earliest: String,
    latest: String,
}

fn build_header(args: HeaderArgs) -> Result<IncidentHeader, ReportError> {
    Ok(IncidentHeader {
        equipment_id: validate::parse_equipment_id(&args.id)?,
        description: args.description.trim().to_string(),
        severity: validate::parse_severity(&args.severity)?,
        report_date: validate::parse_date(&args.date)?,
    })
}

fn build_hardware(args: AddHardwareArgs) -> Result<Report> {
    let header = build_header(args.header)?;
    let serial_number = validate::parse_serial_number(&args.serial)?;
    Ok(Report::hardware(
        header,
        args.component.trim(),
        serial_number,
        args.needs_replacement,
    ))
}

fn build_software(args: AddSoftwareArgs) -> Result<Report> {
    let header = build_header(args.header)?;
    validate::validate_software_version(&args.software_version)?;
    Ok(Report::software(
        header,
        args.os.trim(),
        args.software.trim(),
        args.software_version.trim(),
    ))
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "shell no soportada: {other} (use bash|zsh|fish)"
        ))),
    }
}
