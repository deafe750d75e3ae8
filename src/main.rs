fn main() {
    if let Err(err) = eqreport::cli::run() {
        eqreport::ui::eprintln_error(&err);
        std::process::exit(eqreport::exit::exit_code(&err));
    }
}
