/// Filter directives for the logger: an explicit level (`--log-level` or
/// `RUST_LOG`) wins over the debug flag.
fn log_filter(debug: bool, level: Option<&str>) -> String {
    match level.map(str::trim).filter(|level| !level.is_empty()) {
        Some(level) => level.to_string(),
        None if debug => "debug".to_string(),
        None => "info".to_string(),
    }
}

/// Initialize the global logger.
pub fn init_logging(debug: bool, level: Option<&str>) {
    env_logger::Builder::new()
        .parse_filters(&log_filter(debug, level))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}] {} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();
}
