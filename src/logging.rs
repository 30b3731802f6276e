//! Application log setup
//!
//! Writes an append-only, line-oriented log next to the binary:
//! `<timestamp> - <LEVEL> - <message>`. Every success/failure event in the
//! capture → filter → upload pipeline is recorded here. The log is written,
//! never read back by the program.
use std::fs::OpenOptions;
use std::io::Write;

/// Log file name, created in the working directory
const LOG_FILE: &str = "camera_app.log";

/// Initialize file logging. Falls back to stderr if the log file
/// cannot be opened (a broken log must not take the app down).
pub fn init() {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        )
    });

    match OpenOptions::new().create(true).append(true).open(LOG_FILE) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!("Could not open {}: {} (logging to stderr)", LOG_FILE, e);
        }
    }

    builder.init();
}
