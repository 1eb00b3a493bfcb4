use anyhow::Result;
use chrono::{DateTime, Local};
use log::{LevelFilter, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

// Logging setup shared by the server binary. Writes timestamped lines to a
// log file when one is configured, otherwise to stdout.

pub struct SimpleLogger {
    log_file: Option<std::fs::File>,
}

impl SimpleLogger {
    pub fn new(log_file_path: Option<&Path>) -> Result<Self> {
        let log_file = if let Some(path) = log_file_path {
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        } else {
            None
        };

        Ok(SimpleLogger { log_file })
    }
}

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now: DateTime<Local> = Local::now();
            // Include source file and line number for easier debugging
            let log_message = format!(
                "[{}] {} [{}:{}] {}\n",
                now.format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            );

            if let Some(file) = &self.log_file {
                if let Ok(mut file) = file.try_clone() {
                    let _ = file.write_all(log_message.as_bytes());
                }
            } else {
                print!("{}", log_message);
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.try_clone() {
                let _ = file.flush();
            }
        } else {
            let _: Result<(), std::io::Error> = std::io::stdout().flush();
        }
    }
}

pub fn setup_logging(log_file: Option<&Path>, level: LevelFilter) -> Result<()> {
    let logger = SimpleLogger::new(log_file)?;
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level))?;

    log::info!("Logging initialized at level: {}", level);
    log::info!(
        "{} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Ok(())
}
