//! File-backed logger
//!
//! Implements `log::Log` so the `log` macros used throughout the crate can
//! be written to a file. Every record is also echoed to stderr.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Logger writing records to a file
pub struct Logger {
    /// File handle for log output
    file: Mutex<File>,
    /// Most verbose level written
    level: Level,
}

impl Logger {
    /// Creates a logger writing to `log_file`, truncating it
    ///
    /// # Arguments
    /// * `log_file` - Path to the log file
    /// * `level` - Most verbose level to record
    pub fn new(log_file: &str, level: Level) -> io::Result<Self> {
        let file = File::create(Path::new(log_file))?;
        Ok(Logger {
            file: Mutex::new(file),
            level,
        })
    }

    /// Appends one line to the log file
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        let mut file = self.file.lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        writeln!(file, "{}", message)?;
        file.flush()
    }

    /// Installs a file logger as the global `log` backend
    pub fn init_global_logger(log_file: &str, level: Level) -> io::Result<()> {
        let global_logger = Logger::new(log_file, level)?;

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Level filter matching a verbosity flag
    pub fn level_for(verbose: bool) -> LevelFilter {
        if verbose { LevelFilter::Debug } else { LevelFilter::Info }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let _ = self.write_line(&message);
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}
