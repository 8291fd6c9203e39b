use crate::common::ApplicationError;
use crate::domains::logger::{DomainLogger, DynLogger, FileLogger};
use std::sync::{Arc, Mutex};

struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("[crowd] {}", msg);
    }
    fn warn(&self, msg: &str) {
        eprintln!("[crowd] WARN: {}", msg);
    }
    fn error(&self, msg: &str) {
        eprintln!("[crowd] ERROR: {}", msg);
    }
}

/// Console-backed logger, the fallback when no log file is configured.
pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleLogger)
}

struct NoopLogger;

impl DomainLogger for NoopLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

pub fn init_noop_logger() -> DynLogger {
    Arc::new(NoopLogger)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Keeps every message in memory; lets tests assert on recovered
/// configuration errors.
#[derive(Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: LogLevel, msg: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, msg.to_string()));
        }
    }
}

impl DomainLogger for MemoryLogger {
    fn info(&self, msg: &str) {
        self.push(LogLevel::Info, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(LogLevel::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(LogLevel::Error, msg);
    }
}

/// Fans every message out to all attached loggers.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }
    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }
    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }
}

/// Install `fast_log` at `path` and return the `log`-facade bridge.
pub fn init_file_logger(path: &str, level: log::LevelFilter) -> Result<DynLogger, ApplicationError> {
    FileLogger::init(path, level)
        .map_err(|e| ApplicationError::Configuration(anyhow::anyhow!("failed to initialize fast_log at {}: {}", path, e)))?;
    Ok(Arc::new(FileLogger))
}

/// File plus console when the file logger can be installed, console otherwise.
pub fn init_combined_logger(path: &str) -> DynLogger {
    let console = init_console_logger();
    match init_file_logger(path, log::LevelFilter::Info) {
        Ok(file) => Arc::new(MultiLogger::new(vec![file, console])),
        Err(e) => {
            console.warn(&e.to_string());
            console
        }
    }
}
