//! Console logger implementation

use super::level::LogLevel;
use super::traits::Logger;

/// A logger that writes to stderr
///
/// Every level goes to stderr: stdout is reserved for the document or plan
/// the CLI emits.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a new console logger with default prefix and level
    pub fn new() -> Self {
        Self {
            prefix: "[stackcfg]".to_string(),
            min_level: LogLevel::default(),
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Set the minimum level that gets written
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    fn write(&self, level: LogLevel, message: &str) {
        if level >= self.min_level {
            eprintln!("{} {}: {}", self.prefix, level, message);
        }
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}
