//! Logging abstractions for runtime-agnostic logging

mod traits;
mod level;
mod noop;
mod console;

pub use traits::{Logger, LoggerExt, SharedLogger};
pub use level::LogLevel;
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
