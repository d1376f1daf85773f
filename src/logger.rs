//! Leveled structured logging sink.
//!
//! The core pipeline never formats ANSI color itself; it hands message
//! templates plus a parameter map to a [`LogSink`]. The console
//! implementation interpolates `{name}` placeholders and colors the level
//! mark. A recording implementation backs tests.

use std::io::{self, Write};
use std::sync::Mutex;

use colored::Colorize;

/// Log level of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Success,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Success => write!(f, "success"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Named parameters interpolated into a message template.
pub type LogParams<'a> = &'a [(&'a str, String)];

/// Structured sink for leveled messages.
///
/// Messages are templates with `{name}` placeholders; formatting happens in
/// the sink so the pipeline stays presentation-free.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, template: &str, params: LogParams<'_>);

    fn debug(&self, template: &str, params: LogParams<'_>) {
        self.log(Level::Debug, template, params);
    }

    fn info(&self, template: &str, params: LogParams<'_>) {
        self.log(Level::Info, template, params);
    }

    fn warn(&self, template: &str, params: LogParams<'_>) {
        self.log(Level::Warn, template, params);
    }

    fn success(&self, template: &str, params: LogParams<'_>) {
        self.log(Level::Success, template, params);
    }

    fn error(&self, template: &str, params: LogParams<'_>) {
        self.log(Level::Error, template, params);
    }
}

/// Replace `{name}` placeholders in a template with their parameter values.
///
/// Placeholders without a matching parameter are left as-is.
pub fn interpolate(template: &str, params: LogParams<'_>) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Console logger writing warnings and errors to stderr.
pub struct ConsoleLogger {
    verbose: bool,
}

impl ConsoleLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl LogSink for ConsoleLogger {
    fn log(&self, level: Level, template: &str, params: LogParams<'_>) {
        let message = interpolate(template, params);
        match level {
            Level::Debug => {
                if self.verbose {
                    let _ = writeln!(io::stderr().lock(), "{}", message.dimmed());
                }
            }
            Level::Info => println!("{}", message),
            Level::Warn => {
                let _ = writeln!(io::stderr().lock(), "{} {}", "warning:".yellow(), message);
            }
            Level::Success => println!("{} {}", "\u{2713}".green(), message.green()),
            Level::Error => {
                let _ = writeln!(io::stderr().lock(), "{} {}", "error:".red(), message);
            }
        }
    }
}

/// Recording logger for tests.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, interpolated, in emission order.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().expect("logger mutex poisoned").clone()
    }

    /// Recorded messages at one level.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl LogSink for MemoryLogger {
    fn log(&self, level: Level, template: &str, params: LogParams<'_>) {
        let message = interpolate(template, params);
        self.entries
            .lock()
            .expect("logger mutex poisoned")
            .push((level, message));
    }
}

#[cfg(test)]
mod tests {
    use crate::logger::*;

    #[test]
    fn test_interpolate_named_placeholders() {
        let message = interpolate(
            "found {count} tags in {file}",
            &[("count", "3".to_string()), ("file", "app.ts".to_string())],
        );
        assert_eq!(message, "found 3 tags in app.ts");
    }

    #[test]
    fn test_interpolate_repeated_placeholder() {
        let message = interpolate("{name} and {name}", &[("name", "a".to_string())]);
        assert_eq!(message, "a and a");
    }

    #[test]
    fn test_interpolate_unknown_placeholder_kept() {
        let message = interpolate("missing {what}", &[]);
        assert_eq!(message, "missing {what}");
    }

    #[test]
    fn test_memory_logger_records_levels() {
        let logger = MemoryLogger::new();
        logger.warn("dropped {n}", &[("n", "2".to_string())]);
        logger.info("done", &[]);

        assert_eq!(logger.messages_at(Level::Warn), vec!["dropped 2"]);
        assert_eq!(logger.messages_at(Level::Info), vec!["done"]);
        assert_eq!(logger.entries().len(), 2);
    }
}
