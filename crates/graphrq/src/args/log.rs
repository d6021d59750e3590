use std::fmt;

use clap::ValueEnum;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors from GraphRQ crates
    Error,
    /// Warnings and errors from GraphRQ crates
    Warn,
    /// Info, warning and error messages from GraphRQ crates
    #[default]
    Info,
    /// Debug, info, warning and error messages from GraphRQ crates
    Debug,
    /// Trace, debug, info, warning and error messages from all dependencies
    Trace,
}

impl LogLevel {
    pub(crate) fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "graphrq=error,graphrq_server=error,graphrq_directives=error,off",
            LogLevel::Warn => "graphrq=warn,graphrq_server=warn,graphrq_directives=warn,off",
            LogLevel::Info => "graphrq=info,graphrq_server=info,graphrq_directives=info,off",
            LogLevel::Debug => "graphrq=debug,graphrq_server=debug,graphrq_directives=debug,off",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
