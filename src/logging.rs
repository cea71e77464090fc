use tracing::{debug, span};
use tracing_subscriber;

pub enum LogLevel {
    Trace, Info, Debug, Warn, Error
}
impl LogLevel {
    pub fn to_log_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}
impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

const SPAN_NAME: &str = "corpus";
pub struct Logger;

impl Logger {
    /// Initialize the logger. Logs go to stderr so stdout carries only the report.
    pub fn init(level: LogLevel) {
        // A second init (tests, embedding) keeps the first subscriber.
        if let Err(e) = tracing_subscriber::fmt()
            .with_max_level(level.to_log_level())
            .with_writer(std::io::stderr)
            .try_init()
        {
            debug!("Logger already initialized, keeping existing subscriber: {}", e);
        }
    }

    /// Run `f` inside a span tagged with the corpus it works on. Blocking worker
    /// threads don't inherit the caller's span, so each task opens its own.
    pub fn with_span<T>(corpus: &str, f: impl FnOnce() -> T) -> T {
        let span = span!(tracing::Level::INFO, SPAN_NAME, name = corpus);
        let _guard = span.enter();
        f()
    }
}

pub fn setup_logger(level: &str) {
    Logger::init(LogLevel::parse(level));
}
