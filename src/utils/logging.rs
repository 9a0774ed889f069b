use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::settings::{ClientConfig, LogFormat, LoggingConfig};


#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::TRACE => "TRACE",
            LogLevel::DEBUG => "DEBUG",
            LogLevel::INFO => "INFO",
            LogLevel::WARN => "WARN",
            LogLevel::ERROR => "ERROR",
        }
    }
}

/// CLI level wins over the config's level; format always comes from config.
pub fn resolve(client_config: Option<&ClientConfig>, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let configured = client_config
        .and_then(|config| config.logging.clone())
        .unwrap_or_default();

    match arg_log_level {
        Some(level) => LoggingConfig::new(level.as_str().to_lowercase(), configured.format),
        None => configured,
    }
}

/// Initialize tracing with the desired config.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Base layer: filter + writer
    let registry = tracing_subscriber::registry().with(env_filter);

    // Choose format layer
    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .with_ansi(false);

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_writer(std::io::stderr)
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}
