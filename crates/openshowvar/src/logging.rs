use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable holding per-crate filter directives, e.g.
/// `openshowvar_client=debug`. Overrides `--log-level` when set.
pub const LOG_ENV: &str = "OSV_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Build the event filter: `OSV_LOG` directives if present and valid,
/// otherwise the level from the command line.
fn build_filter(level: LogLevel, env_directives: Option<&str>) -> EnvFilter {
    env_directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.directive()))
}

/// Install the stderr subscriber. Request/response hex dumps are emitted at
/// `debug`.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let env_directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(level, env_directives.as_deref());

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
