use crate::config::toml_config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match (verbose, level) {
        (true, _) => EnvFilter::new("moonphase=debug,tower_http=debug,info"),
        (false, Some(level)) => EnvFilter::new(format!("moonphase={}", level)),
        (false, None) => EnvFilter::new("moonphase=info,tower_http=info"),
    })
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, verbose, None);
}

pub fn init_logger(format: LogFormat, verbose: bool, level: Option<&str>) {
    let filter = default_filter(verbose, level);

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init(),
        // Structured output for log shippers
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init(),
    }
}
