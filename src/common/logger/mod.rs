use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod formatter;

pub use formatter::*;

use crate::configs::Config;

/// Builds the filter directive from the `[logging]` section.
/// `RUST_LOG` still wins when it is set.
pub fn filter_directive(config: &Config) -> String {
    let level = config.logging.level.as_deref().unwrap_or("info");
    match config.logging.filters.as_deref() {
        Some(filters) if !filters.is_empty() => format!("{},{}", level, filters),
        _ => level.to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let stdout_layer = fmt::layer()
        .event_format(CustomFormatter::new(config.logging.ansi))
        .with_ansi(config.logging.ansi);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::LoggingConfig;

    #[test]
    fn test_filter_directive_defaults_to_info() {
        let config = Config::default();
        assert_eq!(filter_directive(&config), "info");
    }

    #[test]
    fn test_filter_directive_appends_filters() {
        let config = Config {
            logging: LoggingConfig {
                level: Some("debug".into()),
                filters: Some("rustaqueue::populator=trace".into()),
                ansi: false,
            },
            ..Config::default()
        };
        assert_eq!(
            filter_directive(&config),
            "debug,rustaqueue::populator=trace"
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = Config::default();
        init(&config);
        init(&config);
        tracing::info!("logger installed");
    }
}
