use std::sync::Once;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter string; `None` defers to `RUST_LOG`.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static LOGGER: Once = Once::new();

/// Install the global logger; only the first call has any effect.
///
/// `--log` beats `RUST_LOG`, which beats the built-in `info` default.
pub fn init_logging(config: LoggingConfig) {
    LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder
                    .filter_level(log::LevelFilter::Info)
                    .filter_module("wgpu_core", log::LevelFilter::Warn)
                    .filter_module("wgpu_hal", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style).init();
        log::debug!("logger ready");
    });
}
