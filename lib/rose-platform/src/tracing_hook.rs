use std::fs::File;
use std::sync::Mutex;

use eyre::{Context, Result};
use tracing_error::ErrorLayer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, EnvFilter, Layer};

use crate::config::LogConfig;

/// Install `color-eyre` and the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.filter`. With `config.json_file` set, every event and span
/// transition is also written there as JSON lines.
pub fn enable(config: &LogConfig) -> Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let fmt_layer = tracing_subscriber::fmt::Layer::default().with_filter(filter);
    let json_layer = match &config.json_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::Layer::default()
                    .json()
                    .with_file(true)
                    .with_level(true)
                    .with_line_number(true)
                    .with_thread_names(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let registry = tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .with(json_layer);
    #[cfg(feature = "tracy")]
    let registry = {
        let tracy_layer = tracing_tracy::TracyLayer::new();
        registry.with(tracy_layer)
    };
    registry.try_init()?;
    Ok(())
}
