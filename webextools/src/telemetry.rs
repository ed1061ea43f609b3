use crate::configuration::LogFormat;
use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt, fmt::MakeWriter, layer::SubscriberExt};

/// Maps the number of `-v` flags to a default filter; `RUST_LOG` still takes precedence.
pub fn filter_for_verbosity(verbosity: u8) -> String {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
    .to_owned()
}

/// Compose multiple layers into a `tracing`'s subscriber.
pub fn get_subscriber(
    env_filter: String,
    format: LogFormat,
    sink: impl for<'a> MakeWriter<'a> + Send + Sync + 'static,
) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let (bunyan, pretty) = match format {
        LogFormat::Bunyan => {
            let app_name = format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            (Some(BunyanFormattingLayer::new(app_name, sink)), None)
        }
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(false).with_writer(sink))),
    };
    Registry::default()
        .with(env_filter)
        .with(bunyan.is_some().then_some(JsonStorageLayer))
        .with(bunyan)
        .with(pretty)
}

/// Register a subscriber as global default to process span data.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
