use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "vidvault=debug,vidvault_api=debug,vidvault_storage=debug,tower_http=debug";

/// Initialize tracing.
///
/// Compact console output in development; one JSON object per line in production so
/// the platform log collector can index fields. A subscriber that is already installed
/// (tests building several apps) is left in place.
pub fn init_telemetry(is_production: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let result = if is_production {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        let console_fmt = tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .try_init()
    };

    match result {
        Ok(()) => {
            tracing::info!(json = is_production, "Tracing initialized");
            Ok(())
        }
        Err(e) if tracing::dispatcher::has_been_set() => {
            tracing::debug!(error = %e, "Tracing subscriber already installed");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
