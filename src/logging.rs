use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Installs the stderr subscriber and routes `log` records into it.
/// Safe to call more than once; later calls are no-ops.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("chromagram=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    // stdout stays clean for scripting
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return;
    }

    // Bridge `log` records from the library modules into the subscriber
    let _ = tracing_log::LogTracer::init();
}
