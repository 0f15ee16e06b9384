pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default
/// `trip_core=info` directive.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "trip_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // Another subscriber may already be installed by an embedding host.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
