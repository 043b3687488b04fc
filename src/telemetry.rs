#[cfg(feature = "telemetry")]
use std::sync::OnceLock;

#[cfg(feature = "telemetry")]
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing subscriber once per process.
#[cfg(feature = "telemetry")]
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();

    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("unity_clippy=info"));
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

#[cfg(not(feature = "telemetry"))]
pub fn init_tracing() {}

/// Emit a debug-level trace when symbol resolution fails open.
///
/// Resolution failures never surface as diagnostics; this is the only place
/// they are observable at all.
#[macro_export]
macro_rules! trace_unresolved {
    ($($arg:tt)*) => {
        #[cfg(feature = "telemetry")]
        {
            tracing::debug!($($arg)*);
        }
    };
}
