//! Logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppEnv;

/// Default filter per environment; `RUST_LOG` takes precedence.
pub fn default_filter(env: AppEnv) -> &'static str {
    match env {
        AppEnv::Local | AppEnv::Dev => "regnum_api=debug,tower_http=debug",
        AppEnv::Prod => "regnum_api=info,tower_http=info",
    }
}

/// Installs the global subscriber: pretty output locally, compact in dev,
/// JSON lines in prod.
pub fn init_tracing(env: AppEnv) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(env).into());
    let registry = tracing_subscriber::registry().with(filter);

    match env {
        AppEnv::Local => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        AppEnv::Dev => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        AppEnv::Prod => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
