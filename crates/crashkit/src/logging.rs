//! Global `tracing` subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crashkit_logbuffer::LogBufferLayer;

use crate::error::{CrashkitError, CrashkitResult};

/// Build the filter: `RUST_LOG` when set, otherwise `default_directive`.
///
/// # Errors
///
/// Returns an error if `default_directive` cannot be parsed.
pub fn env_filter(default_directive: &str) -> CrashkitResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|err| CrashkitError::logging(format!("invalid filter '{default_directive}': {err}"))),
    }
}

/// Install `registry + EnvFilter + fmt + LogBufferLayer` as the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already set.
pub fn init_logging(default_directive: &str, buffer_layer: LogBufferLayer) -> CrashkitResult<()> {
    tracing_subscriber::registry()
        .with(env_filter(default_directive)?)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true),
        )
        .with(buffer_layer)
        .try_init()
        .map_err(|err| CrashkitError::logging(err.to_string()))?;

    tracing::info!(filter = default_directive, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_rejected() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(env_filter("crashkit=loudest").is_err());
        }
        assert!(env_filter("debug").is_ok());
    }
}
