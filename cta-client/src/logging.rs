//! Log filter setup for the `cta` binary
//!
//! The subscriber has to exist before configuration is resolved, or the
//! resolver's own warnings are dropped. So the filter starts from `RUST_LOG`
//! (or `info`) and is narrowed to the configured level afterwards.

use tracing_subscriber::{reload, EnvFilter, Registry};

use crate::error::{ClientError, ClientResult};

/// Level used until configuration has been read
pub const STARTUP_LEVEL: &str = "info";

/// Filter layer to install first on the registry
pub type FilterLayer = reload::Layer<EnvFilter, Registry>;

/// Handle for replacing the startup filter once configuration is known
#[derive(Clone)]
pub struct LogFilterHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Build the startup filter from a `RUST_LOG` value
///
/// A value that fails to parse is ignored, as if unset.
pub fn startup_filter(rust_log: Option<&str>) -> (FilterLayer, LogFilterHandle) {
    let (filter, from_env) = match rust_log.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, true),
        _ => (EnvFilter::new(STARTUP_LEVEL), false),
    };
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogFilterHandle { handle, from_env })
}

impl LogFilterHandle {
    /// Whether `RUST_LOG` supplied the filter
    pub fn from_env(&self) -> bool {
        self.from_env
    }

    /// Switch to the configured level unless `RUST_LOG` was set
    pub fn apply_config_level(&self, level: &str) -> ClientResult<()> {
        if self.from_env {
            return Ok(());
        }
        let filter = EnvFilter::try_new(level).map_err(|e| config_error(level, e))?;
        self.handle
            .reload(filter)
            .map_err(|e| config_error(level, e))
    }
}

fn config_error(level: &str, e: impl std::fmt::Display) -> ClientError {
    ClientError::Common(cta_common::Error::Config(format!(
        "Invalid logging level {:?}: {}",
        level, e
    )))
}
