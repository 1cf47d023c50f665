//! Configuration for BuildWatch.
//!
//! Settings come from three layers, later layers winning:
//! - built-in defaults
//! - an optional KDL file (buildwatch.kdl)
//! - environment variables

pub mod env;
pub mod error;
pub mod file;
pub mod settings;

use std::path::Path;

pub use error::{ConfigError, ConfigResult};
pub use settings::{BotConfig, JenkinsSettings, RawConfig, SlackSettings};

/// Load configuration from an optional KDL file and the process environment.
pub fn load(path: Option<&Path>) -> ConfigResult<BotConfig> {
    let mut raw = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Reading configuration file");
            let content = std::fs::read_to_string(path)?;
            file::parse_config(&content)?
        }
        None => RawConfig::default(),
    };

    env::apply_overrides(&mut raw, |key| std::env::var(key).ok())?;
    raw.build()
}
