//! Configuration Layer Management
//!
//! Built-in defaults, then a YAML file (explicit `--config` or an implicit
//! `.plagiscan.yml` in the working directory), then CLI/environment overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use plagiscan::core::config::PlagiscanConfig;

/// Overrides coming from CLI flags and the environment
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
}

impl CliOverrides {
    /// Apply every override that was set.
    pub fn apply(&self, config: &mut PlagiscanConfig) {
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
    }
}

/// Configuration file to read, if any.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| PlagiscanConfig::find_implicit(cwd))
}

/// Read a configuration file; `.json` files are parsed as JSON, anything else as YAML.
pub fn read_config_file(path: &Path) -> anyhow::Result<PlagiscanConfig> {
    PlagiscanConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Build the effective configuration and validate it.
pub async fn load_configuration(
    explicit: Option<&Path>,
    overrides: &CliOverrides,
) -> anyhow::Result<PlagiscanConfig> {
    let cwd = std::env::current_dir()?;
    let mut config = match resolve_config_path(explicit, &cwd) {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            read_config_file(&path)?
        }
        None => PlagiscanConfig::default(),
    };

    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}
