//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_qc;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::QcBlueprint;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Load a blueprint, resolving relative session paths against `data_root`
/// (or the config file's directory when no root is given)
pub(crate) fn load_blueprint(config: &Path, data_root: Option<&PathBuf>) -> Result<QcBlueprint> {
    if !config.exists() {
        return Err(CliError::config_not_found(config.display().to_string()).into());
    }

    let root = match data_root {
        Some(root) => root.clone(),
        None => config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    config_loader::ConfigLoader::load_with_root(config, &root)
        .with_context(|| format!("Failed to load config from {}", config.display()))
}
