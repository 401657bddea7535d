pub mod schema;

use std::path::{Path, PathBuf};

use crate::error::{Result, StacheError};

pub use schema::{
    BuildOptions, OptionsConfig, ResolvedTarget, SiteConfig, TargetConfig, TemplateTypes,
};

pub const CONFIG_FILE: &str = "stache.toml";

fn config_path(path: &Path) -> PathBuf {
    if path.ends_with(CONFIG_FILE) || path.is_file() {
        path.to_path_buf()
    } else {
        path.join(CONFIG_FILE)
    }
}

/// Load and validate a SiteConfig from a stache.toml file or the directory holding it.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    let config_path = config_path(path);

    if !config_path.exists() {
        return Err(StacheError::ConfigNotFound { path: config_path });
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| StacheError::Io {
        context: format!("reading {}", config_path.display()),
        source: e,
    })?;

    let config: SiteConfig =
        toml::from_str(&content).map_err(|e| StacheError::ConfigParse { source: e })?;

    config.validate()?;

    Ok(config)
}

/// Load `stache.toml` from `dir` if it exists, otherwise fall back to defaults.
pub fn load_config_or_default(dir: &Path) -> Result<SiteConfig> {
    if config_path(dir).exists() {
        load_config(dir)
    } else {
        Ok(SiteConfig::default())
    }
}
