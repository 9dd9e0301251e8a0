//! Configuration resolution
//!
//! Every external endpoint and credential (object store, worker, classifier,
//! narrative LLM, video search) is an environment-style configuration input.
//! Settings resolve with the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//!
//! Services pass their clap-parsed value as `cli_arg`; clap's own `env`
//! fallback is not used for these settings so the TOML tier keeps its place
//! in the priority order.

use crate::{Error, Result};
use std::path::PathBuf;

/// Resolve a single setting from CLI, environment, or TOML config
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_config: Option<&toml::Value>,
    toml_key: &str,
) -> Option<String> {
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        if !value.trim().is_empty() {
            return Some(value.to_string());
        }
    }

    // Priority 2: Environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.trim().is_empty() {
            return Some(value);
        }
    }

    // Priority 3: TOML config file
    if let Some(config) = toml_config {
        if let Some(value) = config.get(toml_key).and_then(|v| v.as_str()) {
            if !value.trim().is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Resolve a required setting, failing with a configuration hint
pub fn resolve_required_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_config: Option<&toml::Value>,
    toml_key: &str,
) -> Result<String> {
    resolve_setting(cli_arg, env_var_name, toml_config, toml_key).ok_or_else(|| {
        Error::Config(format!(
            "{} not configured. Provide it via CLI flag, the {} environment \
             variable, or the `{}` key in the service TOML config.",
            toml_key, env_var_name, toml_key
        ))
    })
}

/// Path of the per-service TOML config file.
///
/// Linux: `~/.config/aegis/<service>.toml`, falling back to
/// `/etc/aegis/<service>.toml`. Other platforms use the OS config dir.
pub fn config_file_path(service: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", service);

    if let Some(path) = dirs::config_dir().map(|d| d.join("aegis").join(&file_name)) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/aegis").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load the per-service TOML config if one exists.
///
/// A missing file is not an error (services start with CLI/ENV settings
/// alone); an unreadable or malformed file is.
pub fn load_toml_config(service: &str) -> Result<Option<toml::Value>> {
    let Some(path) = config_file_path(service) else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let value = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    Ok(Some(value))
}
