//! Configuration file loading for schedkit.
use std::{collections::BTreeMap, env, fs, path::Path, sync::LazyLock};

use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::debug;

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::deployment::{Deployment, DeploymentConfig, DeploymentOverrides};
use crate::error::DeployError;
use crate::options::{DaemonConfig, OptionValue, canonical_name};

/// Represents the structure of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Release, path and identity settings.
    #[serde(default)]
    pub deployment: DeploymentOverrides,
    /// Scheduler flag overrides keyed by option name.
    #[serde(default)]
    pub flags: BTreeMap<String, OptionValue>,
}

impl Config {
    /// Layers `key=value` overrides on top of the file's flags.
    ///
    /// A later override replaces any earlier spelling of the same option.
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in overrides {
            let canonical = canonical_name(&key);
            self.flags.retain(|existing, _| canonical_name(existing) != canonical);
            self.flags.insert(key, OptionValue::from(value));
        }
    }

    /// Resolves both halves of the configuration.
    pub fn into_deployment(self) -> Result<Deployment, DeployError> {
        let daemon = DaemonConfig::resolve(self.flags)?;
        let deployment = DeploymentConfig::resolve(self.deployment);
        Ok(Deployment::new(deployment, daemon))
    }
}

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?").expect("env var pattern is valid")
});

/// Expands `${VAR}` and `$VAR` references within a string.
fn expand_env_vars(input: &str) -> Result<String, DeployError> {
    let mut missing = None;
    let result = ENV_VAR.replace_all(input, |caps: &Captures| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(DeployError::MissingEnvVar(var_name)),
        None => Ok(result.into_owned()),
    }
}

/// Parses configuration text, expanding environment variables first.
pub fn parse_config(content: &str) -> Result<Config, DeployError> {
    let expanded = expand_env_vars(content)?;
    if expanded.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&expanded).map_err(DeployError::ConfigParseError)
}

/// Loads and parses the configuration file.
///
/// With no explicit path, `schedkit.yaml` is read when present and built-in
/// defaults are used otherwise.
pub fn load_config(config_path: Option<&str>) -> Result<Config, DeployError> {
    let config_path = match config_path {
        Some(path) => Path::new(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => {
            debug!("No {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            return Ok(Config::default());
        }
    };

    let content = fs::read_to_string(config_path).map_err(|e| {
        DeployError::ConfigReadError(std::io::Error::new(
            e.kind(),
            format!("{} ({})", e, config_path.display()),
        ))
    })?;

    parse_config(&content)
}
