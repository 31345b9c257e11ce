use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".ebashrc.toml";

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Text before the folder name in the prompt.
    pub prompt: String,
    /// `~/` is expanded against `HOME`. No history file when absent.
    pub history_file: Option<String>,
    /// Merge `./.env` into the starting environment.
    pub load_dotenv: bool,
    pub env: HashMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "e-bash".to_string(),
            history_file: Some("~/.ebash_history".to_string()),
            load_dotenv: true,
            env: HashMap::new(),
        }
    }
}

impl ShellConfig {
    pub fn history_path(&self, home: Option<&str>) -> Option<PathBuf> {
        let file = self.history_file.as_deref()?;
        match (file.strip_prefix("~/"), home) {
            (Some(rest), Some(home)) => Some(Path::new(home).join(rest)),
            (Some(_), None) => None,
            (None, _) => Some(PathBuf::from(file)),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}

/// A missing file means defaults; a file that exists must parse.
pub fn load_config(path: &Path) -> Result<ShellConfig> {
    if !path.exists() {
        debug!("no config at {}, using defaults", path.display());
        return Ok(ShellConfig::default());
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ShellConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Variables the shell starts with: the process environment, then `[env]`,
/// then `.env` from `cwd` when enabled. `PWD` and `SHLVL` are set last.
pub fn initial_environment(config: &ShellConfig, cwd: &Path) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = env::vars().collect();
    layer_environment(&mut vars, config, cwd);
    vars
}

fn layer_environment(vars: &mut HashMap<String, String>, config: &ShellConfig, cwd: &Path) {
    vars.extend(config.env.iter().map(|(k, v)| (k.clone(), v.clone())));

    let env_path = cwd.join(".env");
    if config.load_dotenv && env_path.is_file() {
        match dotenvy::from_path_iter(&env_path) {
            Ok(items) => {
                for item in items {
                    match item {
                        Ok((key, value)) => {
                            vars.insert(key, value);
                        }
                        Err(e) => warn!("skipping bad line in {}: {}", env_path.display(), e),
                    }
                }
                info!("loaded environment from {}", env_path.display());
            }
            Err(e) => warn!("cannot read {}: {}", env_path.display(), e),
        }
    }

    vars.insert("PWD".to_string(), cwd.to_string_lossy().into_owned());
    let level = next_shell_level(vars.get("SHLVL").map(String::as_str));
    vars.insert("SHLVL".to_string(), level.to_string());
}

fn next_shell_level(current: Option<&str>) -> i64 {
    match current.map(|v| v.trim().parse::<i64>()) {
        Some(Ok(n)) if n >= 0 => n + 1,
        Some(Ok(_)) => 0,
        _ => 1,
    }
}
