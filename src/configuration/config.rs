#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::StorageName;
use crate::domain::models::TriggerPosition;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

pub const APP_DIR: &str = "ktg-hub";

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    GatewayHealthCheckTimeout,
    GatewayStallTimeout,
    GatewayToken,
    GatewayUrl,
    Storage,
    StorageDir,
    SystemPrompt,
    TriggerPosition,
}

/// Joins the app directory onto a platform directory, falling back to the temp
/// directory on platforms that don't have one.
pub fn app_dir(base: Option<path::PathBuf>) -> path::PathBuf {
    return base.unwrap_or_else(env::temp_dir).join(APP_DIR);
}

/// Directory the JSON debug log is written to when `RUST_LOG` mentions the crate.
pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("KTG_HUB_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return app_dir(dirs::cache_dir());
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    /// Reads a millisecond value.
    pub fn duration(key: ConfigKey) -> Result<Duration> {
        let val = Config::get(key);
        return match val.parse::<u64>() {
            Ok(millis) => Ok(Duration::from_millis(millis)),
            Err(_) => bail!(format!(
                "Config key '{key}' must be a number of milliseconds, got '{val}'"
            )),
        };
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = app_dir(dirs::config_dir()).join("config.toml");
        let storage_dir = app_dir(dirs::data_dir()).join("storage");
        let default_storage = StorageName::File.to_string();
        let default_trigger = TriggerPosition::hub_section().to_string();

        let res = match key {
            ConfigKey::GatewayHealthCheckTimeout => "1000",
            ConfigKey::GatewayStallTimeout => "30000",
            ConfigKey::GatewayToken => "",
            ConfigKey::GatewayUrl => "https://ai-gateway.vercel.sh",
            ConfigKey::Storage => &default_storage,
            ConfigKey::TriggerPosition => &default_trigger,
            ConfigKey::SystemPrompt => "",

            // Paths
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
            ConfigKey::StorageDir => return storage_dir.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    fn validate() -> Result<()> {
        Config::duration(ConfigKey::GatewayHealthCheckTimeout)?;
        Config::duration(ConfigKey::GatewayStallTimeout)?;
        Config::get(ConfigKey::TriggerPosition).parse::<TriggerPosition>()?;

        return Ok(());
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                let val = match doc.get(&key.to_string()) {
                    Some(val) => val,
                    None => continue,
                };

                // Use clap value parsers to do validation.
                let possible_values = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    .map(|arg| {
                        return arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    })
                    .unwrap_or_default();

                if let Some(val_int) = val.as_integer() {
                    Config::set(key, &val_int.to_string());
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if !possible_values.is_empty()
                        && !possible_values.contains(&val_str.to_string())
                    {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                    }
                    Config::set(key, val_str);
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        Config::validate()?;

        tracing::debug!(
            storage = Config::get(ConfigKey::Storage),
            storage_dir = Config::get(ConfigKey::StorageDir),
            gateway_url = Config::get(ConfigKey::GatewayUrl),
            trigger_position = Config::get(ConfigKey::TriggerPosition),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()?
                    .to_string()
                    .split("[default:")
                    .next()?
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i32>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
