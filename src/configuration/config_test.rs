use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("storage = \"file\""));
    assert!(res.contains("trigger-position = \"top 70%\""));
    assert!(res.contains("gateway-stall-timeout = 30000"));
    assert!(res.contains("# gateway-token = \"\""));
    assert!(!res.contains("config-file"));
}

#[test]
fn it_describes_possible_values() {
    let res = Config::serialize_default(cli::build());
    assert!(res.contains("[possible values: file, memory]"));
}

#[test]
fn it_defaults_paths_under_the_app_dir() {
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
    assert!(Config::default(ConfigKey::StorageDir).contains("ktg-hub"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["ktg-hub", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["ktg-hub", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}

#[tokio::test]
async fn it_rejects_invalid_trigger_positions() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "ktg-hub",
        "-c",
        "./test/missing-config.toml",
        "--trigger-position",
        "left 60%",
    ])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
