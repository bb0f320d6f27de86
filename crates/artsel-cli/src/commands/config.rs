//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use artsel_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "page_size": config.page_size,
                    "fields": config.fields,
                    "data_dir": config.data_dir,
                    "session": config.session,
                    "request_timeout_secs": config.request_timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_url:              {}", config.api_url);
            println!("  page_size:            {}", config.page_size);
            println!("  fields:               {}", config.fields.join(","));
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  session:              {}", config.session);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    match config_path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply one `key = value` setting to a config
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api_url" => {
            if value.is_empty() {
                bail!("api_url cannot be empty");
            }
            config.api_url = value.to_string();
        }
        "page_size" => {
            let size: usize = value
                .parse()
                .context("Invalid value for page_size. Use a positive number.")?;
            if size == 0 {
                bail!("page_size must be at least 1");
            }
            config.page_size = size;
        }
        "fields" => {
            config.fields = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "data_dir" => {
            config.data_dir = value.into();
        }
        "session" => {
            config.session = value.to_string();
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: api_url, page_size, fields, data_dir, session, request_timeout_secs, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_page_size() {
        let mut config = Config::default();

        apply_setting(&mut config, "page_size", "20").unwrap();
        assert_eq!(config.page_size, 20);

        assert!(apply_setting(&mut config, "page_size", "0").is_err());
        assert!(apply_setting(&mut config, "page_size", "lots").is_err());
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_apply_fields() {
        let mut config = Config::default();
        apply_setting(&mut config, "fields", "id, title,,artist_display").unwrap();
        assert_eq!(config.fields, vec!["id", "title", "artist_display"]);
    }

    #[test]
    fn test_apply_log_file_none() {
        let mut config = Config::default();
        apply_setting(&mut config, "log_file", "/tmp/artsel.log").unwrap();
        assert!(config.log_file.is_some());
        apply_setting(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_unknown_key() {
        let mut config = Config::default();
        let err = apply_setting(&mut config, "favorite_tag", "x").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }
}
