//! Shell configuration
//!
//! Resolution order:
//! 1. `--config <path>`
//! 2. `CMDMOD_CONFIG` environment variable
//! 3. `config.toml` in the platform config directory, when it exists
//! 4. built-in defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cmdmod_core::{HelpFraming, HelpLink, NamedColor};
use serde::Deserialize;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "CMDMOD_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Banner and links shown on help pages
    pub help: HelpFraming,
    /// Permissions granted to the console user
    pub permissions: Vec<String>,
    /// Model names that may be spawned
    pub models: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            help: default_framing(),
            permissions: vec!["*".to_string()],
            models: vec!["steve".to_string(), "zombie".to_string()],
        }
    }
}

/// Versioned banner with the project links
fn default_framing() -> HelpFraming {
    let link = |label: &str, url: &str, color: NamedColor| HelpLink {
        label: label.to_string(),
        url: url.to_string(),
        color,
    };
    HelpFraming {
        title: format!("BetterModel {}", env!("CARGO_PKG_VERSION")),
        links: vec![
            link(
                "Wiki",
                "https://github.com/toxicity188/BetterModel/wiki",
                NamedColor::Aqua,
            ),
            link(
                "Download",
                "https://modrinth.com/plugin/bettermodel/versions",
                NamedColor::Green,
            ),
            link(
                "Discord",
                "https://discord.com/invite/rePyFESDbk",
                NamedColor::Blue,
            ),
        ],
    }
}

/// Path of the config file to read, if any
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(|| global_config_path().filter(|path| path.exists()))
}

/// Load the configuration from `path`, or defaults when there is none
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_toml_file(path).await,
        None => Ok(Config::default()),
    }
}

fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cmdmod")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

async fn load_toml_file(path: &Path) -> Result<Config> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() -> Result<()> {
        let file = config_file(
            r#"
            models = ["alex"]

            [help]
            title = "BetterModel"
            "#,
        )?;

        let config = load_config(Some(file.path())).await?;

        assert_eq!(config.models, ["alex"]);
        assert_eq!(config.help.title, "BetterModel");
        assert!(config.help.links.is_empty());
        assert_eq!(config.permissions, ["*"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_toml_names_the_file() -> Result<()> {
        let file = config_file("models = [")?;

        let error = load_config(Some(file.path()))
            .await
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();

        assert!(error.contains("Failed to parse config file"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/cmdmod.toml"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_no_path_yields_defaults() -> Result<()> {
        let config = load_config(None).await?;

        assert_eq!(config, Config::default());
        assert_eq!(
            config.help.title,
            format!("BetterModel {}", env!("CARGO_PKG_VERSION"))
        );
        let labels: Vec<&str> = config.help.links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["Wiki", "Download", "Discord"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_without_help_table_keeps_default_framing() -> Result<()> {
        let file = config_file(r#"permissions = ["bettermodel.*"]"#)?;

        let config = load_config(Some(file.path())).await?;

        assert_eq!(config.help, Config::default().help);
        assert_eq!(config.permissions, ["bettermodel.*"]);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins_over_env() {
        std::env::set_var(CONFIG_ENV, "/from/env.toml");

        let explicit = resolve_config_path(Some(Path::new("/from/flag.toml")));
        let from_env = resolve_config_path(None);

        std::env::remove_var(CONFIG_ENV);
        assert_eq!(explicit, Some(PathBuf::from("/from/flag.toml")));
        assert_eq!(from_env, Some(PathBuf::from("/from/env.toml")));
    }
}
