//! Configuration loading for the CLI.

use std::path::{Path, PathBuf};

use mailsift_engine::EngineConfig;
use tracing::debug;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Default configuration file: `~/.mailsift/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mailsift").join("config.toml"))
}

/// Load the engine configuration for this invocation.
///
/// An explicit path must exist. The default path is optional; built-in
/// defaults apply when it is absent. Command-line overrides are applied
/// last, then a missing or `"__ENV__"` API key is read from the provider's
/// environment variable.
pub fn load(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => read(path)?,
        None => match default_path().filter(|p| p.is_file()) {
            Some(path) => read(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                EngineConfig::default()
            }
        },
    };

    if let Some(dir) = &cli.prompts_dir {
        config.prompts_dir = Some(dir.clone());
    }
    if let Some(provider) = &cli.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }

    Ok(config.with_env_fallback())
}

fn read(path: &Path) -> Result<EngineConfig> {
    debug!("Loading configuration from {}", path.display());
    EngineConfig::from_file(path)
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_explicit_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[llm]\nprovider = \"google\"\nmodel = \"gemini-1.5-flash\"\napi_key = \"k\"\n\n[topics]\nn_topics = 4\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "mailsift",
            "--config",
            path.to_str().unwrap(),
            "--model",
            "gemini-1.5-pro",
            "client",
        ]);
        let config = load(&cli).unwrap();

        assert_eq!(config.llm.provider, "google");
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.topics.n_topics, 4);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let cli = Cli::parse_from(["mailsift", "--config", "/nonexistent/mailsift.toml", "client"]);
        assert!(matches!(load(&cli), Err(CliError::Config(_))));
    }
}
