use anyhow::{anyhow, Result};
use directories::BaseDirs;
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use github_backend::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Credential file name, looked up in the user's home directory.
/// Tokens can be generated at https://github.com/settings/tokens
pub const CREDENTIALS_FILE_NAME: &str = ".oauth-private-repository-control-for-github-backup.json";

/// Environment variable that points at a different credential file
pub const CREDENTIALS_ENV: &str = "ISSUE_PRINTER_CREDENTIALS";

const ENV_PREFIX: &str = "ISSUE_PRINTER_";

/// Runtime configuration, built once at startup and passed down explicitly
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// GitHub token read from the credential file
    #[serde(default)]
    pub token: String,
    /// API root; only changed for GitHub Enterprise or tests
    pub api_url: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("issue-printer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load from the default credential file (or the one named by
    /// `ISSUE_PRINTER_CREDENTIALS`), then `ISSUE_PRINTER_*` overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&credentials_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("Credential file not found: {}", path.display()));
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).only(&["token", "api_url", "user_agent"]))
            .extract()
            .map_err(|e| anyhow!("Failed to load config from {}: {}", path.display(), e))?;

        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(anyhow!(
                "No token configured. Add a \"token\" field to {}",
                path.display()
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(anyhow!("API URL must not be empty"));
        }
        Ok(())
    }
}

/// Resolve the credential file path
pub fn credentials_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CREDENTIALS_ENV) {
        return Ok(PathBuf::from(path));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(CREDENTIALS_FILE_NAME))
        .ok_or_else(|| anyhow!("Could not determine the home directory"))
}
