//! Harness configuration — endpoint, resources, credentials, templates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Harness configuration, loaded once per run and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the API under test.
    pub base_url: String,

    /// Subscription key sent in the system header part.
    pub subscription_key: String,

    /// Root directory of the body-template store.
    pub template_root: PathBuf,

    /// Per-resource root paths, `%s` marks the id placeholder.
    /// e.g. `hearings = "/casehqs/rest/hearings"`,
    /// `resources = "/casehqs/rest/resources/%s"`.
    #[serde(default)]
    pub resources: HashMap<String, String>,

    /// OAuth token endpoint and credentials; token fetched once at setup.
    #[serde(default)]
    pub oauth: Option<OauthConfig>,
}

/// Password-grant token endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthConfig {
    pub token_url: String,
    pub username: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            subscription_key: String::new(),
            template_root: PathBuf::from("templates"),
            resources: HashMap::new(),
            oauth: None,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apicheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".apicheck.toml", ".apicheck.json", "apicheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Full URL for a named resource, substituting `%s` with `id` when the
    /// root carries a placeholder.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnknownResource` if the name is not configured;
    /// `ConfigError::MissingId` if the root has a placeholder and no id
    /// was supplied.
    pub fn resource_url(&self, name: &str, id: Option<&str>) -> Result<String, ConfigError> {
        let root = self
            .resources
            .get(name)
            .ok_or_else(|| ConfigError::UnknownResource(name.to_string()))?;

        let path = if root.contains("%s") {
            let id = id.ok_or_else(|| ConfigError::MissingId(name.to_string()))?;
            root.replace("%s", id)
        } else {
            root.clone()
        };

        Ok(format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            path
        ))
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apicheck configuration

# API under test
base_url = "http://localhost:8080"

# Subscription key sent with every request
subscription_key = "your-subscription-key"

# Root directory of body templates
template_root = "templates"

# Resource roots; %s marks the id placeholder
[resources]
hearings = "/rest/hearings"
sessions = "/rest/sessions"
# resource-by-id = "/rest/resources/%s"

# OAuth token endpoint (token fetched once before the first scenario)
# [oauth]
# token_url = "https://idp.example.com/oauth/token"
# username = "svc-account"
# password = "secret"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("unknown resource {0:?}")]
    UnknownResource(String),
    #[error("resource {0:?} requires an id")]
    MissingId(String),
}
