use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geopush_core::{PermissionStatus, Platform, UserIdentity, SUMMARY_TITLE};
use orchestrator::config::{DEFAULT_COLLECTION, DEFAULT_PUSH_BODY, DEFAULT_PUSH_TITLE};
use orchestrator::TriggerPolicy;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

pub const CONFIG_DIR: &str = ".geopush";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_PORT: u16 = 3001;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Project configuration stored in `.geopush/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub identity: UserIdentity,
    #[serde(default)]
    pub workflow: WorkflowSection,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub base_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: "my-firebase-project".to_string(),
            api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            base_url: firestore::client::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub relay_url: String,
    /// EAS project id. Registration fails without it.
    pub project_id: Option<String>,
    pub app_id: Option<String>,
    pub access_token: Option<String>,
    pub development: bool,
    pub title: String,
    pub body: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            relay_url: push::DEFAULT_EXPO_BASE_URL.to_string(),
            project_id: None,
            app_id: None,
            access_token: None,
            development: false,
            title: DEFAULT_PUSH_TITLE.to_string(),
            body: DEFAULT_PUSH_BODY.to_string(),
        }
    }
}

/// Permission state of the device this host stands in for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub current: PermissionStatus,
    /// What the prompt answers when `current` is not granted.
    pub on_request: PermissionStatus,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            current: PermissionStatus::Undetermined,
            on_request: PermissionStatus::Granted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub platform: Platform,
    pub is_physical: bool,
    pub native_token: Option<String>,
    pub notifications: PermissionConfig,
    pub location: PermissionConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            is_physical: true,
            native_token: None,
            notifications: PermissionConfig::default(),
            location: PermissionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    #[default]
    Fixed,
    Ip,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub provider: LocationSource,
    pub latitude: f64,
    pub longitude: f64,
    pub ip_endpoint: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: LocationSource::Fixed,
            latitude: -6.2088,
            longitude: 106.8456,
            ip_endpoint: location::DEFAULT_IP_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    pub trigger_policy: TriggerPolicy,
    pub summary_title: String,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            trigger_policy: TriggerPolicy::default(),
            summary_title: SUMMARY_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Applied to every outbound request; 0 disables the timeout.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl AppConfig {
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Read the config file, or `None` when the project has not been
    /// initialized.
    pub async fn read(project_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(project_dir);
        if !path.exists() {
            debug!(path = %path.display(), "Config file does not exist");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "Config loaded");
        Ok(Some(config))
    }

    pub async fn write(&self, project_dir: &Path) -> Result<PathBuf> {
        let dir = project_dir.join(CONFIG_DIR);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).await?;
        debug!(path = %path.display(), "Config saved");
        Ok(path)
    }

    /// Secrets passed through the environment win over the file.
    pub fn with_overrides(
        mut self,
        firebase_api_key: Option<String>,
        push_access_token: Option<String>,
    ) -> Self {
        if let Some(key) = firebase_api_key.filter(|k| !k.is_empty()) {
            self.firebase.api_key = Some(key);
        }
        if let Some(token) = push_access_token.filter(|t| !t.is_empty()) {
            self.push.access_token = Some(token);
        }
        self
    }
}
