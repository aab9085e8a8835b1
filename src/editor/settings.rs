use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditServiceSettings {
    /// Endpoint of the generative edit service. Empty means "not configured"
    /// and the app falls back to the offline mock service.
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EditServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EditServiceSettings {
    /// Returns a redacted clone that replaces the api key with masked form
    /// when non-empty.
    pub fn masked(&self) -> Self {
        let mut cloned = self.clone();
        if let Some(key) = cloned.api_key.take() {
            if !key.is_empty() {
                let prefix: String = key.chars().take(2).collect();
                cloned.api_key = Some(format!("{}****", prefix));
            }
        }
        cloned
    }

    pub fn normalize(mut self) -> Self {
        self.endpoint = self.endpoint.trim().to_string();
        if let Some(key) = self.api_key.take() {
            let trimmed = key.trim();
            if !trimmed.is_empty() {
                self.api_key = Some(trimmed.to_string());
            }
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

pub fn load_settings(path: &Path) -> io::Result<EditServiceSettings> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

pub fn save_settings(path: &Path, settings: &EditServiceSettings) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(settings)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    fs::write(path, json)
}

pub fn default_settings_path(root: &Path) -> PathBuf {
    root.join("edit_service_settings.json")
}
