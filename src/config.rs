//! Configuration loading
//!
//! YAML configuration for the MIDI port names and the Carla OSC endpoints.
//! Every field has a default matching a local Carla and a directly attached
//! Launchpad X, so the gateway runs without a config file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub osc: OscConfig,
}

/// MIDI port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Substring matched against the Launchpad's port names
    #[serde(default = "default_hardware_port")]
    pub hardware_port: String,
    /// Name of the virtual port the downstream controller sends into
    #[serde(default = "default_controller_in")]
    pub controller_in: String,
    /// Name of the virtual port the downstream controller listens on
    #[serde(default = "default_controller_out")]
    pub controller_out: String,
}

/// Carla OSC endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OscConfig {
    /// Host Carla runs on
    #[serde(default = "default_osc_host")]
    pub host: String,
    /// Carla's OSC control port (TCP and UDP)
    #[serde(default = "default_osc_port")]
    pub port: u16,
    /// Local port the bridge listens on (TCP and UDP)
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            hardware_port: default_hardware_port(),
            controller_in: default_controller_in(),
            controller_out: default_controller_out(),
        }
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            host: default_osc_host(),
            port: default_osc_port(),
            listen_port: default_listen_port(),
        }
    }
}

fn default_hardware_port() -> String {
    "Launchpad X".to_string()
}

fn default_controller_in() -> String {
    "Controller in".to_string()
}

fn default_controller_out() -> String {
    "Controller out".to_string()
}

fn default_osc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_osc_port() -> u16 {
    22752
}

fn default_listen_port() -> u16 {
    22755
}

impl AppConfig {
    /// Load configuration from a YAML file; a missing file yields defaults
    pub async fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("No config file at {}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }
}
