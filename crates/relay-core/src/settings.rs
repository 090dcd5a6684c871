use clap::Parser;
use std::path::PathBuf;

use crate::error::{RelayError, Result};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Relays webapp unread-notification reports into a status-bar badge file
#[derive(Parser, Debug, Clone)]
#[command(
    name = "badge-relay",
    about = "Listens for HTTP POST requests reporting unread notifications in webapps and publishes a status-bar badge",
    version
)]
pub struct Settings {
    /// Host interface to bind the notification listener on
    #[arg(long, env = "BADGE_HOST", default_value = "localhost")]
    pub host: String,

    /// Port to bind the notification listener on
    #[arg(long, env = "BADGE_PORT", default_value_t = 18989)]
    pub port: u16,

    /// Base directory the status file is published under
    #[arg(long, env = "BADGE_STATUS_DIR", default_value_os_t = default_status_dir())]
    pub status_dir: PathBuf,

    /// Logging level
    #[arg(long, env = "BADGE_LOG_LEVEL", default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,
}

impl Settings {
    /// Validate the parsed settings into a [`RelayConfig`].
    pub fn to_config(&self) -> Result<RelayConfig> {
        RelayConfig::new(self.host.clone(), self.port, self.status_dir.clone())
    }
}

/// Default base directory for the published status file,
/// `~/.config/badge-relay`.
pub fn default_status_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("badge-relay")
}

// ── RelayConfig ────────────────────────────────────────────────────────────────

/// Validated runtime configuration handed to the listener and publisher.
///
/// Construction fails when a required field is missing, naming the field, so
/// the process refuses to start on bad configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listener bind host.
    pub host: String,
    /// Listener bind port.
    pub port: u16,
    /// Directory the status file is written under.
    pub status_dir: PathBuf,
}

impl RelayConfig {
    /// Build a configuration, defaulting an empty host to `localhost`.
    pub fn new(host: String, port: u16, status_dir: PathBuf) -> Result<Self> {
        if port == 0 {
            return Err(RelayError::PortNotSet);
        }
        if status_dir.as_os_str().is_empty() {
            return Err(RelayError::StatusDirNotSet);
        }
        let host = if host.is_empty() {
            "localhost".to_string()
        } else {
            host
        };
        Ok(Self {
            host,
            port,
            status_dir,
        })
    }

    /// The bind address for the notification listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Canonical path of the published status file.
    pub fn status_file(&self) -> PathBuf {
        self.status_dir.join(".notifications")
    }

    /// Sibling temp path the status file is staged at before the atomic
    /// rename.
    pub fn status_temp_file(&self) -> PathBuf {
        self.status_dir.join(".notifications.tmp")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
