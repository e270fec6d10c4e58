//! Configuration for the initial console window state.
//!
//! The configuration file is located at `~/.winconsole/config.toml`:
//!
//! ```toml
//! title = "Debug Console"
//!
//! [window]
//! always_on_top = false
//! close_button = true
//! state = "normal"    # normal, minimized, hidden
//! width = 800
//! height = 600
//! ```
//!
//! Every field is optional. A missing or malformed file falls back to the
//! defaults.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::backend::ConsoleBackend;
use crate::core::session::ConsoleSession;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Console window title
    pub title: Option<String>,
    /// Window settings
    pub window: WindowConfig,
}

/// Window visibility right after the session opens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartState {
    #[default]
    Normal,
    Minimized,
    Hidden,
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub always_on_top: bool,
    pub close_button: bool,
    pub state: StartState,
    /// Outer width in pixels
    pub width: Option<i32>,
    /// Outer height in pixels
    pub height: Option<i32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            always_on_top: false,
            close_button: true,
            state: StartState::Normal,
            width: None,
            height: None,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from file
    pub fn load() -> Self {
        let Some(path) = Self::get_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".winconsole").join("config.toml"))
    }

    /// Directory holding config and log files
    pub fn get_data_dir() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".winconsole"))
    }

    /// Bring an open session in line with this configuration
    ///
    /// Order: close button, size, stacking, then visibility, so the start
    /// state is not undone by the always-on-top call re-showing the window.
    pub fn apply<B: ConsoleBackend>(&self, session: &mut ConsoleSession<B>) {
        let window = &self.window;

        if window.close_button {
            session.enable_close_button();
        } else {
            session.disable_close_button();
        }

        if let Some(width) = window.width {
            if !session.set_width(width) {
                debug!("Could not apply configured width {}", width);
            }
        }
        if let Some(height) = window.height {
            if !session.set_height(height) {
                debug!("Could not apply configured height {}", height);
            }
        }

        if window.always_on_top {
            session.set_always_on_top();
        }

        match window.state {
            StartState::Normal => {}
            StartState::Minimized => {
                session.minimize();
            }
            StartState::Hidden => {
                session.hide();
            }
        }
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
