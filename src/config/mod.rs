//! Configuration management for wayecho
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. The defaults reproduce the classic demo behavior
//! (a 200x200 light-gray window), so running without a config file is
//! fully supported.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration struct containing all wayecho settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WayechoConfig {
    /// Window appearance and metadata
    #[serde(default)]
    pub window: WindowConfig,

    /// Keyboard translation settings
    #[serde(default)]
    pub keyboard: KeyboardConfig,
}

/// Window appearance and metadata advertised to the compositor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    /// Title string shown by the compositor
    pub title: String,

    /// Window width in logical units (also the advertised minimum)
    pub width: u32,

    /// Window height in logical units (also the advertised minimum)
    pub height: u32,

    /// Fill color as 0xAARRGGBB (host byte order when written to the buffer)
    #[serde(default = "WindowConfig::default_fill_color")]
    pub fill_color: u32,
}

impl WindowConfig {
    fn default_fill_color() -> u32 {
        // Opaque alpha + light gray RGB
        0xFF99_9999
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "wayecho keyboard echo".to_string(),
            width: 200,
            height: 200,
            fill_color: Self::default_fill_color(),
        }
    }
}

/// Keyboard translation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyboardConfig {
    /// Offset added to raw evdev scancodes to obtain XKB keycodes
    #[serde(default = "KeyboardConfig::default_scancode_offset")]
    pub scancode_offset: u32,

    /// Upper bound on an accepted keymap transport, in bytes
    #[serde(default = "KeyboardConfig::default_max_keymap_bytes")]
    pub max_keymap_bytes: u32,
}

impl KeyboardConfig {
    fn default_scancode_offset() -> u32 {
        8
    }

    fn default_max_keymap_bytes() -> u32 {
        // Real xkb keymaps are tens of kilobytes; a megabyte is generous
        1024 * 1024
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            scancode_offset: Self::default_scancode_offset(),
            max_keymap_bytes: Self::default_max_keymap_bytes(),
        }
    }
}

impl WayechoConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let expanded_path = Self::expand_home(path)
            .context("Failed to expand config path")?;

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: WayechoConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from a file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let expanded_path = match Self::expand_home(path) {
            Ok(p) => p,
            // No HOME means no per-user config to find
            Err(_) => return Ok(Self::default()),
        };

        if expanded_path.exists() {
            Self::load(&expanded_path)
        } else {
            Ok(Self::default())
        }
    }

    // Expand a leading ~ to the home directory
    fn expand_home(path: &Path) -> Result<std::path::PathBuf> {
        if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            Ok(Path::new(&home).join(path.strip_prefix("~").unwrap_or(path)))
        } else {
            Ok(path.to_path_buf())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            anyhow::bail!("Invalid window size: width and height must be nonzero");
        }

        // Guard the width*height*4 buffer size computation
        let pixels = (self.window.width as u64) * (self.window.height as u64);
        if pixels > 64 * 1024 * 1024 {
            anyhow::bail!(
                "Invalid window size: {}x{} exceeds the buffer size cap",
                self.window.width,
                self.window.height
            );
        }

        if self.window.title.is_empty() {
            anyhow::bail!("Invalid window title: must not be empty");
        }

        if self.keyboard.max_keymap_bytes == 0 {
            anyhow::bail!("Invalid max_keymap_bytes: must be nonzero");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod property_tests;
