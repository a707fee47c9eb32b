//! Unit tests for configuration module
//!
//! Tests configuration parsing, validation, serialization/deserialization,
//! and edge cases in configuration handling.

use super::*;
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_configuration_is_valid() {
    let config = WayechoConfig::default();

    assert!(config.validate().is_ok());

    // The defaults reproduce the classic demo window
    assert_eq!(config.window.width, 200);
    assert_eq!(config.window.height, 200);
    assert_eq!(config.window.fill_color, 0xFF99_9999);
    assert!(!config.window.title.is_empty());
    // Window titles stay plain ASCII, like every other string we emit
    assert!(config.window.title.is_ascii());

    // evdev scancodes are offset by 8 to become XKB keycodes
    assert_eq!(config.keyboard.scancode_offset, 8);
    assert!(config.keyboard.max_keymap_bytes > 0);
}

#[test]
fn test_configuration_serialization_roundtrip() -> Result<()> {
    let original_config = WayechoConfig::default();

    let toml_string = toml::to_string(&original_config)?;
    let deserialized_config: WayechoConfig = toml::from_str(&toml_string)?;

    assert_eq!(original_config, deserialized_config);

    Ok(())
}

#[test]
fn test_configuration_from_file() -> Result<()> {
    let dir = tempdir()?;
    let config_path = dir.path().join("wayecho.toml");

    let contents = r#"
[window]
title = "echo test"
width = 320
height = 240

[keyboard]
scancode_offset = 8
"#;
    fs::write(&config_path, contents)?;

    let config = WayechoConfig::load(&config_path)?;
    assert_eq!(config.window.title, "echo test");
    assert_eq!(config.window.width, 320);
    assert_eq!(config.window.height, 240);
    // Omitted fields fall back to defaults
    assert_eq!(config.window.fill_color, 0xFF99_9999);
    assert_eq!(config.keyboard.max_keymap_bytes, 1024 * 1024);

    Ok(())
}

#[test]
fn test_partial_configuration_uses_defaults() -> Result<()> {
    // A completely empty file is a valid configuration
    let config: WayechoConfig = toml::from_str("")?;
    assert_eq!(config, WayechoConfig::default());

    Ok(())
}

#[test]
fn test_load_or_default_with_missing_file() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("does-not-exist.toml");

    let config = WayechoConfig::load_or_default(&missing)?;
    assert_eq!(config, WayechoConfig::default());

    Ok(())
}

#[test]
fn test_invalid_toml_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let config_path = dir.path().join("broken.toml");
    fs::write(&config_path, "[window\ntitle = ")?;

    assert!(WayechoConfig::load(&config_path).is_err());

    Ok(())
}

#[test]
fn test_zero_sized_window_is_rejected() {
    let mut config = WayechoConfig::default();
    config.window.width = 0;
    assert!(config.validate().is_err());

    let mut config = WayechoConfig::default();
    config.window.height = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_oversized_window_is_rejected() {
    let mut config = WayechoConfig::default();
    config.window.width = 1 << 16;
    config.window.height = 1 << 16;
    assert!(config.validate().is_err());
}

#[test]
fn test_empty_title_is_rejected() {
    let mut config = WayechoConfig::default();
    config.window.title = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_keymap_cap_is_rejected() {
    let mut config = WayechoConfig::default();
    config.keyboard.max_keymap_bytes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let dir = tempdir()?;
    let config_path = dir.path().join("saved.toml");

    let mut config = WayechoConfig::default();
    config.window.title = "saved title".to_string();
    config.save(&config_path)?;

    let reloaded = WayechoConfig::load(&config_path)?;
    assert_eq!(config, reloaded);

    Ok(())
}
