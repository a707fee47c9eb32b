//! Property-based tests for configuration module
//!
//! These tests use proptest to generate random configurations and verify
//! invariants, serialization round-trips, and edge case handling.

use super::*;
use proptest::prelude::*;

// Strategy for generating valid window configurations
prop_compose! {
    fn valid_window_config()(
        title in "[a-zA-Z0-9 _-]{1,40}",
        width in 1u32..4096u32,
        height in 1u32..4096u32,
        fill_color in any::<u32>(),
    ) -> WindowConfig {
        WindowConfig {
            title,
            width,
            height,
            fill_color,
        }
    }
}

// Strategy for generating valid keyboard configurations
prop_compose! {
    fn valid_keyboard_config()(
        scancode_offset in 0u32..16u32,
        max_keymap_bytes in 1u32..(8 * 1024 * 1024),
    ) -> KeyboardConfig {
        KeyboardConfig {
            scancode_offset,
            max_keymap_bytes,
        }
    }
}

prop_compose! {
    fn valid_config()(
        window in valid_window_config(),
        keyboard in valid_keyboard_config(),
    ) -> WayechoConfig {
        WayechoConfig { window, keyboard }
    }
}

proptest! {
    #[test]
    fn generated_configs_validate(config in valid_config()) {
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_preserves_config(config in valid_config()) {
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: WayechoConfig = toml::from_str(&serialized).unwrap();
        prop_assert_eq!(config, deserialized);
    }

    #[test]
    fn buffer_size_never_overflows(config in valid_config()) {
        // stride * height must fit in i32 for the wl_shm_pool request
        let stride = config.window.width as u64 * 4;
        let size = stride * config.window.height as u64;
        prop_assert!(size <= i32::MAX as u64);
    }
}
