//! Environment-driven defaults, read once per process.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_PRESETS_FILE: &str = "datamatrix_presets.ini";
pub const DEFAULT_SETTINGS_FILE: &str = "datamatrix_settings.ini";

fn parse_env_path(name: &str, default: &str) -> PathBuf {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}

fn parse_env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off"),
        Err(_) => false,
    }
}

static PRESETS_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Preset store location (`DMTX_PRESETS_PATH`)
pub fn presets_path() -> &'static Path {
    PRESETS_PATH.get_or_init(|| parse_env_path("DMTX_PRESETS_PATH", DEFAULT_PRESETS_FILE))
}

static SETTINGS_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Settings store location (`DMTX_SETTINGS_PATH`)
pub fn settings_path() -> &'static Path {
    SETTINGS_PATH.get_or_init(|| parse_env_path("DMTX_SETTINGS_PATH", DEFAULT_SETTINGS_FILE))
}

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// `DMTX_DEBUG` set to anything but a false-ish value
pub fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| parse_env_flag("DMTX_DEBUG"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variables_use_defaults() {
        assert_eq!(
            parse_env_path("DMTX_TEST_UNSET_PATH_VAR", DEFAULT_PRESETS_FILE),
            PathBuf::from("datamatrix_presets.ini")
        );
        assert!(!parse_env_flag("DMTX_TEST_UNSET_FLAG_VAR"));
    }
}
