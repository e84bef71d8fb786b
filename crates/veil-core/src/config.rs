use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::geometry::Rect;

/// Occlusion settings (settings.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcclusionSettings {
    /// Screen size used when no monitor can be queried
    #[serde(default = "default_fallback_width")]
    pub fallback_width: i32,
    #[serde(default = "default_fallback_height")]
    pub fallback_height: i32,

    /// How far (in pixels) a window origin may sit from the monitor origin
    /// and still count as fullscreen. Compositors round scaled geometry.
    #[serde(default = "default_fullscreen_tolerance")]
    pub fullscreen_tolerance: i32,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Snapshot reuse window for callers polling faster than the compositor
    /// changes. 0 disables caching.
    #[serde(default)]
    pub cache_ttl_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// hyprctl binary name or path
    #[serde(default = "default_hyprctl")]
    pub hyprctl: CompactString,
}

fn default_fallback_width() -> i32 {
    1920
}

fn default_fallback_height() -> i32 {
    1080
}

fn default_fullscreen_tolerance() -> i32 {
    1
}

fn default_query_timeout_ms() -> u64 {
    1500
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_hyprctl() -> CompactString {
    CompactString::new("hyprctl")
}

impl Default for OcclusionSettings {
    fn default() -> Self {
        Self {
            fallback_width: default_fallback_width(),
            fallback_height: default_fallback_height(),
            fullscreen_tolerance: default_fullscreen_tolerance(),
            query_timeout_ms: default_query_timeout_ms(),
            cache_ttl_ms: 0,
            poll_interval_ms: default_poll_interval_ms(),
            hyprctl: default_hyprctl(),
        }
    }
}

impl OcclusionSettings {
    /// Get the default settings path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("veil/settings.json")
    }

    /// Load settings, falling back to defaults if the file is missing or invalid
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                debug!("No settings at {:?} ({}), using defaults", path, e);
                return Self::default();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse settings {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path.parent().ok_or_else(|| anyhow::anyhow!("Invalid path"))?;
        std::fs::create_dir_all(dir)?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Fallback geometry anchored at the origin
    pub fn fallback_rect(&self) -> Rect {
        Rect::new(0, 0, self.fallback_width, self.fallback_height)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: OcclusionSettings =
            serde_json::from_str(r#"{"fallback_width": 2560, "cache_ttl_ms": 150}"#).unwrap();
        assert_eq!(settings.fallback_width, 2560);
        assert_eq!(settings.fallback_height, 1080);
        assert_eq!(settings.fullscreen_tolerance, 1);
        assert_eq!(settings.cache_ttl(), Duration::from_millis(150));
        assert_eq!(settings.hyprctl, "hyprctl");
    }

    #[test]
    fn test_load_missing_or_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(OcclusionSettings::load(&path), OcclusionSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(OcclusionSettings::load(&path), OcclusionSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let settings = OcclusionSettings {
            fallback_width: 3440,
            fallback_height: 1440,
            query_timeout_ms: 900,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = OcclusionSettings::load(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.fallback_rect(), Rect::new(0, 0, 3440, 1440));
    }
}
