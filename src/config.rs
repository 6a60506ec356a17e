//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::RoadmapError;
use crate::model::TimeMode;
use crate::roadmap::gesture::GestureConfig;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RoadmapSettings {
    /// Axis shown on startup.
    pub mode: TimeMode,
    /// Directory holding the workbook CSV files; `None` opens the demo data.
    pub workbook_dir: Option<PathBuf>,
    pub click_delay_ms: u64,
    pub drag_threshold_px: f32,
    pub phase_margin_px: f32,
    pub min_column_width: f32,
    pub mini_fallback_weeks: u32,
    pub migrate_links_on_rename: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Weeks shown ahead of today in a fresh window.
    pub visible_weeks: i64,
}

impl Default for RoadmapSettings {
    fn default() -> Self {
        Self {
            mode: TimeMode::Sprint,
            workbook_dir: None,
            click_delay_ms: 250,
            drag_threshold_px: 5.0,
            phase_margin_px: 4.0,
            min_column_width: 90.0,
            mini_fallback_weeks: 5,
            migrate_links_on_rename: true,
            log_filter: "info".into(),
            visible_weeks: 16,
        }
    }
}

impl RoadmapSettings {
    pub fn gesture(&self) -> GestureConfig {
        GestureConfig {
            click_delay: Duration::from_millis(self.click_delay_ms),
            drag_threshold: self.drag_threshold_px.max(0.0),
        }
    }

    /// `settings.json` under the platform config directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "ChantierRoadmap")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    /// Load settings; a missing file yields defaults, a corrupt one is logged
    /// and replaced by defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), RoadmapError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| RoadmapError::Settings(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RoadmapError::Settings(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| RoadmapError::Settings(e.to_string()))?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}
