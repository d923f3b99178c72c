//! Application settings

use serde::{Deserialize, Serialize};
use shared::Color;

/// Unit system for measurement labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    Millimeters,
    Centimeters,
    #[default]
    Meters,
    Inches,
}

impl Units {
    /// Get the abbreviation for this unit
    pub fn abbrev(&self) -> &'static str {
        match self {
            Units::Millimeters => "mm",
            Units::Centimeters => "cm",
            Units::Meters => "m",
            Units::Inches => "in",
        }
    }

    /// Get the display name for this unit
    pub fn display_name(&self) -> &'static str {
        match self {
            Units::Millimeters => "Millimeters",
            Units::Centimeters => "Centimeters",
            Units::Meters => "Meters",
            Units::Inches => "Inches",
        }
    }

    /// All available units
    pub fn all() -> &'static [Units] {
        &[Units::Millimeters, Units::Centimeters, Units::Meters, Units::Inches]
    }
}

/// Gesture thresholds shared by the mouse and touch controls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Max press/release distance (px, per axis) that still counts as a click
    pub click_tolerance: f32,
    /// Max finger drift (px, per axis) from touch start for taps and long presses
    pub touch_tolerance: f32,
    /// Hold time that turns a touch into a long press
    pub long_touch_timeout_ms: u64,
    /// View-space z above which markers are hidden
    pub near_threshold: f32,
    /// Snap to vertices and edges while placing points
    pub snapping: bool,
    /// Axis labels hide when their wire is shorter than this on screen (px)
    pub label_min_axis_length: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            click_tolerance: 20.0,
            touch_tolerance: 20.0,
            long_touch_timeout_ms: 300,
            near_threshold: -0.3,
            snapping: true,
            label_min_axis_length: 25.0,
        }
    }
}

/// Flags applied to new annotations when their params leave them unset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDefaults {
    pub visible: bool,
    pub origin_visible: bool,
    pub target_visible: bool,
    pub wire_visible: bool,
    pub axis_visible: bool,
    pub x_axis_visible: bool,
    pub y_axis_visible: bool,
    pub z_axis_visible: bool,
    pub x_label_enabled: bool,
    pub y_label_enabled: bool,
    pub z_label_enabled: bool,
    pub length_label_enabled: bool,
    pub labels_visible: bool,
    pub labels_on_wires: bool,
    pub color: Color,
}

impl Default for PluginDefaults {
    fn default() -> Self {
        Self {
            visible: true,
            origin_visible: true,
            target_visible: true,
            wire_visible: true,
            axis_visible: true,
            x_axis_visible: true,
            y_axis_visible: true,
            z_axis_visible: true,
            x_label_enabled: true,
            y_label_enabled: true,
            z_label_enabled: true,
            length_label_enabled: true,
            labels_visible: true,
            labels_on_wires: true,
            color: Color::SKY,
        }
    }
}

/// Label text settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSettings {
    /// Number of decimal places for lengths
    pub precision: usize,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Display units
    #[serde(default)]
    pub units: Units,
    /// Gesture thresholds
    #[serde(default)]
    pub controls: ControlSettings,
    /// New annotation defaults
    #[serde(default)]
    pub defaults: PluginDefaults,
    /// Label text settings
    #[serde(default)]
    pub labels: LabelSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "pinmark", "pinmark") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match Self::from_json(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Settings parse error: {e}"))
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "pinmark", "pinmark") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::warn!("Failed to write {}: {e}", config_path.display());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_defaults() {
        let c = ControlSettings::default();
        assert_eq!(c.click_tolerance, 20.0);
        assert_eq!(c.touch_tolerance, 20.0);
        assert_eq!(c.long_touch_timeout_ms, 300);
        assert_eq!(c.near_threshold, -0.3);
        assert!(c.snapping);
    }

    #[test]
    fn test_partial_settings_json() {
        let s = AppSettings::from_json(r#"{"units": "Millimeters", "controls": {"snapping": false}}"#)
            .unwrap();
        assert_eq!(s.units, Units::Millimeters);
        assert!(!s.controls.snapping);
        assert_eq!(s.controls.long_touch_timeout_ms, 300);
        assert_eq!(s.defaults.color, Color::SKY);
    }

    #[test]
    fn test_invalid_settings_json() {
        assert!(AppSettings::from_json("{\"units\": 3}").is_err());
    }
}
