//! Persisted user settings.
//!
//! Settings are a small JSON document holding the camera mode, post-processing
//! flags and debug flags. On native they are read from and written to a file;
//! in the browser they are kept in `localStorage` under a single key.
//!
//! Unknown or malformed content never prevents startup: a parse failure logs a
//! warning and falls back to defaults, and missing fields take their default.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use skidpad::{CarConfig, ConfigError};
use web_time::Instant;

use crate::camera::CameraMode;

/// Minimum time between two writes of the settings file.
const SAVE_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// Settings
// ============================================================================

/// User-adjustable settings.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera_mode: CameraMode,
    pub post_processing: PostProcessingSettings,
    pub debug: DebugSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::Follow,
            post_processing: PostProcessingSettings::default(),
            debug: DebugSettings::default(),
        }
    }
}

/// Post-processing effects applied to the main camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessingSettings {
    pub bloom: bool,
    pub depth_of_field: bool,
    pub tonemapping: bool,
}

impl Default for PostProcessingSettings {
    fn default() -> Self {
        Self {
            bloom: true,
            depth_of_field: false,
            tonemapping: true,
        }
    }
}

/// Debug overlays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub show_performance: bool,
    pub show_shadow_helper: bool,
    pub physics_debug: bool,
}

impl Settings {
    /// Parse settings from JSON text, falling back to defaults on error.
    pub fn from_json_or_default(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed settings: {e}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to read or write a settings or car file.
#[derive(Debug)]
pub enum SettingsError {
    /// Filesystem error.
    Io(std::io::Error),
    /// JSON encoding or decoding error.
    Json(serde_json::Error),
    /// The file parsed but describes an unusable car.
    InvalidCar(ConfigError),
    /// `localStorage` is unavailable or refused the operation.
    #[cfg(target_family = "wasm")]
    Browser(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "I/O error: {e}"),
            SettingsError::Json(e) => write!(f, "JSON error: {e}"),
            SettingsError::InvalidCar(e) => write!(f, "invalid car: {e}"),
            #[cfg(target_family = "wasm")]
            SettingsError::Browser(e) => write!(f, "browser storage error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
            SettingsError::InvalidCar(e) => Some(e),
            #[cfg(target_family = "wasm")]
            SettingsError::Browser(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Json(err)
    }
}

impl From<ConfigError> for SettingsError {
    fn from(err: ConfigError) -> Self {
        SettingsError::InvalidCar(err)
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Where settings are persisted.
#[derive(Debug)]
enum Backend {
    /// Settings JSON held for the session only.
    Memory(Option<String>),
    /// A JSON file on disk.
    File(PathBuf),
    /// A `localStorage` entry.
    #[cfg(target_family = "wasm")]
    Browser { key: String },
}

impl Backend {
    /// Stored JSON text, or `None` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>, SettingsError> {
        match self {
            Backend::Memory(text) => Ok(text.clone()),
            Backend::File(path) => match std::fs::read_to_string(path) {
                Ok(text) => Ok(Some(text)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            #[cfg(target_family = "wasm")]
            Backend::Browser { key } => browser::local_storage()?
                .get_item(key)
                .map_err(browser::js_error),
        }
    }

    fn write(&mut self, text: String) -> Result<(), SettingsError> {
        match self {
            Backend::Memory(stored) => {
                *stored = Some(text);
                Ok(())
            }
            Backend::File(path) => Ok(std::fs::write(path, text)?),
            #[cfg(target_family = "wasm")]
            Backend::Browser { key } => browser::local_storage()?
                .set_item(key, &text)
                .map_err(browser::js_error),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Memory(_) => write!(f, "memory"),
            Backend::File(path) => write!(f, "{}", path.display()),
            #[cfg(target_family = "wasm")]
            Backend::Browser { key } => write!(f, "localStorage[{key}]"),
        }
    }
}

#[cfg(target_family = "wasm")]
mod browser {
    use super::SettingsError;

    pub fn local_storage() -> Result<web_sys::Storage, SettingsError> {
        let window =
            web_sys::window().ok_or_else(|| SettingsError::Browser("no window".to_string()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| SettingsError::Browser("localStorage unavailable".to_string()))
    }

    pub fn js_error(value: wasm_bindgen::JsValue) -> SettingsError {
        SettingsError::Browser(format!("{value:?}"))
    }
}

/// Persisted settings with throttled writes.
#[derive(Resource, Debug)]
pub struct SettingsStore {
    backend: Backend,
    last_save: Option<Instant>,
    dirty: bool,
}

impl SettingsStore {
    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            last_save: None,
            dirty: false,
        }
    }

    /// Settings kept for this session only.
    #[cfg_attr(target_family = "wasm", allow(dead_code))]
    pub fn memory() -> Self {
        Self::with_backend(Backend::Memory(None))
    }

    /// Settings stored in a JSON file.
    pub fn file(path: PathBuf) -> Self {
        Self::with_backend(Backend::File(path))
    }

    /// Settings stored in the browser's `localStorage` under `key`.
    #[cfg(target_family = "wasm")]
    pub fn browser(key: &str) -> Self {
        Self::with_backend(Backend::Browser {
            key: key.to_string(),
        })
    }

    /// Load settings, using defaults when nothing is stored or the stored
    /// value cannot be read.
    pub fn load(&self) -> Settings {
        match self.backend.read() {
            Ok(Some(text)) => Settings::from_json_or_default(&text),
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!("Failed to read settings from {}: {e}", self.backend);
                Settings::default()
            }
        }
    }

    /// Write settings to the store.
    pub fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.dirty = false;
        self.last_save = Some(Instant::now());
        self.backend.write(settings.to_json()?)?;
        tracing::debug!("Saved settings to {}", self.backend);
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn save_due(&self) -> bool {
        self.dirty
            && self
                .last_save
                .is_none_or(|last| last.elapsed() >= SAVE_INTERVAL)
    }
}

/// Load a car description from a JSON file and validate it.
pub fn load_car_config(path: &Path) -> Result<CarConfig, SettingsError> {
    let text = std::fs::read_to_string(path)?;
    let config: CarConfig = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that persists [`Settings`] whenever they change.
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, persist_settings);
    }
}

/// Write settings after a change, at most once per [`SAVE_INTERVAL`].
fn persist_settings(settings: Res<Settings>, mut store: ResMut<SettingsStore>) {
    if settings.is_changed() && !settings.is_added() {
        store.mark_dirty();
    }
    if !store.save_due() {
        return;
    }
    if let Err(e) = store.save(&settings) {
        tracing::warn!("Failed to save settings: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json_or_default(r#"{ "camera_mode": "orbit" }"#);
        assert_eq!(settings.camera_mode, CameraMode::Orbit);
        assert_eq!(settings.post_processing, PostProcessingSettings::default());
    }

    #[test]
    fn test_malformed_falls_back() {
        assert_eq!(Settings::from_json_or_default("{ nope"), Settings::default());
        assert_eq!(
            Settings::from_json_or_default(r#"{ "camera_mode": "sideways" }"#),
            Settings::default()
        );
    }

    #[test]
    fn test_json_text_round_trip() {
        let mut settings = Settings::default();
        settings.debug.show_shadow_helper = true;
        settings.post_processing.bloom = false;
        let text = settings.to_json().unwrap();
        assert_eq!(Settings::from_json_or_default(&text), settings);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::file(path.clone());

        // Missing file loads defaults.
        assert_eq!(store.load(), Settings::default());

        let settings = Settings {
            camera_mode: CameraMode::Orbit,
            ..Default::default()
        };
        store.save(&settings).unwrap();
        assert!(path.exists());
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_memory_store() {
        let mut store = SettingsStore::memory();
        assert_eq!(store.load(), Settings::default());

        let mut settings = Settings::default();
        settings.debug.physics_debug = true;
        settings.camera_mode = CameraMode::Orbit;
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_unparseable_stored_value_falls_back() {
        let store = SettingsStore::with_backend(Backend::Memory(Some("[1, 2".to_string())));
        assert_eq!(store.load(), Settings::default());

        let store = SettingsStore::with_backend(Backend::Memory(Some(
            r#"{ "post_processing": { "bloom": false } }"#.to_string(),
        )));
        let settings = store.load();
        assert!(!settings.post_processing.bloom);
        assert_eq!(settings.debug, DebugSettings::default());
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory cannot be read as a file.
        let store = SettingsStore::file(dir.path().to_path_buf());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_is_throttled() {
        let mut store = SettingsStore::memory();
        assert!(!store.save_due());
        store.mark_dirty();
        assert!(store.save_due());
        store.save(&Settings::default()).unwrap();
        store.mark_dirty();
        assert!(!store.save_due());
    }

    #[test]
    fn test_load_car_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("car.json");

        std::fs::write(&path, r#"{ "name": "Kart", "driving": { "engine_force": 900.0 } }"#)
            .unwrap();
        let car = load_car_config(&path).unwrap();
        assert_eq!(car.name, "Kart");
        assert_eq!(car.driving.engine_force, 900.0);

        std::fs::write(&path, r#"{ "dimensions": { "wheel_radius": -1.0 } }"#).unwrap();
        assert!(matches!(
            load_car_config(&path),
            Err(SettingsError::InvalidCar(_))
        ));

        assert!(matches!(
            load_car_config(&dir.path().join("missing.json")),
            Err(SettingsError::Io(_))
        ));
    }
}
