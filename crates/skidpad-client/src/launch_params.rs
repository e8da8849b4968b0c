//! Launch parameter parsing for the demo.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;
use skidpad::CarConfig;

use crate::{
    camera::{CameraMode, ChaseStyle},
    settings::{SettingsStore, load_car_config},
};

/// Settings file used on native when none is given.
#[cfg(not(target_family = "wasm"))]
const DEFAULT_SETTINGS_PATH: &str = "skidpad-settings.json";

/// `localStorage` key holding the settings in the browser.
#[cfg(target_family = "wasm")]
const SETTINGS_STORAGE_KEY: &str = "skidpad-settings";

/// Launch parameters for the demo.
#[derive(Resource, Debug, Default)]
pub struct LaunchParams {
    /// Camera mode override; the saved setting is used when `None`.
    pub camera_mode: Option<CameraMode>,
    /// Car description file; the built-in car is used when `None`.
    pub car_path: Option<PathBuf>,
    /// Settings file. When `None`, settings go to `localStorage` in the
    /// browser and are kept in memory on native.
    pub settings_path: Option<PathBuf>,
    /// Chase camera preset.
    pub chase: ChaseStyle,
}

impl LaunchParams {
    /// Store the settings are loaded from and saved to.
    pub fn settings_store(&self) -> SettingsStore {
        match &self.settings_path {
            Some(path) => SettingsStore::file(path.clone()),
            #[cfg(target_family = "wasm")]
            None => SettingsStore::browser(SETTINGS_STORAGE_KEY),
            #[cfg(not(target_family = "wasm"))]
            None => SettingsStore::memory(),
        }
    }

    /// Car to spawn. A car file that cannot be used is reported and replaced by
    /// the built-in car.
    pub fn car_config(&self) -> CarConfig {
        let Some(path) = &self.car_path else {
            return CarConfig::default();
        };
        match load_car_config(path) {
            Ok(config) => {
                tracing::info!("Loaded car '{}' from {}", config.name, path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Using built-in car; failed to load {}: {e}", path.display());
                CarConfig::default()
            }
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Raycast vehicle driving demo")]
    struct CliArgs {
        /// Initial camera mode (overrides the saved setting).
        #[arg(long, value_enum)]
        camera_mode: Option<CameraMode>,

        /// JSON file describing the car.
        #[arg(long)]
        car: Option<PathBuf>,

        /// Settings file.
        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        settings: PathBuf,

        /// Keep settings in memory only.
        #[arg(long)]
        no_save: bool,

        /// Chase camera preset.
        #[arg(long, value_enum, default_value_t = ChaseStyle::default())]
        chase: ChaseStyle,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            camera_mode: args.camera_mode,
            car_path: args.car,
            settings_path: (!args.no_save).then_some(args.settings),
            chase: args.chase,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_to_builtin_car() {
        let params = LaunchParams::default();
        assert_eq!(params.car_config(), CarConfig::default());
    }

    #[test]
    fn test_settings_store_follows_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let params = LaunchParams {
            settings_path: Some(path.clone()),
            ..Default::default()
        };
        params
            .settings_store()
            .save(&crate::settings::Settings::default())
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_bad_car_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"driving": {{"steering_speed": -1.0}}}}"#).unwrap();
        let params = LaunchParams {
            car_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(params.car_config(), CarConfig::default());
    }

    #[test]
    fn test_car_file_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "Test", "driving": {{"engine_force": 1000.0}}}}"#).unwrap();
        let params = LaunchParams {
            car_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = params.car_config();
        assert_eq!(config.name, "Test");
        assert_eq!(config.driving.engine_force, 1000.0);
    }
}
