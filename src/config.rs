//! User configuration, read once at startup from `config.yaml`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Rotation, Size};
use crate::keymap::{BindingSpec, Keymap};
use crate::layout::ViewMode;
use crate::navigation::{ViewState, ZoomLimits};

const CONFIG_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "breathe";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fraction of the page height moved by the arrow keys
    pub arrow_scroll: f64,
    /// Fraction moved by PageUp / PageDown
    pub page_scroll: f64,
    /// Fraction moved by one wheel notch
    pub mouse_scroll: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_zoom: f64,
    pub default_mode: ViewMode,
    pub default_rotation: Rotation,
    pub default_two_page: bool,
    pub default_continuous: bool,
    pub default_status_bar: bool,
    pub default_dark_mode: bool,
    /// Rows at the bottom of the viewport reserved for the status bar
    pub status_bar_height: i32,
    /// Extra pixels repainted around a selection when it goes away
    pub selection_padding: i32,
    /// Replace the default binding of a key
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arrow_scroll: 0.01,
            page_scroll: 0.30,
            mouse_scroll: 0.02,
            zoom_step: ZoomLimits::DEFAULT_STEP,
            min_zoom: ZoomLimits::DEFAULT_MIN,
            max_zoom: ZoomLimits::DEFAULT_MAX,
            default_zoom: 1.0,
            default_mode: ViewMode::FitPage,
            default_rotation: Rotation::Deg0,
            default_two_page: false,
            default_continuous: false,
            default_status_bar: true,
            default_dark_mode: false,
            status_bar_height: 2,
            selection_padding: 5,
            bindings: Vec::new(),
        }
    }
}

/// `<config dir>/breathe/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(CONFIG_FILENAME))
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    info!("no config directory, using default settings");
                    return Ok(Self::default());
                }
            },
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                let config = Self::from_yaml(&content)?;
                debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using default settings", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file parses as null.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("arrow_scroll", self.arrow_scroll),
            ("page_scroll", self.page_scroll),
            ("mouse_scroll", self.mouse_scroll),
            ("zoom_step", self.zoom_step),
            ("min_zoom", self.min_zoom),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if !self.max_zoom.is_finite() || self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }

        if !(self.min_zoom..=self.max_zoom).contains(&self.default_zoom) {
            return Err(ConfigError::Invalid(format!(
                "default_zoom {} outside [{}, {}]",
                self.default_zoom, self.min_zoom, self.max_zoom
            )));
        }

        if self.status_bar_height < 0 || self.selection_padding < 0 {
            return Err(ConfigError::Invalid(
                "status_bar_height and selection_padding must not be negative".to_string(),
            ));
        }

        self.keymap().map(|_| ())
    }

    /// Default bindings with the configured ones layered on top
    pub fn keymap(&self) -> Result<Keymap, ConfigError> {
        let mut keymap = Keymap::default();
        for spec in &self.bindings {
            keymap.bind(spec.to_binding().map_err(ConfigError::Invalid)?);
        }
        Ok(keymap)
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            step: self.zoom_step,
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }

    /// View state for a freshly opened document
    pub fn initial_state(&self, page_count: usize, viewport: Size) -> ViewState {
        ViewState {
            mode: self.default_mode,
            zoom: self.default_zoom,
            rotation: self.default_rotation,
            two_page: self.default_two_page,
            continuous: self.default_continuous,
            status_bar: self.default_status_bar,
            dark_mode: self.default_dark_mode,
            ..ViewState::new(page_count, viewport)
        }
    }
}
