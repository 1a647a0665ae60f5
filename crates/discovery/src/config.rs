use std::path::Path;

use catalog::page::{DEFAULT_PAGE_SIZE, Pagination};
use foundation::geo::LatLon;
use markers::popup::PopupOptions;
use markers::surface::BaseLayer;
use markers::viewport::{PanOptions, PanPolicy};
use serde::{Deserialize, Serialize};

pub const ENV_PAGE_SIZE: &str = "DISCOVERY_PAGE_SIZE";
pub const ENV_PAN_POLICY: &str = "DISCOVERY_PAN_POLICY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read failed: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config malformed: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "config invalid: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Map view settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub initial_center: LatLon,
    pub initial_zoom: f64,
    pub pan: PanOptions,
    pub popup: PopupOptions,
    pub base_layers: Vec<BaseLayer>,
    pub default_base_layer: String,
    pub page_size: usize,
    /// Backpressure for the host event queue; `None` is unbounded.
    pub max_pending_events: Option<usize>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_center: LatLon::new(12.97, 77.59),
            initial_zoom: 12.0,
            pan: PanOptions::default(),
            popup: PopupOptions::default(),
            base_layers: vec![BaseLayer::street(), BaseLayer::satellite()],
            default_base_layer: "Street".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pending_events: None,
        }
    }
}

impl MapConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: MapConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("read {path:?}: {e}")))?;
        Self::from_json_str(&raw)
    }

    /// Applies `DISCOVERY_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            self.page_size = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{ENV_PAGE_SIZE}={raw:?}")))?;
        }
        if let Some(raw) = lookup(ENV_PAN_POLICY) {
            self.pan.policy = raw.parse::<PanPolicy>().map_err(ConfigError::Invalid)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_center.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "initial_center {} out of range",
                self.initial_center
            )));
        }
        if !self.initial_zoom.is_finite() || self.initial_zoom < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_zoom {}",
                self.initial_zoom
            )));
        }
        if !self.pan.duration_s.is_finite() || self.pan.duration_s < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pan.duration_s {}",
                self.pan.duration_s
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.max_pending_events == Some(0) {
            return Err(ConfigError::Invalid(
                "max_pending_events must be at least 1".into(),
            ));
        }
        if self.base_layer().is_none() {
            return Err(ConfigError::Invalid(format!(
                "default_base_layer {:?} is not in base_layers",
                self.default_base_layer
            )));
        }
        Ok(())
    }

    pub fn base_layer(&self) -> Option<&BaseLayer> {
        self.find_base_layer(&self.default_base_layer)
    }

    pub fn find_base_layer(&self, name: &str) -> Option<&BaseLayer> {
        self.base_layers.iter().find(|l| l.name == name)
    }

    pub fn pagination(&self) -> Result<Pagination, ConfigError> {
        Pagination::new(self.page_size).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
