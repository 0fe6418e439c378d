//! Connector configuration loading and validation

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::ConnectorError;

/// The connector type expected in every configuration file
pub const CONNECTOR_TYPE: &str = "sick_tag_loc";

/// Default port of the vendor REST API
pub const DEFAULT_RTLS_REST_API_PORT: u16 = 8080;

/// Default port of the vendor WebSocket endpoint
pub const DEFAULT_RTLS_WS_PORT: u16 = 8080;

/// Environment variable consulted when the API key is absent from the file
pub const API_KEY_ENV_VAR: &str = "SICK_RTLS_API_KEY";

/// Path prefix of the vendor REST API
const REST_API_PATH: &str = "/sensmapserver/api";

/// One vertex of a footprint polygon
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FootprintPoint {
    pub x: f64,
    pub y: f64,
}

/// Footprint geometry published for a tag
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FootprintSpec {
    #[serde(default)]
    pub footprint: Option<Vec<FootprintPoint>>,
    #[serde(default)]
    pub radius: Option<f64>,
}

/// A footprint spec shared by a list of tag ids
#[derive(Debug, Clone, Deserialize)]
pub struct FootprintConfig {
    pub tags: Vec<String>,
    pub spec: FootprintSpec,
}

/// Configuration values for the SICK Tag-LOC API
#[derive(Debug, Clone, Deserialize)]
pub struct SickTagLocConfigModel {
    /// Base address of the RTLS server, e.g. `http://192.168.1.249/`
    pub sick_rtls_http_server_address: Url,
    #[serde(default = "default_rest_api_port")]
    pub sick_rtls_rest_api_port: u16,
    #[serde(default = "default_ws_port")]
    pub sick_rtls_websocket_port: u16,
    /// API key; falls back to the `SICK_RTLS_API_KEY` environment variable
    #[serde(default)]
    pub sick_rtls_api_key: Option<String>,
    /// Offset removed from the RTLS x coordinate
    #[serde(default)]
    pub translation_x: f64,
    /// Offset removed from the (negated) RTLS y coordinate
    #[serde(default)]
    pub translation_y: f64,
    /// Footprint specs, each applying to one or more tag ids
    #[serde(default)]
    pub footprints: Vec<FootprintConfig>,
}

fn default_rest_api_port() -> u16 {
    DEFAULT_RTLS_REST_API_PORT
}

fn default_ws_port() -> u16 {
    DEFAULT_RTLS_WS_PORT
}

fn default_update_freq() -> f64 {
    5.0
}

fn default_tag_refresh_secs() -> f64 {
    30.0
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl SickTagLocConfigModel {
    /// Base URL of the vendor REST API
    pub fn get_rest_api_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.sick_rtls_http_server_address.scheme(),
            self.sick_rtls_http_server_address
                .host_str()
                .unwrap_or_default(),
            self.sick_rtls_rest_api_port,
            REST_API_PATH
        )
    }

    /// URL of the vendor WebSocket endpoint
    pub fn get_websocket_url(&self) -> String {
        format!(
            "ws://{}:{}",
            self.sick_rtls_http_server_address
                .host_str()
                .unwrap_or_default(),
            self.sick_rtls_websocket_port
        )
    }

    /// Expand the footprint list into a per-tag-id lookup table
    pub fn tag_footprints(&self) -> HashMap<&str, &FootprintSpec> {
        let mut map = HashMap::new();
        for footprint in &self.footprints {
            for tag_id in &footprint.tags {
                map.insert(tag_id.as_str(), &footprint.spec);
            }
        }
        map
    }

    fn validate(&mut self) -> Result<(), ConnectorError> {
        for (port, name) in [
            (self.sick_rtls_rest_api_port, "sick_rtls_rest_api_port"),
            (self.sick_rtls_websocket_port, "sick_rtls_websocket_port"),
        ] {
            if port == 0 {
                return Err(ConnectorError::InvalidConfig(format!(
                    "Invalid port for {name}"
                )));
            }
        }

        match self.sick_rtls_http_server_address.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConnectorError::InvalidConfig(format!(
                    "Unsupported scheme '{other}' for sick_rtls_http_server_address"
                )));
            }
        }

        if self.sick_rtls_api_key.is_none() {
            self.sick_rtls_api_key = std::env::var(API_KEY_ENV_VAR).ok();
        }
        if let Some(key) = &self.sick_rtls_api_key {
            if key.chars().any(char::is_whitespace) {
                return Err(ConnectorError::InvalidConfig(
                    "Whitespaces are not allowed in the API key".to_string(),
                ));
            }
        }

        for footprint in &self.footprints {
            if footprint.spec.footprint.is_none() && footprint.spec.radius.is_none() {
                return Err(ConnectorError::InvalidConfig(
                    "At least one of footprint or radius must be provided".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Top-level connector configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SickTagLocConfig {
    /// Must always be [`CONNECTOR_TYPE`]; guards against mixed-up files
    pub connector_type: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Platform update frequency in Hz
    #[serde(default = "default_update_freq")]
    pub update_freq: f64,
    /// Seconds between tag re-enumerations against the REST API
    #[serde(default = "default_tag_refresh_secs")]
    pub tag_refresh_secs: f64,
    pub connector_config: SickTagLocConfigModel,
}

impl SickTagLocConfig {
    fn validate(&mut self) -> Result<(), ConnectorError> {
        if self.connector_type != CONNECTOR_TYPE {
            return Err(ConnectorError::InvalidConfig(format!(
                "Expected connector type '{CONNECTOR_TYPE}' not '{}'",
                self.connector_type
            )));
        }
        if !(self.tag_refresh_secs > 0.0) {
            return Err(ConnectorError::InvalidConfig(
                "tag_refresh_secs must be positive".to_string(),
            ));
        }
        self.connector_config.validate()
    }
}

/// Load and validate the configuration file.
///
/// `SICK`-prefixed environment variables override the file, with `__`
/// separating nesting levels (e.g. `SICK__CONNECTOR_CONFIG__TRANSLATION_X`).
///
/// Fails fast on a missing file, invalid YAML, an invalid port, a whitespace
/// API key or the wrong connector type.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SickTagLocConfig, ConnectorError> {
    let mut config: SickTagLocConfig = Config::builder()
        .add_source(File::from(path.as_ref()).required(true))
        .add_source(Environment::with_prefix("SICK").separator("__").try_parsing(true))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}
