//! Connector between the SICK Tag-LOC RTLS and a fleet-monitoring platform.
//!
//! Tags are enumerated over the vendor REST API, each one gets a WebSocket
//! subscription to its feed, and incoming positions are mapped into the
//! platform frame and republished through the [`platform::PosePublisher`]
//! seam.

pub mod api;
pub mod config;
pub mod connector;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod platform;
pub mod transform;

pub use config::{load_and_validate, SickTagLocConfig};
pub use connector::SickTagConnector;
pub use controller::MasterController;
pub use error::ConnectorError;
