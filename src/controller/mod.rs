//! Master controller managing one connector per tag

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{RestClient, Tag};
use crate::config::SickTagLocConfig;
use crate::connector::SickTagConnector;
use crate::error::ConnectorError;
use crate::lifecycle::LifecycleNode;
use crate::platform::PosePublisher;

/// Loads all tags from the RTLS and manages one [`SickTagConnector`] per
/// tag. A call to start/stop should be made after initialization.
pub struct MasterController {
    config: Arc<SickTagLocConfig>,
    rest_client: RestClient,
    publisher: Arc<dyn PosePublisher>,
    connectors: Vec<SickTagConnector>,
}

impl std::fmt::Debug for MasterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterController")
            .field("config", &self.config)
            .field("connector_count", &self.connectors.len())
            .finish_non_exhaustive()
    }
}

impl MasterController {
    /// Build the REST client, enumerate the system's tags and create (but
    /// don't start) one connector per tag
    pub async fn new(
        config: Arc<SickTagLocConfig>,
        publisher: Arc<dyn PosePublisher>,
    ) -> Result<Self, ConnectorError> {
        let connector_config = &config.connector_config;
        let api_key = connector_config
            .sick_rtls_api_key
            .clone()
            .ok_or_else(|| ConnectorError::InvalidConfig("missing API key".to_string()))?;
        let rest_client = RestClient::new(connector_config.get_rest_api_url(), api_key);

        let mut controller = MasterController {
            config,
            rest_client,
            publisher,
            connectors: Vec::new(),
        };
        for tag in Tag::get_all(&controller.rest_client).await? {
            controller.register(tag);
        }
        info!("Managing {} tag connectors", controller.connectors.len());
        Ok(controller)
    }

    /// Register a connector for a tag with the controller
    fn register(&mut self, tag: Tag) {
        self.connectors.push(SickTagConnector::new(
            Arc::clone(&self.config),
            tag,
            Arc::clone(&self.publisher),
        ));
    }

    /// Number of managed connectors
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// Pose-publishing ids of all managed connectors
    pub fn robot_ids(&self) -> Vec<String> {
        self.connectors.iter().map(|c| c.robot_id()).collect()
    }

    /// Configure and activate all managed connectors
    pub async fn start(&mut self) -> Result<(), ConnectorError> {
        for connector in &mut self.connectors {
            connector.on_configure().await?;
            connector.on_activate().await?;
        }
        Ok(())
    }

    /// Deactivate and clean up all managed connectors
    pub async fn stop(&mut self) -> Result<(), ConnectorError> {
        for connector in &mut self.connectors {
            connector.on_deactivate().await?;
            connector.on_cleanup().await?;
        }
        Ok(())
    }

    /// Re-fetch the tag list and bring up connectors for tags that appeared
    /// since the last enumeration. Returns the number of tags added.
    ///
    /// A tag that fails to start is logged and skipped; it will be retried
    /// on the next refresh since it was never registered.
    pub async fn refresh(&mut self) -> Result<usize, ConnectorError> {
        let mut added = 0;
        for tag in Tag::get_all(&self.rest_client).await? {
            let known = self
                .connectors
                .iter()
                .any(|connector| connector.tag_id() == tag.id.as_deref());
            if known {
                continue;
            }

            let mut connector = SickTagConnector::new(
                Arc::clone(&self.config),
                tag,
                Arc::clone(&self.publisher),
            );
            let started = async {
                connector.on_configure().await?;
                connector.on_activate().await
            }
            .await;
            match started {
                Ok(()) => {
                    info!("New tag discovered, publishing as {}", connector.robot_id());
                    self.connectors.push(connector);
                    added += 1;
                }
                Err(e) => warn!("Skipping new tag: {e}"),
            }
        }
        Ok(added)
    }
}
