//! Per-tag connector: one WebSocket subscription feeding the platform

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::websocket::{OnMessage, WebSocketClient};
use crate::api::Tag;
use crate::config::SickTagLocConfig;
use crate::error::ConnectorError;
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::platform::PosePublisher;
use crate::transform::{FrameTransform, Pose};

/// Shape of a feed update pushed over the WebSocket
#[derive(Debug, Deserialize)]
struct FeedUpdate {
    body: FeedBody,
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    #[serde(default)]
    datastreams: Vec<Datastream>,
}

/// A named telemetry channel within a feed update
#[derive(Debug, Deserialize)]
struct Datastream {
    id: String,
    current_value: serde_json::Value,
}

/// Extract the RTLS (x, y) position from a feed update.
///
/// Returns `Ok(None)` when the update carries no position datastreams; the
/// vendor pushes other channels (battery, zones) over the same feed.
pub(crate) fn parse_position(text: &str) -> Result<Option<(f64, f64)>, ConnectorError> {
    let update: FeedUpdate = serde_json::from_str(text)?;

    let mut x = None;
    let mut y = None;
    for datastream in &update.body.datastreams {
        match datastream.id.as_str() {
            "posX" => x = Some(parse_value(&datastream.current_value)?),
            "posY" => y = Some(parse_value(&datastream.current_value)?),
            _ => {}
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => Ok(Some((x, y))),
        _ => Ok(None),
    }
}

/// Datastream values arrive as strings with stray whitespace, occasionally
/// as plain numbers
fn parse_value(value: &serde_json::Value) -> Result<f64, ConnectorError> {
    match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(|e| {
            ConnectorError::Message(format!("bad current_value '{s}': {e}"))
        }),
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
            ConnectorError::Message(format!("bad current_value '{n}'"))
        }),
        other => Err(ConnectorError::Message(format!(
            "bad current_value '{other}'"
        ))),
    }
}

/// Parses feed updates, applies the frame transform, and forwards poses to
/// the platform. Poses are only republished when they differ from the last
/// published value.
pub(crate) struct PoseForwarder {
    robot_id: String,
    transform: FrameTransform,
    publisher: Arc<dyn PosePublisher>,
    last_published: Mutex<Option<Pose>>,
}

impl PoseForwarder {
    pub(crate) fn new(
        robot_id: String,
        transform: FrameTransform,
        publisher: Arc<dyn PosePublisher>,
    ) -> Self {
        PoseForwarder {
            robot_id,
            transform,
            publisher,
            last_published: Mutex::new(None),
        }
    }

    pub(crate) fn handle(&self, text: &str) {
        match parse_position(text) {
            Ok(Some((x, y))) => {
                let pose = self.transform.apply(x, y);
                let Ok(mut last) = self.last_published.lock() else {
                    return;
                };
                if last.as_ref() != Some(&pose) {
                    self.publisher.publish_pose(&self.robot_id, &pose);
                    *last = Some(pose);
                }
            }
            Ok(None) => debug!("feed update without position datastreams"),
            Err(e) => warn!("dropping malformed feed update: {e}"),
        }
    }
}

/// Connector for a single SICK tag.
///
/// Subscribes to the tag's feed over the WebSocket API and republishes its
/// position in the platform frame, under the tag's alias (or a derived id
/// when no alias is set).
pub struct SickTagConnector {
    base: LifecycleNodeBase,
    config: Arc<SickTagLocConfig>,
    tag: Tag,
    publisher: Arc<dyn PosePublisher>,
    ws_client: Option<WebSocketClient>,
}

impl SickTagConnector {
    /// Create a connector for a tag. A call to the lifecycle methods should
    /// be made after initialization.
    pub fn new(config: Arc<SickTagLocConfig>, tag: Tag, publisher: Arc<dyn PosePublisher>) -> Self {
        let name = format!(
            "tag_connector_{}",
            tag.id.as_deref().unwrap_or("unassigned")
        );
        SickTagConnector {
            base: LifecycleNodeBase::new(&name),
            config,
            tag,
            publisher,
            ws_client: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.base.get_state()
    }

    /// Server-assigned id of the tag this connector tracks
    pub fn tag_id(&self) -> Option<&str> {
        self.tag.id.as_deref()
    }

    /// The id this tag's poses are published under: the user defined alias
    /// when present, otherwise derived from the tag id
    pub fn robot_id(&self) -> String {
        match self.tag.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias.to_string(),
            _ => format!("sick-tag-{}", self.tag.id.as_deref().unwrap_or("unassigned")),
        }
    }
}

#[async_trait]
impl LifecycleNode for SickTagConnector {
    async fn on_configure(&mut self) -> Result<(), ConnectorError> {
        if self.tag.id.is_none() {
            return Err(ConnectorError::MissingId("tag"));
        }
        debug!("Configuring {}", self.base.name);
        self.base.set_state(State::Inactive);
        Ok(())
    }

    async fn on_activate(&mut self) -> Result<(), ConnectorError> {
        let tag_id = self
            .tag
            .id
            .clone()
            .ok_or(ConnectorError::MissingId("tag"))?;
        let connector_config = &self.config.connector_config;
        let api_key = connector_config
            .sick_rtls_api_key
            .clone()
            .ok_or_else(|| ConnectorError::InvalidConfig("missing API key".to_string()))?;

        let robot_id = self.robot_id();
        if let Some(spec) = connector_config.tag_footprints().get(tag_id.as_str()) {
            self.publisher.publish_footprint(&robot_id, spec);
        }

        let forwarder = Arc::new(PoseForwarder::new(
            robot_id,
            FrameTransform::new(
                connector_config.translation_x,
                connector_config.translation_y,
            ),
            Arc::clone(&self.publisher),
        ));
        let on_message: OnMessage = Arc::new(move |text| forwarder.handle(&text));

        let mut ws_client = WebSocketClient::new(
            connector_config.get_websocket_url(),
            api_key,
            tag_id,
            on_message,
        );
        ws_client.subscribe().await?;
        self.ws_client = Some(ws_client);

        info!("Activated {}", self.base.name);
        self.base.set_state(State::Active);
        Ok(())
    }

    async fn on_deactivate(&mut self) -> Result<(), ConnectorError> {
        if let Some(mut ws_client) = self.ws_client.take() {
            ws_client.close().await;
        }
        info!("Deactivated {}", self.base.name);
        self.base.set_state(State::Inactive);
        Ok(())
    }

    async fn on_cleanup(&mut self) -> Result<(), ConnectorError> {
        self.ws_client = None;
        self.base.set_state(State::Unconfigured);
        Ok(())
    }
}
