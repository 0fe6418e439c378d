//! Lifecycle management for connector components

use async_trait::async_trait;

use crate::error::ConnectorError;

/// Trait for components that follow a lifecycle pattern
#[async_trait]
pub trait LifecycleNode: Send + Sync {
    /// Configure the node
    async fn on_configure(&mut self) -> Result<(), ConnectorError>;

    /// Activate the node
    async fn on_activate(&mut self) -> Result<(), ConnectorError>;

    /// Deactivate the node
    async fn on_deactivate(&mut self) -> Result<(), ConnectorError>;

    /// Clean up the node
    async fn on_cleanup(&mut self) -> Result<(), ConnectorError>;
}

/// Base implementation for lifecycle nodes
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

/// State of a lifecycle node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
    Finalized,
}

impl LifecycleNodeBase {
    /// Create a new lifecycle node base
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    /// Get the current state
    pub fn get_state(&self) -> State {
        self.state
    }

    /// Set the state
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }
}
