//! The `feeds` resource of the SICK Tag-LOC system

use serde::{Deserialize, Serialize};

use super::rest::{FeedType, RestClient};
use super::ResultsPage;
use crate::error::ConnectorError;

/// The endpoint name for feeds
pub const ENDPOINT: &str = "/feeds";

fn default_private() -> String {
    "0".to_string()
}

/// A SICK Tag-LOC feed.
///
/// Feed is a general term for anchor/tag/building or any other user specified
/// object. Fields `id`, `feed_type`, `updated`, `created` and `creator` are
/// assigned by the server; the rest are user defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type of feed (tag, anchor, or building)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub feed_type: Option<FeedType>,
    /// User defined alias for the feed
    pub alias: Option<String>,
    /// User defined name; tags auto-generate this from their MAC address
    pub title: Option<String>,
    /// "0" for public, "1" for private (private feeds are only visible to
    /// the API key that created them)
    #[serde(default = "default_private")]
    pub private: String,
    pub description: Option<String>,
    pub feed: Option<String>,
    pub version: Option<String>,
    pub website: Option<String>,
    /// Feeds can be filtered by the value of these meta-tags
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
    pub creator: Option<String>,
}

impl Default for Feed {
    fn default() -> Self {
        Feed {
            id: None,
            feed_type: None,
            alias: None,
            title: None,
            private: default_private(),
            description: None,
            feed: None,
            version: None,
            website: None,
            tags: Vec::new(),
            updated: None,
            created: None,
            creator: None,
        }
    }
}

impl Feed {
    /// Get a feed from the system by ID
    pub async fn get(client: &RestClient, feed_id: &str) -> Result<Self, ConnectorError> {
        client.get(&format!("{ENDPOINT}/{feed_id}")).await
    }

    /// Get all the feeds from the system
    // TODO(pagination): the server pages results; follow-up once a site
    // exceeds one page of feeds.
    pub async fn get_all(client: &RestClient) -> Result<Vec<Self>, ConnectorError> {
        let page: ResultsPage<Feed> = client.get(ENDPOINT).await?;
        Ok(page.results)
    }

    /// Create a new feed from the populated user fields
    pub async fn create(client: &RestClient, feed: &Feed) -> Result<Self, ConnectorError> {
        client.post(ENDPOINT, feed).await
    }

    /// Push the current state of this feed to the server and refresh it
    /// with the server's response
    pub async fn update(&mut self, client: &RestClient) -> Result<(), ConnectorError> {
        let id = self
            .id
            .as_deref()
            .ok_or(ConnectorError::MissingId("feed"))?;
        *self = client.put(&format!("{ENDPOINT}/{id}"), self).await?;
        Ok(())
    }

    /// Create-or-update depending on whether the feed already has an id
    pub async fn save(&mut self, client: &RestClient) -> Result<(), ConnectorError> {
        if self.id.is_some() {
            self.update(client).await
        } else {
            *self = Feed::create(client, self).await?;
            Ok(())
        }
    }

    /// Delete this feed from the system and clear its id
    pub async fn delete(&mut self, client: &RestClient) -> Result<(), ConnectorError> {
        let id = self
            .id
            .as_deref()
            .ok_or(ConnectorError::MissingId("feed"))?;
        let _: serde_json::Value = client.delete(&format!("{ENDPOINT}/{id}")).await?;
        self.id = None;
        Ok(())
    }
}
