//! The `tags` resource of the SICK Tag-LOC system

use serde::{Deserialize, Serialize};

use super::rest::RestClient;
use super::ResultsPage;
use crate::error::ConnectorError;

/// The endpoint name for tags
pub const ENDPOINT: &str = "/tags";

fn default_private() -> String {
    "0".to_string()
}

/// A SICK Tag-LOC tag.
///
/// A tag is a feed used to store datastreams with information on location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// User defined alias for the tag
    pub alias: Option<String>,
    /// Auto-generated from the tag's MAC address
    pub title: Option<String>,
    #[serde(default = "default_private")]
    pub private: String,
    pub description: Option<String>,
    pub feed: Option<String>,
    /// User settable, e.g. live or frozen
    pub status: Option<String>,
    pub version: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
    pub creator: Option<String>,
}

impl Default for Tag {
    fn default() -> Self {
        Tag {
            id: None,
            alias: None,
            title: None,
            private: default_private(),
            description: None,
            feed: None,
            status: None,
            version: None,
            website: None,
            tags: Vec::new(),
            updated: None,
            created: None,
            creator: None,
        }
    }
}

impl Tag {
    /// Get a tag from the system by ID
    pub async fn get(client: &RestClient, tag_id: &str) -> Result<Self, ConnectorError> {
        client.get(&format!("{ENDPOINT}/{tag_id}")).await
    }

    /// Get all the tags from the system
    pub async fn get_all(client: &RestClient) -> Result<Vec<Self>, ConnectorError> {
        let page: ResultsPage<Tag> = client.get(ENDPOINT).await?;
        Ok(page.results)
    }

    /// Create a new tag from the populated user fields
    pub async fn create(client: &RestClient, tag: &Tag) -> Result<Self, ConnectorError> {
        client.post(ENDPOINT, tag).await
    }

    /// Push the current state of this tag to the server and refresh it with
    /// the server's response
    pub async fn update(&mut self, client: &RestClient) -> Result<(), ConnectorError> {
        let id = self.id.as_deref().ok_or(ConnectorError::MissingId("tag"))?;
        *self = client.put(&format!("{ENDPOINT}/{id}"), self).await?;
        Ok(())
    }

    /// Create-or-update depending on whether the tag already has an id
    pub async fn save(&mut self, client: &RestClient) -> Result<(), ConnectorError> {
        if self.id.is_some() {
            self.update(client).await
        } else {
            *self = Tag::create(client, self).await?;
            Ok(())
        }
    }

    /// Delete this tag from the system and clear its id
    pub async fn delete(&mut self, client: &RestClient) -> Result<(), ConnectorError> {
        let id = self.id.as_deref().ok_or(ConnectorError::MissingId("tag"))?;
        let _: serde_json::Value = client.delete(&format!("{ENDPOINT}/{id}")).await?;
        self.id = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_json() -> &'static str {
        r##"{
            "id": "12",
            "alias": "pizza tracker",
            "title": "0x2404638707AA",
            "private": "0",
            "description": "",
            "feed": "1.0.0",
            "status": "live",
            "updated": "2024-06-10 15:05:31.425717",
            "created": "2023-12-18 21:37:53.746653",
            "creator": "admin",
            "version": "1.0.0",
            "website": "https://pizza.com",
            "type": "tag",
            "tags": ["#yolo"]
        }"##
    }

    #[test]
    fn deserializes_server_payload() {
        let tag: Tag = serde_json::from_str(tag_json()).unwrap();
        assert_eq!(tag.id.as_deref(), Some("12"));
        assert_eq!(tag.alias.as_deref(), Some("pizza tracker"));
        assert_eq!(tag.title.as_deref(), Some("0x2404638707AA"));
        assert_eq!(tag.status.as_deref(), Some("live"));
        assert_eq!(tag.tags, vec!["#yolo"]);
    }

    #[test]
    fn update_without_id_is_rejected() {
        let mut tag = Tag::default();
        let client = RestClient::new("https://localhost/sensmapserver/api", "key");
        let err = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(tag.update(&client))
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MissingId("tag")));
    }

    #[tokio::test]
    async fn save_creates_when_tag_has_no_id() {
        let (addr, mut requests) = crate::api::testing::spawn_server("200 OK", tag_json()).await;
        let client = RestClient::new(format!("http://{addr}/sensmapserver/api"), "key");

        let mut tag = Tag {
            alias: Some("pizza tracker".to_string()),
            ..Tag::default()
        };
        tag.save(&client).await.unwrap();

        assert_eq!(
            requests.recv().await.unwrap(),
            "POST /sensmapserver/api/tags HTTP/1.1"
        );
        assert_eq!(tag.id.as_deref(), Some("12"));
        assert_eq!(tag.status.as_deref(), Some("live"));
    }

    #[tokio::test]
    async fn save_updates_when_tag_has_an_id() {
        let (addr, mut requests) = crate::api::testing::spawn_server("200 OK", tag_json()).await;
        let client = RestClient::new(format!("http://{addr}/sensmapserver/api"), "key");

        let mut tag = Tag {
            id: Some("12".to_string()),
            ..Tag::default()
        };
        tag.save(&client).await.unwrap();

        assert_eq!(
            requests.recv().await.unwrap(),
            "PUT /sensmapserver/api/tags/12 HTTP/1.1"
        );
        assert_eq!(tag.alias.as_deref(), Some("pizza tracker"));
    }

    #[tokio::test]
    async fn delete_clears_the_id() {
        let (addr, mut requests) = crate::api::testing::spawn_server("200 OK", "{}").await;
        let client = RestClient::new(format!("http://{addr}/sensmapserver/api"), "key");

        let mut tag = Tag {
            id: Some("12".to_string()),
            ..Tag::default()
        };
        tag.delete(&client).await.unwrap();

        assert_eq!(
            requests.recv().await.unwrap(),
            "DELETE /sensmapserver/api/tags/12 HTTP/1.1"
        );
        assert!(tag.id.is_none());
    }
}
