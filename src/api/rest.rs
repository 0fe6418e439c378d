//! REST client for the SICK Tag-LOC sensmap server

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::HEADER_API_KEY;
use crate::error::ConnectorError;

/// Types of feeds currently supported by the SICK Tag-LOC system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Anchor,
    Tag,
    Building,
}

/// A helper client for making authenticated API requests.
///
/// Every request carries the `X-ApiKey` and `Content-Type` headers. Non-2xx
/// responses surface as [`ConnectorError::Rest`].
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl RestClient {
    /// Create a client for the API rooted at `url`
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        RestClient {
            http: reqwest::Client::new(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Base URL this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Send a GET request to the endpoint and deserialize the JSON response
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ConnectorError> {
        let response = self
            .http
            .get(self.endpoint_url(endpoint))
            .header(HEADER_API_KEY, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Send a POST request with a JSON body and deserialize the response
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        data: &impl Serialize,
    ) -> Result<T, ConnectorError> {
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .header(HEADER_API_KEY, &self.api_key)
            .json(data)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Send a PUT request with a JSON body and deserialize the response
    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        data: &impl Serialize,
    ) -> Result<T, ConnectorError> {
        let response = self
            .http
            .put(self.endpoint_url(endpoint))
            .header(HEADER_API_KEY, &self.api_key)
            .json(data)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Delete a resource and deserialize the response
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ConnectorError> {
        let response = self
            .http
            .delete(self.endpoint_url(endpoint))
            .header(HEADER_API_KEY, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::spawn_server;
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn get_returns_parsed_json() {
        let (addr, mut requests) = spawn_server("200 OK", r#"{"status":"ok"}"#).await;
        let client = RestClient::new(format!("http://{addr}/"), "fake_api_key");
        let response: Value = client.get("test-endpoint").await.unwrap();
        assert_eq!(response, json!({"status": "ok"}));
        assert_eq!(requests.recv().await.unwrap(), "GET /test-endpoint HTTP/1.1");
    }

    #[tokio::test]
    async fn post_returns_parsed_json() {
        let (addr, mut requests) = spawn_server("200 OK", r#"{"status":"ok"}"#).await;
        let client = RestClient::new(format!("http://{addr}/"), "fake_api_key");
        let response: Value = client
            .post("test-endpoint", &json!({"test_key": "test_data"}))
            .await
            .unwrap();
        assert_eq!(response, json!({"status": "ok"}));
        assert_eq!(requests.recv().await.unwrap(), "POST /test-endpoint HTTP/1.1");
    }

    #[tokio::test]
    async fn put_returns_parsed_json() {
        let (addr, _requests) = spawn_server("200 OK", r#"{"status":"ok"}"#).await;
        let client = RestClient::new(format!("http://{addr}/"), "fake_api_key");
        let response: Value = client
            .put("test-endpoint", &json!({"test_key": "test_data"}))
            .await
            .unwrap();
        assert_eq!(response, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn delete_returns_parsed_json() {
        let (addr, _requests) = spawn_server("200 OK", r#"{"status":"ok"}"#).await;
        let client = RestClient::new(format!("http://{addr}/"), "fake_api_key");
        let response: Value = client.delete("test-endpoint").await.unwrap();
        assert_eq!(response, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn server_error_is_propagated() {
        let (addr, _requests) = spawn_server("500 Internal Server Error", "{}").await;
        let client = RestClient::new(format!("http://{addr}/"), "fake_api_key");
        let err = client.get::<Value>("test-endpoint").await.unwrap_err();
        assert!(matches!(err, ConnectorError::Rest(_)));
    }

    #[test]
    fn feed_types_round_trip_as_lowercase_strings() {
        assert_eq!(serde_json::to_value(FeedType::Tag).unwrap(), "tag");
        assert_eq!(serde_json::to_value(FeedType::Anchor).unwrap(), "anchor");
        assert_eq!(
            serde_json::from_str::<FeedType>(r#""building""#).unwrap(),
            FeedType::Building
        );
    }

    #[test]
    fn endpoint_urls_join_cleanly() {
        let client = RestClient::new("https://localhost:8000/sensmapserver/api", "key");
        assert_eq!(
            client.endpoint_url("/tags/1"),
            "https://localhost:8000/sensmapserver/api/tags/1"
        );
        assert_eq!(
            client.endpoint_url("feeds"),
            "https://localhost:8000/sensmapserver/api/feeds"
        );
    }
}
