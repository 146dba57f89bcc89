//! `reqwest` adapter for the GraphQL Admin API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error};

use crate::config::RemoteConfig;
use crate::error::RemoteError;

use super::RemoteClient;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: JsonValue,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<JsonValue>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Admin API client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl HttpRemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn request(&self, query: &str, variables: JsonValue) -> Result<JsonValue, RemoteError> {
        debug!(endpoint = %self.endpoint, "sending admin api request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "admin api request failed");
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::decode(e.to_string()))?;

        into_data(body)
    }
}

fn into_data(body: GraphqlResponse) -> Result<JsonValue, RemoteError> {
    if !body.errors.is_empty() {
        return Err(RemoteError::Graphql(
            body.errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    body.data
        .ok_or_else(|| RemoteError::decode("response carried neither data nor errors"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: JsonValue) -> Result<JsonValue, RemoteError> {
        into_data(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn data_is_unwrapped() {
        let data = parse(json!({ "data": { "product": null } })).unwrap();
        assert_eq!(data, json!({ "product": null }));
    }

    #[test]
    fn top_level_errors_win_over_partial_data() {
        let err = parse(json!({
            "data": null,
            "errors": [ { "message": "Throttled" }, { "message": "Access denied" } ]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Throttled, Access denied");
    }

    #[test]
    fn empty_body_is_a_decode_error() {
        assert!(matches!(parse(json!({})), Err(RemoteError::Decode(_))));
    }

    #[test]
    fn endpoint_comes_from_config() {
        let config = RemoteConfig::new("x.myshopify.com", "t").with_api_version("2025-01");
        let client = HttpRemoteClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://x.myshopify.com/admin/api/2025-01/graphql.json"
        );
    }
}
