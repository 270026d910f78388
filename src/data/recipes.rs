//! Recipe feed client
//!
//! This module fetches the recipe list from the remote feed and decodes it
//! into [`Recipe`] values, classifying every failure into the closed
//! [`FetchError`] set.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::Recipe;

/// Base URL of the reference feed deployment
const FEED_BASE_URL: &str = "https://d3jbb8n5wk0qxi.cloudfront.net";

/// Host that never resolves, for exercising the transport-failure path
const UNREACHABLE_BASE_URL: &str = "https://nonexistent.mealfeed.invalid";

/// The fixed feed endpoints
///
/// These are the four locations of the reference deployment: the primary
/// data set plus three fixtures (malformed payload, empty payload, and an
/// unreachable host) used for demos and tests. They are not general-purpose
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The complete recipe list
    Primary,
    /// A payload that does not decode
    Malformed,
    /// A payload with zero recipes
    Empty,
    /// A host that cannot be reached
    Unreachable,
}

impl Endpoint {
    /// Returns the fixed URL string for this endpoint
    pub fn url(&self) -> String {
        match self {
            Endpoint::Primary => format!("{}/recipes.json", FEED_BASE_URL),
            Endpoint::Malformed => format!("{}/recipes-malformed.json", FEED_BASE_URL),
            Endpoint::Empty => format!("{}/recipes-empty.json", FEED_BASE_URL),
            Endpoint::Unreachable => format!("{}/recipes.json", UNREACHABLE_BASE_URL),
        }
    }

    /// Short name used by the CLI
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Primary => "primary",
            Endpoint::Malformed => "malformed",
            Endpoint::Empty => "empty",
            Endpoint::Unreachable => "unreachable",
        }
    }
}

/// Errors that can occur when fetching the recipe list
///
/// Exactly one variant is produced per failed fetch attempt; the set is
/// closed and exhaustive for this pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint did not resolve to a valid URL
    #[error("endpoint does not resolve to a valid URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Transport failure, or the server replied with an empty body
    #[error("no data received from the server")]
    NoData,

    /// The payload parsed but contained zero recipes
    #[error("the server returned an empty recipe list")]
    EmptyResponse,

    /// The payload did not match the expected shape
    #[error("failed to decode the recipe payload: {0}")]
    DecodingError(#[from] serde_json::Error),
}

/// Source of recipe lists
///
/// Production code uses [`RecipeClient`]; tests substitute a double with
/// programmed responses.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Fetches the full recipe list from the given endpoint
    ///
    /// Performs exactly one request per invocation, with no retry and no
    /// caching. The returned recipes keep server order.
    async fn fetch_recipes(&self, endpoint: Endpoint) -> Result<Vec<Recipe>, FetchError>;
}

/// Decoded server envelope: a single optional `recipes` array
#[derive(Debug, Deserialize)]
struct RecipeListResponse {
    recipes: Option<Vec<Recipe>>,
}

/// Client for fetching recipes from the remote feed
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: Client,
    base_url: String,
}

impl Default for RecipeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeClient {
    /// Creates a new RecipeClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: FEED_BASE_URL.to_string(),
        }
    }

    /// Creates a new RecipeClient sharing an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: FEED_BASE_URL.to_string(),
        }
    }

    /// Creates a new RecipeClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Resolves the URL string for an endpoint against this client's base
    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        match endpoint {
            Endpoint::Primary => format!("{}/recipes.json", self.base_url),
            Endpoint::Malformed => format!("{}/recipes-malformed.json", self.base_url),
            Endpoint::Empty => format!("{}/recipes-empty.json", self.base_url),
            Endpoint::Unreachable => endpoint.url(),
        }
    }
}

#[async_trait]
impl RecipeSource for RecipeClient {
    async fn fetch_recipes(&self, endpoint: Endpoint) -> Result<Vec<Recipe>, FetchError> {
        let url = Url::parse(&self.endpoint_url(endpoint))?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, endpoint = endpoint.name(), "recipe request failed");
                return Err(FetchError::NoData);
            }
        };

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(error = %err, endpoint = endpoint.name(), "recipe response unreadable");
                return Err(FetchError::NoData);
            }
        };

        parse_payload(&body)
    }
}

/// Classifies a raw response body into recipes or a [`FetchError`]
///
/// An empty body is `NoData`; a body that does not match the envelope shape
/// is `DecodingError`; an absent or empty `recipes` array is
/// `EmptyResponse`. On success the recipes keep their payload order.
fn parse_payload(body: &[u8]) -> Result<Vec<Recipe>, FetchError> {
    if body.is_empty() {
        return Err(FetchError::NoData);
    }

    let envelope: RecipeListResponse = serde_json::from_slice(body)?;

    match envelope.recipes {
        Some(recipes) if !recipes.is_empty() => Ok(recipes),
        _ => Err(FetchError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Sample valid feed payload, including an unknown extra field
    const VALID_PAYLOAD: &str = r#"{
        "recipes": [
            {
                "uuid": "0c6ca6e7-e32a-4053-b824-1dbf749910d8",
                "cuisine": "Malaysian",
                "name": "Apam Balik",
                "photo_url_large": "https://example.com/photos/large/apam.jpg",
                "photo_url_small": "https://example.com/photos/small/apam.jpg",
                "source_url": "https://example.com/apam-balik",
                "youtube_url": "https://youtube.com/watch?v=6R8ffRRJcrg"
            },
            {
                "uuid": "599344f4-3c5c-4cca-b914-2210e3b3312f",
                "cuisine": "British",
                "name": "Apple & Blackberry Crumble",
                "photo_url_small": "https://example.com/photos/small/crumble.jpg",
                "difficulty": "easy"
            },
            {
                "uuid": "74f6d4eb-da50-4901-94d1-deae2d8af1d1",
                "cuisine": "British",
                "name": "Apple Frangipan Tart"
            }
        ]
    }"#;

    #[test]
    fn test_parse_valid_payload_preserves_order_and_fields() {
        let recipes = parse_payload(VALID_PAYLOAD.as_bytes()).expect("Payload should parse");

        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].name, "Apam Balik");
        assert_eq!(recipes[0].cuisine, "Malaysian");
        assert_eq!(
            recipes[0].id,
            Uuid::parse_str("0c6ca6e7-e32a-4053-b824-1dbf749910d8").unwrap()
        );
        assert_eq!(
            recipes[0].source_url.as_deref(),
            Some("https://example.com/apam-balik")
        );
        assert_eq!(recipes[1].name, "Apple & Blackberry Crumble");
        assert_eq!(recipes[2].name, "Apple Frangipan Tart");
        assert!(recipes[2].photo_url_small.is_none());
    }

    #[test]
    fn test_parse_empty_recipe_array_is_empty_response() {
        let result = parse_payload(br#"{"recipes": []}"#);
        assert!(matches!(result, Err(FetchError::EmptyResponse)));
    }

    #[test]
    fn test_parse_absent_recipes_field_is_empty_response() {
        let result = parse_payload(br#"{}"#);
        assert!(matches!(result, Err(FetchError::EmptyResponse)));
    }

    #[test]
    fn test_parse_null_recipes_field_is_empty_response() {
        let result = parse_payload(br#"{"recipes": null}"#);
        assert!(matches!(result, Err(FetchError::EmptyResponse)));
    }

    #[test]
    fn test_parse_empty_body_is_no_data() {
        let result = parse_payload(b"");
        assert!(matches!(result, Err(FetchError::NoData)));
    }

    #[test]
    fn test_parse_malformed_json_is_decoding_error() {
        let result = parse_payload(b"{ invalid json }");
        assert!(matches!(result, Err(FetchError::DecodingError(_))));
    }

    #[test]
    fn test_parse_missing_uuid_is_decoding_error() {
        let result = parse_payload(br#"{"recipes": [{"cuisine": "Malaysian", "name": "Apam Balik"}]}"#);
        assert!(matches!(result, Err(FetchError::DecodingError(_))));
    }

    #[test]
    fn test_parse_malformed_uuid_is_decoding_error() {
        let result = parse_payload(
            br#"{"recipes": [{"uuid": "not-a-uuid", "cuisine": "Malaysian", "name": "Apam Balik"}]}"#,
        );
        assert!(matches!(result, Err(FetchError::DecodingError(_))));
    }

    #[test]
    fn test_parse_missing_name_is_decoding_error() {
        let result = parse_payload(
            br#"{"recipes": [{"uuid": "0c6ca6e7-e32a-4053-b824-1dbf749910d8", "cuisine": "Malaysian"}]}"#,
        );
        assert!(matches!(result, Err(FetchError::DecodingError(_))));
    }

    #[test]
    fn test_parse_missing_cuisine_is_decoding_error() {
        let result = parse_payload(
            br#"{"recipes": [{"uuid": "0c6ca6e7-e32a-4053-b824-1dbf749910d8", "name": "Apam Balik"}]}"#,
        );
        assert!(matches!(result, Err(FetchError::DecodingError(_))));
    }

    #[test]
    fn test_parse_wrong_envelope_type_is_decoding_error() {
        let result = parse_payload(br#"{"recipes": "not-an-array"}"#);
        assert!(matches!(result, Err(FetchError::DecodingError(_))));
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(
            Endpoint::Primary.url(),
            "https://d3jbb8n5wk0qxi.cloudfront.net/recipes.json"
        );
        assert_eq!(
            Endpoint::Malformed.url(),
            "https://d3jbb8n5wk0qxi.cloudfront.net/recipes-malformed.json"
        );
        assert_eq!(
            Endpoint::Empty.url(),
            "https://d3jbb8n5wk0qxi.cloudfront.net/recipes-empty.json"
        );
        assert!(Endpoint::Unreachable.url().contains("invalid"));
    }

    #[test]
    fn test_endpoint_names() {
        assert_eq!(Endpoint::Primary.name(), "primary");
        assert_eq!(Endpoint::Malformed.name(), "malformed");
        assert_eq!(Endpoint::Empty.name(), "empty");
        assert_eq!(Endpoint::Unreachable.name(), "unreachable");
    }

    #[test]
    fn test_client_base_url_override_applies_to_feed_endpoints() {
        let client = RecipeClient::with_base_url("http://localhost:8080".to_string());
        assert_eq!(
            client.endpoint_url(Endpoint::Primary),
            "http://localhost:8080/recipes.json"
        );
        assert_eq!(
            client.endpoint_url(Endpoint::Empty),
            "http://localhost:8080/recipes-empty.json"
        );
        // The unreachable fixture keeps its own host regardless of the base
        assert!(client.endpoint_url(Endpoint::Unreachable).contains("invalid"));
    }

    #[tokio::test]
    async fn test_fetch_from_unreachable_host_is_no_data() {
        let client = RecipeClient::new();
        let result = client.fetch_recipes(Endpoint::Unreachable).await;
        assert!(matches!(result, Err(FetchError::NoData)));
    }

    #[test]
    fn test_fetch_error_messages_are_stable() {
        assert_eq!(
            FetchError::NoData.to_string(),
            "no data received from the server"
        );
        assert_eq!(
            FetchError::EmptyResponse.to_string(),
            "the server returned an empty recipe list"
        );
    }
}
