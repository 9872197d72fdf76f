use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::api::api_types::{ApiGenerateResponse, ApiSummaryResponse};
use crate::api::types::{GeneratedStory, Genre, SummaryPage};
use crate::config::Config;

/// Parameters of one summary-list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
  pub page: u32,
  pub limit: u32,
  pub genre: Option<Genre>,
}

impl SummaryQuery {
  /// Stable, fixed-length cache key for this query.
  pub fn cache_hash(&self) -> String {
    let input = format!(
      "summary:{}:{}:{}",
      self.page,
      self.limit,
      self.genre.map(|g| g.as_param()).unwrap_or("")
    );

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Request body for the generation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
  #[serde(rename = "contentType")]
  pub content_type: String,
  #[serde(rename = "parameterValues")]
  pub parameter_values: serde_json::Value,
}

/// SpecGen API client wrapper
#[derive(Clone)]
pub struct SpecGenClient {
  http: reqwest::Client,
  base: Url,
}

impl SpecGenClient {
  pub fn new(config: &Config) -> Result<Self> {
    let mut base = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API URL {}: {}", config.api.url, e))?;
    // Url::join treats a trailing path segment as a file otherwise
    if !base.path().ends_with('/') {
      base.set_path(&format!("{}/", base.path()));
    }

    let mut headers = HeaderMap::new();
    if let Some(key) = Config::get_api_key() {
      let value = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| eyre!("Invalid API key: {}", e))?;
      headers.insert(AUTHORIZATION, value);
    }

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  /// Fetch one page of story summaries.
  pub async fn summaries(&self, query: &SummaryQuery) -> Result<SummaryPage> {
    let url = self
      .base
      .join("content/summary")
      .map_err(|e| eyre!("Failed to build summary URL: {}", e))?;

    let mut request = self.http.get(url).query(&[
      ("page", query.page.to_string()),
      ("limit", query.limit.to_string()),
    ]);
    if let Some(genre) = query.genre {
      request = request.query(&[("genre", genre.as_param())]);
    }

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch library page {}: {}", query.page, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Library request failed: HTTP {}", status));
    }

    let envelope: ApiSummaryResponse = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse library response: {}", e))?;

    envelope
      .into_page()
      .map_err(|e| eyre!("Library request rejected: {}", e))
  }

  /// Fetch the rendered image for a story.
  pub async fn image(&self, story_id: &str) -> Result<Vec<u8>> {
    let url = self
      .base
      .join(&format!("content/{story_id}/image"))
      .map_err(|e| eyre!("Failed to build image URL: {}", e))?;

    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch image for {}: {}", story_id, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Image request for {} failed: HTTP {}", story_id, status));
    }

    let bytes = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read image body for {}: {}", story_id, e))?;

    Ok(bytes.to_vec())
  }

  /// Request a new generated story.
  pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedStory> {
    let url = self
      .base
      .join("generate")
      .map_err(|e| eyre!("Failed to build generate URL: {}", e))?;

    let response = self
      .http
      .post(url)
      .json(request)
      .send()
      .await
      .map_err(|e| eyre!("Failed to submit generation request: {}", e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Generation request failed: HTTP {}", status));
    }

    let envelope: ApiGenerateResponse = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse generation response: {}", e))?;

    envelope
      .into_story()
      .map_err(|e| eyre!("Generation rejected: {}", e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{ApiConfig, Config};
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn config_for(server: &MockServer) -> Config {
    Config {
      api: ApiConfig {
        url: format!("{}/api", server.uri()),
        timeout_secs: 5,
      },
      ..Config::default()
    }
  }

  const SUMMARY_BODY: &str = r#"{
    "success": true,
    "data": [{
      "id": "s-1",
      "title": "The Tin Moons",
      "type": "sci-fi",
      "year": 2419,
      "createdAt": "2026-01-04T12:00:00Z",
      "hasImage": false
    }],
    "pagination": {
      "page": 1, "limit": 20, "total": 1,
      "totalPages": 1, "hasNext": false, "hasPrev": false
    }
  }"#;

  #[tokio::test]
  async fn test_summaries_fetch_and_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/content/summary"))
      .and(query_param("page", "1"))
      .and(query_param("limit", "20"))
      .and(query_param("genre", "sci-fi"))
      .respond_with(ResponseTemplate::new(200).set_body_raw(SUMMARY_BODY, "application/json"))
      .mount(&server)
      .await;

    let client = SpecGenClient::new(&config_for(&server)).unwrap();
    let page = client
      .summaries(&SummaryQuery {
        page: 1,
        limit: 20,
        genre: Some(Genre::SciFi),
      })
      .await
      .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "The Tin Moons");
    assert_eq!(page.page_info.total, 1);
  }

  #[tokio::test]
  async fn test_summaries_envelope_failure_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/content/summary"))
      .respond_with(ResponseTemplate::new(200).set_body_raw(
        r#"{"success": false, "error": "library offline"}"#,
        "application/json",
      ))
      .mount(&server)
      .await;

    let client = SpecGenClient::new(&config_for(&server)).unwrap();
    let result = client
      .summaries(&SummaryQuery {
        page: 1,
        limit: 20,
        genre: None,
      })
      .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("library offline"));
  }

  #[tokio::test]
  async fn test_summaries_http_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/content/summary"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let client = SpecGenClient::new(&config_for(&server)).unwrap();
    let result = client
      .summaries(&SummaryQuery {
        page: 1,
        limit: 20,
        genre: None,
      })
      .await;

    assert!(result.unwrap_err().to_string().contains("500"));
  }

  #[tokio::test]
  async fn test_generate_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/generate"))
      .respond_with(ResponseTemplate::new(200).set_body_raw(
        r#"{"success": true, "data": {"id": "g-1", "title": "Gloaming", "content": "Once..."}}"#,
        "application/json",
      ))
      .mount(&server)
      .await;

    let client = SpecGenClient::new(&config_for(&server)).unwrap();
    let story = client
      .generate(&GenerateRequest {
        content_type: "fantasy".to_string(),
        parameter_values: serde_json::json!({"length": 1200}),
      })
      .await
      .unwrap();

    assert_eq!(story.id, "g-1");
    assert_eq!(story.content, "Once...");
  }

  #[tokio::test]
  async fn test_image_fetch_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/content/s-1/image"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89u8, 0x50, 0x4e, 0x47]))
      .mount(&server)
      .await;

    let client = SpecGenClient::new(&config_for(&server)).unwrap();
    let bytes = client.image("s-1").await.unwrap();
    assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
  }

  #[test]
  fn test_cache_hash_is_stable_and_distinct() {
    let a = SummaryQuery {
      page: 1,
      limit: 20,
      genre: None,
    };
    let b = SummaryQuery {
      page: 2,
      limit: 20,
      genre: None,
    };
    assert_eq!(a.cache_hash(), a.cache_hash());
    assert_ne!(a.cache_hash(), b.cache_hash());
    assert_eq!(a.cache_hash().len(), 64);
  }
}
