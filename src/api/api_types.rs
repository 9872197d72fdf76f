//! Serde-deserializable types matching SpecGen API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{GeneratedStory, Genre, PageInfo, StorySummary, SummaryPage};

/// Envelope shared by the JSON endpoints.
///
/// The server reports application-level failures with `success: false` and
/// an `error` string rather than a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct ApiSummaryResponse {
  pub success: bool,
  #[serde(default)]
  pub data: Vec<ApiSummaryItem>,
  pub pagination: Option<ApiPagination>,
  pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSummaryItem {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(rename = "type", default = "unknown_genre")]
  pub genre: Genre,
  #[serde(default)]
  pub year: i32,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "hasImage", default)]
  pub has_image: bool,
}

fn unknown_genre() -> Genre {
  Genre::Unknown
}

#[derive(Debug, Deserialize)]
pub struct ApiPagination {
  pub page: u32,
  pub limit: u32,
  pub total: u64,
  #[serde(rename = "totalPages")]
  pub total_pages: u32,
  #[serde(rename = "hasNext")]
  pub has_next: bool,
  #[serde(rename = "hasPrev")]
  pub has_prev: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiGenerateResponse {
  pub success: bool,
  pub data: Option<ApiGeneratedContent>,
  pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGeneratedContent {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub content: String,
}

impl ApiSummaryItem {
  pub fn into_summary(self) -> StorySummary {
    StorySummary {
      id: self.id,
      title: self.title,
      genre: self.genre,
      year: self.year,
      created_at: self.created_at,
      has_image: self.has_image,
    }
  }
}

impl ApiPagination {
  pub fn into_page_info(self) -> PageInfo {
    PageInfo {
      page: self.page,
      limit: self.limit,
      total: self.total,
      total_pages: self.total_pages,
      has_next: self.has_next,
      has_prev: self.has_prev,
    }
  }
}

impl ApiSummaryResponse {
  /// Convert a successful envelope into a domain page.
  ///
  /// Returns the server's error message when `success` is false or the
  /// pagination block is missing.
  pub fn into_page(self) -> Result<SummaryPage, String> {
    if !self.success {
      return Err(
        self
          .error
          .unwrap_or_else(|| "server reported failure".to_string()),
      );
    }
    let pagination = self
      .pagination
      .ok_or_else(|| "response missing pagination".to_string())?;

    Ok(SummaryPage {
      items: self.data.into_iter().map(|i| i.into_summary()).collect(),
      page_info: pagination.into_page_info(),
    })
  }
}

impl ApiGenerateResponse {
  pub fn into_story(self) -> Result<GeneratedStory, String> {
    if !self.success {
      return Err(
        self
          .error
          .unwrap_or_else(|| "server reported failure".to_string()),
      );
    }
    let content = self
      .data
      .ok_or_else(|| "response missing generated content".to_string())?;

    Ok(GeneratedStory {
      id: content.id,
      title: content.title,
      content: content.content,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_summary_response_parses_camel_case() {
    let json = r#"{
      "success": true,
      "data": [{
        "id": "s-1",
        "title": "The Tin Moons",
        "type": "sci-fi",
        "year": 2419,
        "createdAt": "2026-01-04T12:00:00Z",
        "hasImage": true
      }],
      "pagination": {
        "page": 1, "limit": 20, "total": 41,
        "totalPages": 3, "hasNext": true, "hasPrev": false
      }
    }"#;

    let response: ApiSummaryResponse = serde_json::from_str(json).unwrap();
    let page = response.into_page().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].genre, Genre::SciFi);
    assert!(page.items[0].has_image);
    assert_eq!(page.page_info.total_pages, 3);
    assert!(page.page_info.has_next);
  }

  #[test]
  fn test_unknown_genre_does_not_fail_page() {
    let json = r#"{
      "success": true,
      "data": [{
        "id": "s-2",
        "title": "Mudlark",
        "type": "weird-west",
        "year": 1890,
        "createdAt": "2026-02-01T00:00:00Z"
      }],
      "pagination": {
        "page": 1, "limit": 20, "total": 1,
        "totalPages": 1, "hasNext": false, "hasPrev": false
      }
    }"#;

    let response: ApiSummaryResponse = serde_json::from_str(json).unwrap();
    let page = response.into_page().unwrap();
    assert_eq!(page.items[0].genre, Genre::Unknown);
    assert!(!page.items[0].has_image);
  }

  #[test]
  fn test_failure_envelope_surfaces_error() {
    let json = r#"{"success": false, "error": "library unavailable"}"#;
    let response: ApiSummaryResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.into_page().unwrap_err(), "library unavailable");
  }

  #[test]
  fn test_missing_pagination_is_an_error() {
    let json = r#"{"success": true, "data": []}"#;
    let response: ApiSummaryResponse = serde_json::from_str(json).unwrap();
    assert!(response.into_page().is_err());
  }
}
