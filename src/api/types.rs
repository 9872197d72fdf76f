use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Story genre as reported by the SpecGen API.
///
/// The server may grow new genres; unrecognized values deserialize to
/// `Unknown` instead of failing the whole summary page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
  #[serde(rename = "sci-fi")]
  SciFi,
  Fantasy,
  Horror,
  #[serde(other)]
  Unknown,
}

impl Genre {
  /// Query-parameter value for this genre.
  pub fn as_param(&self) -> &'static str {
    match self {
      Genre::SciFi => "sci-fi",
      Genre::Fantasy => "fantasy",
      Genre::Horror => "horror",
      Genre::Unknown => "unknown",
    }
  }

  /// Parse a user-supplied genre name (CLI flag, config file).
  pub fn parse(s: &str) -> Option<Genre> {
    match s.trim().to_lowercase().as_str() {
      "sci-fi" | "scifi" | "sf" => Some(Genre::SciFi),
      "fantasy" => Some(Genre::Fantasy),
      "horror" => Some(Genre::Horror),
      _ => None,
    }
  }
}

impl std::fmt::Display for Genre {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Genre::SciFi => "sci-fi",
      Genre::Fantasy => "fantasy",
      Genre::Horror => "horror",
      Genre::Unknown => "unknown",
    };
    write!(f, "{}", name)
  }
}

/// Summary of a story for library list views.
///
/// Immutable once fetched; identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySummary {
  pub id: String,
  pub title: String,
  pub genre: Genre,
  pub year: i32,
  pub created_at: DateTime<Utc>,
  pub has_image: bool,
}

/// Pagination metadata for one summary page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
  pub page: u32,
  pub limit: u32,
  pub total: u64,
  pub total_pages: u32,
  pub has_next: bool,
  pub has_prev: bool,
}

/// One fetched page of the library.
#[derive(Debug, Clone)]
pub struct SummaryPage {
  pub items: Vec<StorySummary>,
  pub page_info: PageInfo,
}

/// A freshly generated story returned by the generation endpoint.
#[derive(Debug, Clone)]
pub struct GeneratedStory {
  pub id: String,
  pub title: String,
  pub content: String,
}
