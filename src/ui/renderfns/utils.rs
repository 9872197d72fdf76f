use chrono::{DateTime, Utc};
use ratatui::prelude::Color;

use crate::api::types::Genre;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.len() <= max_len {
    s.to_string()
  } else {
    format!("{}...", &s[..max_len.saturating_sub(3)])
  }
}

/// Display color for a story genre
pub fn genre_color(genre: Genre) -> Color {
  match genre {
    Genre::SciFi => Color::Cyan,
    Genre::Fantasy => Color::Magenta,
    Genre::Horror => Color::Red,
    Genre::Unknown => Color::White,
  }
}

/// Short date for list rows
pub fn short_date(at: &DateTime<Utc>) -> String {
  at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_genre_colors_are_distinct() {
    assert_eq!(genre_color(Genre::SciFi), Color::Cyan);
    assert_eq!(genre_color(Genre::Fantasy), Color::Magenta);
    assert_eq!(genre_color(Genre::Horror), Color::Red);
    assert_eq!(genre_color(Genre::Unknown), Color::White);
  }

  #[test]
  fn test_short_date() {
    let at = Utc.with_ymd_and_hms(2026, 1, 4, 12, 30, 0).unwrap();
    assert_eq!(short_date(&at), "2026-01-04");
  }
}
