//! Progressive pagination over the story library.
//!
//! The controller is a synchronous state machine: operations return an
//! optional [`FetchRequest`] for the caller to execute, and the outcome is
//! applied back with the request's sequence token. A completion whose token
//! no longer matches is discarded, which is what makes refreshes and
//! teardowns safe without cancellation.

use tracing::{debug, warn};

use crate::api::types::{Genre, PageInfo, StorySummary, SummaryPage};
use crate::cache::{SnapshotEntry, SnapshotStore};

/// Lifecycle phase of the library list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  LoadingInitial,
  LoadingMore,
  Loaded,
  Error,
}

/// A fetch the shell should perform on the controller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
  /// Token to hand back with the outcome.
  pub seq: u64,
  /// 1-based page to request.
  pub page: u32,
}

/// Owns the accumulated summary list and drives its state transitions.
pub struct LibraryController {
  store: SnapshotStore,
  page_size: u32,
  genre: Option<Genre>,

  phase: Phase,
  items: Vec<StorySummary>,
  pagination: Option<PageInfo>,
  /// Fatal-for-this-action error, retryable.
  error: Option<String>,
  /// Non-fatal stale-data notice after an offline fallback.
  advisory: Option<String>,
  is_initial_load: bool,
  seq: u64,
}

impl LibraryController {
  pub fn new(store: SnapshotStore, page_size: u32, genre: Option<Genre>) -> Self {
    Self {
      store,
      page_size,
      genre,
      phase: Phase::Idle,
      items: Vec::new(),
      pagination: None,
      error: None,
      advisory: None,
      is_initial_load: true,
      seq: 0,
    }
  }

  /// First transition. Serves a valid snapshot without any network call,
  /// otherwise requests page 1.
  pub fn mount(&mut self) -> Option<FetchRequest> {
    // The marker answers "still valid?" without deserializing the payload;
    // the payload is only parsed when it will actually be served
    if self.store.marker_is_valid() {
      if let Some(entry) = self.store.load() {
        if entry.is_valid() {
          debug!(
            items = entry.data.len(),
            age_min = entry.age_minutes(),
            "serving library from valid snapshot"
          );
          self.adopt_snapshot(entry, None);
          return None;
        }
      }
    }
    Some(self.begin_initial())
  }

  /// Force a page-1 refetch, bypassing snapshot validity entirely. Any
  /// in-flight request is invalidated; current items stay visible until
  /// replaced.
  pub fn refresh(&mut self) -> Option<FetchRequest> {
    Some(self.begin_initial())
  }

  /// Request the next page. Gated on `Loaded` + `has_next` so no second
  /// fetch is issued while one is in flight.
  pub fn load_more(&mut self) -> Option<FetchRequest> {
    if self.phase != Phase::Loaded {
      return None;
    }
    let next = match &self.pagination {
      Some(p) if p.has_next => p.page + 1,
      _ => return None,
    };
    self.phase = Phase::LoadingMore;
    self.error = None;
    Some(self.next_request(next))
  }

  /// Re-attempt after an error: page 1 when nothing is loaded, the next
  /// page when a load-more failed with items on screen.
  pub fn retry(&mut self) -> Option<FetchRequest> {
    if self.phase != Phase::Error {
      return None;
    }
    if self.items.is_empty() {
      return Some(self.begin_initial());
    }
    let next = self.pagination.as_ref().map(|p| p.page + 1).unwrap_or(1);
    self.phase = Phase::LoadingMore;
    self.error = None;
    Some(self.next_request(next))
  }

  /// Apply a successful fetch. Page 1 replaces the list and refreshes the
  /// persisted snapshot; later pages append and leave the snapshot alone.
  pub fn apply_page(&mut self, seq: u64, page: SummaryPage) {
    if seq != self.seq {
      debug!(seq, current = self.seq, "dropping stale page result");
      return;
    }

    if page.page_info.page <= 1 {
      self.items = page.items;
      self.pagination = Some(page.page_info);
      self.persist_snapshot();
    } else {
      self.items.extend(page.items);
      self.pagination = Some(page.page_info);
    }

    self.phase = Phase::Loaded;
    self.error = None;
    self.advisory = None;
    self.is_initial_load = false;
  }

  /// Apply a failed fetch. Initial-load failures fall back to the
  /// persisted snapshot regardless of its validity window; load-more
  /// failures keep everything already on screen.
  pub fn apply_error(&mut self, seq: u64, message: &str) {
    if seq != self.seq {
      debug!(seq, current = self.seq, "dropping stale fetch error");
      return;
    }

    match self.phase {
      Phase::LoadingInitial => {
        if let Some(entry) = self.store.load() {
          warn!("library fetch failed, serving snapshot: {message}");
          let advisory = Some(format!(
            "Network unavailable - showing cached library from {} min ago",
            entry.age_minutes()
          ));
          self.adopt_snapshot(entry, advisory);
        } else {
          self.phase = Phase::Error;
          self.error = Some(message.to_string());
        }
      }
      Phase::LoadingMore => {
        self.phase = Phase::Error;
        self.error = Some(message.to_string());
      }
      _ => {}
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn items(&self) -> &[StorySummary] {
    &self.items
  }

  pub fn pagination(&self) -> Option<&PageInfo> {
    self.pagination.as_ref()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn advisory(&self) -> Option<&str> {
    self.advisory.as_deref()
  }

  /// True until the first page (or snapshot) has been served.
  pub fn is_initial_load(&self) -> bool {
    self.is_initial_load
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.phase, Phase::LoadingInitial | Phase::LoadingMore)
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn genre(&self) -> Option<Genre> {
    self.genre
  }

  fn begin_initial(&mut self) -> FetchRequest {
    self.phase = Phase::LoadingInitial;
    self.error = None;
    self.next_request(1)
  }

  fn next_request(&mut self, page: u32) -> FetchRequest {
    self.seq += 1;
    FetchRequest {
      seq: self.seq,
      page,
    }
  }

  fn adopt_snapshot(&mut self, entry: SnapshotEntry, advisory: Option<String>) {
    self.items = entry.data;
    self.pagination = Some(entry.pagination);
    self.phase = Phase::Loaded;
    self.error = None;
    self.advisory = advisory;
    self.is_initial_load = false;
  }

  fn persist_snapshot(&self) {
    let Some(pagination) = self.pagination.clone() else {
      return;
    };
    let entry = SnapshotEntry::new(self.items.clone(), pagination);
    // A failed cache write never blocks or fails the fetch flow
    if let Err(e) = self.store.save(&entry) {
      warn!("failed to persist library snapshot: {e}");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn summary(id: &str) -> StorySummary {
    StorySummary {
      id: id.to_string(),
      title: format!("Story {id}"),
      genre: Genre::Fantasy,
      year: 2030,
      created_at: Utc::now(),
      has_image: false,
    }
  }

  fn page(page_no: u32, ids: &[&str], has_next: bool) -> SummaryPage {
    SummaryPage {
      items: ids.iter().map(|id| summary(id)).collect(),
      page_info: PageInfo {
        page: page_no,
        limit: 20,
        total: 40,
        total_pages: 2,
        has_next,
        has_prev: page_no > 1,
      },
    }
  }

  fn controller() -> LibraryController {
    LibraryController::new(SnapshotStore::open_in_memory().unwrap(), 20, None)
  }

  fn controller_with_snapshot(age_ms: i64, ids: &[&str]) -> LibraryController {
    let store = SnapshotStore::open_in_memory().unwrap();
    let seeded = page(1, ids, false);
    let mut entry = SnapshotEntry::new(seeded.items, seeded.page_info);
    entry.timestamp = Utc::now().timestamp_millis() - age_ms;
    store.save(&entry).unwrap();
    LibraryController::new(store, 20, None)
  }

  const MINUTE_MS: i64 = 60 * 1000;

  #[test]
  fn test_mount_with_valid_snapshot_skips_network() {
    let mut ctl = controller_with_snapshot(10 * MINUTE_MS, &["a", "b"]);
    let request = ctl.mount();

    assert!(request.is_none());
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.items().len(), 2);
    assert!(ctl.advisory().is_none());
  }

  #[test]
  fn test_mount_with_expired_snapshot_fetches_page_one() {
    let mut ctl = controller_with_snapshot(31 * MINUTE_MS, &["a", "b"]);
    let request = ctl.mount().expect("expired snapshot must refetch");

    assert_eq!(request.page, 1);
    assert_eq!(ctl.phase(), Phase::LoadingInitial);
  }

  #[test]
  fn test_mount_without_snapshot_fetches_page_one() {
    let mut ctl = controller();
    let request = ctl.mount().expect("empty store must fetch");
    assert_eq!(request.page, 1);
    assert!(ctl.is_initial_load());
  }

  #[test]
  fn test_first_page_replaces_and_later_pages_append() {
    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    ctl.apply_page(request.seq, page(1, &["a", "b"], true));
    assert_eq!(ctl.phase(), Phase::Loaded);

    let more = ctl.load_more().expect("has_next should allow load-more");
    assert_eq!(more.page, 2);
    ctl.apply_page(more.seq, page(2, &["c", "d"], false));

    let ids: Vec<&str> = ctl.items().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
    assert!(!ctl.pagination().unwrap().has_next);
  }

  #[test]
  fn test_forty_item_scenario() {
    let first: Vec<String> = (0..20).map(|i| format!("a{i}")).collect();
    let second: Vec<String> = (0..20).map(|i| format!("b{i}")).collect();
    let first_refs: Vec<&str> = first.iter().map(String::as_str).collect();
    let second_refs: Vec<&str> = second.iter().map(String::as_str).collect();

    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    ctl.apply_page(request.seq, page(1, &first_refs, true));

    let more = ctl.load_more().unwrap();
    ctl.apply_page(more.seq, page(2, &second_refs, false));

    assert_eq!(ctl.items().len(), 40);
    assert!(!ctl.pagination().unwrap().has_next);
    // Earlier pages untouched and in order
    assert_eq!(ctl.items()[0].id, "a0");
    assert_eq!(ctl.items()[19].id, "a19");
    assert_eq!(ctl.items()[20].id, "b0");
  }

  #[test]
  fn test_initial_failure_with_stale_snapshot_serves_cached_data() {
    let mut ctl = controller_with_snapshot(45 * MINUTE_MS, &["a", "b"]);
    let request = ctl.mount().unwrap();
    ctl.apply_error(request.seq, "connection refused");

    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.items().len(), 2);
    let advisory = ctl.advisory().expect("fallback must carry an advisory");
    assert!(!advisory.is_empty());
    assert!(ctl.error().is_none());
  }

  #[test]
  fn test_initial_failure_without_snapshot_is_retryable_error() {
    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    ctl.apply_error(request.seq, "connection refused");

    assert_eq!(ctl.phase(), Phase::Error);
    assert!(ctl.items().is_empty());
    assert_eq!(ctl.error(), Some("connection refused"));

    let retry = ctl.retry().expect("error state must expose retry");
    assert_eq!(retry.page, 1);
    ctl.apply_page(retry.seq, page(1, &["a"], false));
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.items().len(), 1);
  }

  #[test]
  fn test_load_more_failure_keeps_items() {
    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    ctl.apply_page(request.seq, page(1, &["a", "b"], true));

    let more = ctl.load_more().unwrap();
    ctl.apply_error(more.seq, "timeout");

    assert_eq!(ctl.phase(), Phase::Error);
    assert_eq!(ctl.items().len(), 2);
    assert_eq!(ctl.error(), Some("timeout"));

    // Retry re-requests the page that failed
    let retry = ctl.retry().unwrap();
    assert_eq!(retry.page, 2);
  }

  #[test]
  fn test_load_more_gated_while_loading() {
    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    ctl.apply_page(request.seq, page(1, &["a"], true));

    ctl.load_more().unwrap();
    // Second trigger while the first is in flight is a no-op
    assert!(ctl.load_more().is_none());
  }

  #[test]
  fn test_load_more_gated_on_has_next() {
    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    ctl.apply_page(request.seq, page(1, &["a"], false));
    assert!(ctl.load_more().is_none());
  }

  #[test]
  fn test_refresh_bypasses_valid_snapshot() {
    let mut ctl = controller_with_snapshot(MINUTE_MS, &["a", "b"]);
    assert!(ctl.mount().is_none());

    let request = ctl.refresh().expect("refresh always refetches");
    assert_eq!(request.page, 1);
    assert_eq!(ctl.phase(), Phase::LoadingInitial);
    // Items stay visible until replaced
    assert_eq!(ctl.items().len(), 2);

    ctl.apply_page(request.seq, page(1, &["x"], false));
    assert_eq!(ctl.items().len(), 1);
    assert_eq!(ctl.items()[0].id, "x");
  }

  #[test]
  fn test_stale_seq_results_are_dropped() {
    let mut ctl = controller();
    let first = ctl.mount().unwrap();
    // Refresh invalidates the in-flight request
    let second = ctl.refresh().unwrap();

    ctl.apply_page(first.seq, page(1, &["old"], false));
    assert_eq!(ctl.phase(), Phase::LoadingInitial);
    assert!(ctl.items().is_empty());

    ctl.apply_page(second.seq, page(1, &["new"], false));
    assert_eq!(ctl.items()[0].id, "new");
  }

  #[test]
  fn test_empty_result_is_loaded_not_error() {
    let mut ctl = controller();
    let request = ctl.mount().unwrap();
    let mut empty = page(1, &[], false);
    empty.page_info.total = 0;
    empty.page_info.total_pages = 0;
    ctl.apply_page(request.seq, empty);

    assert_eq!(ctl.phase(), Phase::Loaded);
    assert!(ctl.items().is_empty());
    assert!(ctl.error().is_none());
  }

  #[test]
  fn test_first_page_success_persists_snapshot() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let mut ctl = LibraryController::new(store, 20, None);
    let request = ctl.mount().unwrap();
    ctl.apply_page(request.seq, page(1, &["a", "b"], true));

    // A fresh controller over the same store mounts from the snapshot
    // (in-memory stores are per-connection, so reuse the same controller's
    // store through a refresh failure instead)
    let refresh = ctl.refresh().unwrap();
    ctl.apply_error(refresh.seq, "offline");
    assert_eq!(ctl.phase(), Phase::Loaded);
    assert_eq!(ctl.items().len(), 2);
    assert!(ctl.advisory().is_some());
  }

  #[test]
  fn test_success_clears_stale_advisory() {
    let mut ctl = controller_with_snapshot(45 * MINUTE_MS, &["a"]);
    let request = ctl.mount().unwrap();
    ctl.apply_error(request.seq, "offline");
    assert!(ctl.advisory().is_some());

    let refresh = ctl.refresh().unwrap();
    ctl.apply_page(refresh.seq, page(1, &["a"], false));
    assert!(ctl.advisory().is_none());
  }
}
