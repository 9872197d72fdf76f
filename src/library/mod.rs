//! Library list state: progressive pagination with snapshot fallback.

mod controller;

pub use controller::{FetchRequest, LibraryController, Phase};
