pub mod header;
pub mod utils;

pub use header::{draw_header, extract_domain};
pub use utils::{genre_color, short_date, truncate};
