//! Small helpers shared by the TUI and the library.
//!
//! - **Text**: display-width aware truncation, single-line sanitising of
//!   backend strings, compact counts
//! - **URLs**: checks applied before opening links in the system browser

mod text;
mod url_validator;

pub use text::{display_width, format_count, sanitize_line, truncate_to_width};
pub use url_validator::{validate_http_url, validate_url_for_open, UrlValidationError};

/// Longest filter term accepted from the keyboard.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
