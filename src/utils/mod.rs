//! Utility functions shared across modules.

pub mod dates;
pub mod html;
pub mod slug;

pub use dates::{parse_portal_timestamp, DateRange};
pub use html::{collapse_whitespace, strip_blank_lines};
pub use slug::slugify_words;
