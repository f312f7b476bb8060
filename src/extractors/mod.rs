//! HTML extraction modules
//!
//! Each module handles one part of the page: shared DOM helpers, phone
//! numbers, map coordinates, list pages and post pages.

pub mod dom;
mod geo_extractor;
mod list_extractor;
mod phone_extractor;
mod post_extractor;

pub use geo_extractor::*;
pub use list_extractor::*;
pub use phone_extractor::*;
pub use post_extractor::*;
