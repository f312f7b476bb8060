//! Classifieds listing parser
//!
//! Extracts listing records from classifieds HTML pages:
//! - list pages (search results) into lightweight items
//! - post pages into enriched records (attributes, geo, phones, job fields)
//! - normalization onto a canonical key order and schema
//! - JSON export, blocking fetch and concurrent batch parsing around the core

pub mod batch;
pub mod category;
pub mod config;
pub mod error;
pub mod export;
pub mod extractors;
pub mod fetch;
pub mod normalize;
pub mod record;

pub use category::detect_category_from_url;
pub use error::{Error, Result};
pub use extractors::*;
pub use normalize::{normalize, normalize_all};
pub use record::{ListItem, PostRecord, Record};
