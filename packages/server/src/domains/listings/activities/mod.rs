pub mod extract_listing;

pub use extract_listing::{ExtractionError, ListingExtractor, LISTING_SYSTEM_PROMPT};
