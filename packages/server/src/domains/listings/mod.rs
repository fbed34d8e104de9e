pub mod activities;
pub mod models;

pub use activities::{ExtractionError, ListingExtractor};
pub use models::{BookCondition, BookListing, ListingValidationError};
