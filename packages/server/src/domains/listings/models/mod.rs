pub mod book_listing;

pub use book_listing::*;
