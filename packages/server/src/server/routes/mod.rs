// HTTP routes
pub mod health;
pub mod listing;

pub use health::*;
pub use listing::*;
