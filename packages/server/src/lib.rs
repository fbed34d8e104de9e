// Used Book Lister - server core
//
// Upload the front and back cover of a used book, get back a title, a
// selling description and a condition estimate from a vision model.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
