// Common types and utilities shared across the application

pub mod image;

pub use image::{EncodedImage, ImageError, ImageFormat, UploadedImage};
