//! Stability AI REST v1 text-to-image integration.

pub mod client;
pub mod image;
pub mod types;

pub use image::StabilityImageClient;
