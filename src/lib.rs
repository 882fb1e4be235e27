//! The Skald - a scheduled dream generator
//!
//! Each run picks a seed idea, asks a language model for a short poem and an
//! image prompt derived from it, renders the image with Stability AI, and
//! records the result in a JSON dream log next to a directory of PNG files.

pub mod ai;
pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod seeds;
pub mod storage;

pub use error::{Error, ErrorKind, Result};
