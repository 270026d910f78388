//! Image caching for the mealfeed recipe browser
//!
//! Provides the two-tier (memory + disk) image cache and the transport
//! abstraction it downloads through.

pub mod images;

pub use images::{HttpImageTransport, ImageCache, ImageTransport};
