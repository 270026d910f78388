//! Core data models for the mealfeed recipe browser
//!
//! This module contains the recipe value type shared across the fetch
//! pipeline, the state store, and the CLI shell.

pub mod recipes;

pub use recipes::{Endpoint, FetchError, RecipeClient, RecipeSource};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single recipe from the remote feed
///
/// Immutable after construction; instances are produced by decoding the
/// server payload, or built directly in tests. Equality is structural over
/// all fields.
///
/// The wire format uses `uuid` for the identifier and snake_case names for
/// the optional URL fields; unknown extra fields in the payload are ignored.
/// Only a missing or malformed `uuid` is a decoding failure; the URL fields
/// are carried as plain strings and validated where they are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier for the recipe
    #[serde(rename = "uuid")]
    pub id: Uuid,
    /// Cuisine the recipe belongs to (e.g. "Malaysian")
    pub cuisine: String,
    /// Human-readable name of the recipe
    pub name: String,
    /// URL of the full-size photo, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url_large: Option<String>,
    /// URL of the thumbnail photo, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url_small: Option<String>,
    /// URL of the original recipe page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// URL of a video walkthrough, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
}
