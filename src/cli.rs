//! Command-line interface parsing for mealfeed
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --endpoint flag for targeting the demo feed fixtures.

use clap::Parser;
use thiserror::Error;

use crate::data::Endpoint;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified endpoint name is not recognized
    #[error("Invalid endpoint: '{0}'. Valid endpoints: primary, malformed, empty, unreachable")]
    InvalidEndpoint(String),
}

/// Mealfeed - browse a remote recipe feed from the terminal
#[derive(Parser, Debug)]
#[command(name = "mealfeed")]
#[command(about = "Browse the recipe feed with cuisine filtering and cached images")]
#[command(version)]
pub struct Cli {
    /// Feed endpoint to fetch
    ///
    /// Examples:
    ///   mealfeed                        # fetch the primary feed
    ///   mealfeed --endpoint malformed   # demo the decoding-failure path
    ///   mealfeed --endpoint empty       # demo the empty-feed path
    ///
    /// Valid endpoints: primary, malformed, empty, unreachable
    #[arg(long, value_name = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Only list recipes of this cuisine (case-insensitive)
    #[arg(long, value_name = "CUISINE")]
    pub cuisine: Option<String>,

    /// Prefetch each listed recipe's thumbnail into the image cache
    #[arg(long)]
    pub thumbnails: bool,

    /// Clear the image cache and exit
    #[arg(long)]
    pub clear_cache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Which feed endpoint to fetch
    pub endpoint: Endpoint,
    /// Cuisine filter to apply before listing
    pub cuisine: Option<String>,
    /// Whether to prefetch thumbnails after the fetch
    pub fetch_thumbnails: bool,
    /// Whether to clear the image cache instead of fetching
    pub clear_cache: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Primary,
            cuisine: None,
            fetch_thumbnails: false,
            clear_cache: false,
        }
    }
}

/// Parses an endpoint string argument into an [`Endpoint`].
///
/// # Arguments
/// * `s` - The endpoint string from CLI
///
/// # Returns
/// * `Ok(Endpoint)` if the string matches a valid endpoint
/// * `Err(CliError::InvalidEndpoint)` if the string doesn't match
pub fn parse_endpoint_arg(s: &str) -> Result<Endpoint, CliError> {
    match s.to_ascii_lowercase().as_str() {
        "primary" => Ok(Endpoint::Primary),
        "malformed" => Ok(Endpoint::Malformed),
        "empty" => Ok(Endpoint::Empty),
        "unreachable" => Ok(Endpoint::Unreachable),
        _ => Err(CliError::InvalidEndpoint(s.to_string())),
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid endpoint was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let endpoint = match &cli.endpoint {
            Some(name) => parse_endpoint_arg(name)?,
            None => Endpoint::Primary,
        };

        Ok(StartupConfig {
            endpoint,
            cuisine: cli.cuisine.clone(),
            fetch_thumbnails: cli.thumbnails,
            clear_cache: cli.clear_cache,
        })
    }
}
