//! View-state store for the recipe browser
//!
//! This module owns the loading/loaded/empty/error state machine that
//! drives fetches and exposes derived, filtered views of the result set to
//! the UI shell. State is published through a watch channel so observers
//! always see the latest value.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::data::{Endpoint, FetchError, Recipe, RecipeSource};

/// Message shown when the feed cannot be reached
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the recipe service. Check your connection and try again.";

/// Message shown when the feed payload cannot be decoded
pub const DECODING_ERROR_MESSAGE: &str =
    "The recipe data could not be read. Please try again later.";

/// Fallback message for any other failure
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong while loading recipes.";

/// The visible state of the recipe list
///
/// Exactly one state holds at any time; every fetch re-enters `Loading`
/// and settles in one of the other three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// A fetch is in flight
    Loading,
    /// The feed returned at least one recipe, in server order
    Loaded(Vec<Recipe>),
    /// The feed returned no recipes
    Empty,
    /// The fetch failed; carries a user-displayable message
    Error(String),
}

/// Orchestrates fetches and derived views over a [`RecipeSource`]
///
/// One store instance is owned by the UI task; all mutation goes through
/// `&mut self`, so a caller that wants overlapping fetches must serialize
/// them itself; whichever call completes last writes the visible state.
/// Observers hold [`watch::Receiver`]s from [`subscribe`](Self::subscribe).
pub struct RecipeStore {
    source: Arc<dyn RecipeSource>,
    endpoint: Endpoint,
    state_tx: watch::Sender<ViewState>,
    state_rx: watch::Receiver<ViewState>,
    recipes: Vec<Recipe>,
    selected_cuisine: Option<String>,
    selected_recipe: Option<Recipe>,
    last_refresh: Option<DateTime<Utc>>,
}

impl RecipeStore {
    /// Creates a store over the given source, targeting the primary endpoint
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        let (state_tx, state_rx) = watch::channel(ViewState::Loading);
        Self {
            source,
            endpoint: Endpoint::Primary,
            state_tx,
            state_rx,
            recipes: Vec::new(),
            selected_cuisine: None,
            selected_recipe: None,
            last_refresh: None,
        }
    }

    /// Overrides the endpoint the store fetches from
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Fetches the recipe list and settles the view state
    ///
    /// Publishes `Loading`, awaits the source, then publishes `Loaded` for
    /// a non-empty list, `Empty` for an empty feed, or `Error` with a fixed
    /// user-facing message for any other failure.
    pub async fn fetch_recipes(&mut self) {
        self.publish(ViewState::Loading);

        let result = self.source.fetch_recipes(self.endpoint).await;
        self.last_refresh = Some(Utc::now());

        match result {
            Ok(recipes) if !recipes.is_empty() => {
                self.recipes = recipes.clone();
                self.publish(ViewState::Loaded(recipes));
            }
            Ok(_) | Err(FetchError::EmptyResponse) => {
                self.recipes.clear();
                self.publish(ViewState::Empty);
            }
            Err(err) => {
                self.recipes.clear();
                tracing::warn!(error = %err, endpoint = self.endpoint.name(), "recipe fetch failed");
                self.publish(ViewState::Error(user_message(&err).to_string()));
            }
        }
    }

    /// Returns the current view state
    pub fn state(&self) -> ViewState {
        self.state_rx.borrow().clone()
    }

    /// Returns a receiver observing every published state
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_rx.clone()
    }

    /// The currently loaded recipes, in server order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Distinct cuisine values of the loaded recipes, sorted ascending
    ///
    /// Case-sensitive, exactly as stored.
    pub fn cuisines(&self) -> Vec<String> {
        self.recipes
            .iter()
            .map(|recipe| recipe.cuisine.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Loaded recipes matching the selected cuisine filter
    ///
    /// The match is case-insensitive and exact; with no filter set, all
    /// loaded recipes are returned. Original order is preserved either way.
    pub fn filtered_recipes(&self) -> Vec<&Recipe> {
        match &self.selected_cuisine {
            Some(filter) => self
                .recipes
                .iter()
                .filter(|recipe| recipe.cuisine.eq_ignore_ascii_case(filter))
                .collect(),
            None => self.recipes.iter().collect(),
        }
    }

    /// Sets or clears the cuisine filter; triggers no network activity
    pub fn set_cuisine(&mut self, cuisine: Option<String>) {
        self.selected_cuisine = cuisine;
    }

    /// The currently selected cuisine filter, if any
    pub fn selected_cuisine(&self) -> Option<&str> {
        self.selected_cuisine.as_deref()
    }

    /// Sets or clears the selected recipe; triggers no network activity
    pub fn select_recipe(&mut self, recipe: Option<Recipe>) {
        self.selected_recipe = recipe;
    }

    /// The currently selected recipe, if any
    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.selected_recipe.as_ref()
    }

    /// Timestamp of the last completed fetch
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    fn publish(&self, state: ViewState) {
        self.state_tx.send_replace(state);
    }
}

/// Maps a fetch failure to its fixed user-displayable message
fn user_message(error: &FetchError) -> &'static str {
    match error {
        FetchError::NoData => NETWORK_ERROR_MESSAGE,
        FetchError::DecodingError(_) => DECODING_ERROR_MESSAGE,
        FetchError::EmptyResponse | FetchError::InvalidEndpoint(_) => GENERIC_ERROR_MESSAGE,
    }
}
