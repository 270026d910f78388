//! Mealfeed - browse a remote recipe feed from the terminal
//!
//! A thin shell over the library: one fetch per run, the resulting list
//! printed as plain text, with optional thumbnail prefetching through the
//! shared image cache.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mealfeed::cache::{HttpImageTransport, ImageCache};
use mealfeed::cli::{Cli, StartupConfig};
use mealfeed::data::RecipeClient;
use mealfeed::store::{RecipeStore, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;

    // One HTTP client and one cache instance shared for the process lifetime
    let http = reqwest::Client::new();
    let image_cache = Arc::new(ImageCache::new(Arc::new(HttpImageTransport::with_client(
        http.clone(),
    ))));

    if config.clear_cache {
        image_cache.clear().await;
        println!("Image cache cleared.");
        return Ok(());
    }

    let source = Arc::new(RecipeClient::with_client(http));
    let mut store = RecipeStore::new(source).with_endpoint(config.endpoint);
    store.set_cuisine(config.cuisine);

    store.fetch_recipes().await;

    match store.state() {
        ViewState::Loaded(_) => {
            render_list(&store);
            if config.fetch_thumbnails {
                prefetch_thumbnails(&store, &image_cache).await;
            }
            Ok(())
        }
        ViewState::Empty => {
            println!("The feed has no recipes right now.");
            Ok(())
        }
        ViewState::Error(message) => anyhow::bail!(message),
        // fetch_recipes always settles before returning
        ViewState::Loading => Ok(()),
    }
}

/// Prints the filtered recipe list and the available cuisines
fn render_list(store: &RecipeStore) {
    let filtered = store.filtered_recipes();

    match store.selected_cuisine() {
        Some(cuisine) => println!("{} {} recipes:", filtered.len(), cuisine),
        None => println!("{} recipes:", filtered.len()),
    }
    for recipe in &filtered {
        println!("  {:<40} [{}]", recipe.name, recipe.cuisine);
    }

    println!();
    println!("Cuisines: {}", store.cuisines().join(", "));
    if let Some(at) = store.last_refresh() {
        println!("Fetched at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// Warms the image cache with every listed recipe's thumbnail
async fn prefetch_thumbnails(store: &RecipeStore, image_cache: &ImageCache) {
    let urls: Vec<String> = store
        .filtered_recipes()
        .iter()
        .filter_map(|recipe| recipe.photo_url_small.clone())
        .collect();
    let total = urls.len();

    let lookups = urls.iter().map(|url| image_cache.get_image(url));
    let resolved = futures::future::join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .count();

    println!("Cached {resolved} of {total} thumbnails.");
}
