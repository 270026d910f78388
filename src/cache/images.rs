//! Two-tier image cache
//!
//! Maps an image URL to decoded image bytes through an in-memory tier and
//! an on-disk tier, downloading on a full miss and populating both tiers
//! with the re-encoded bytes. Every failure collapses to "absent" for the
//! caller; the underlying cause is logged, never propagated.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use directories::ProjectDirs;
use image::{DynamicImage, ImageFormat};
use moka::future::Cache;
use reqwest::Client;
use url::Url;

/// Upper bound on the memory tier, in bytes
///
/// Entries are weighed by their byte length, so the tier sheds least
/// recently used images once the bound is reached.
const MEMORY_CAPACITY_BYTES: u64 = 64 * 1024 * 1024;

/// Subdirectory of the platform cache directory holding image files
const IMAGE_DIR: &str = "images";

/// Transport used to download image bytes
///
/// Production code uses [`HttpImageTransport`]; tests substitute doubles
/// that count calls or fail on demand.
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Downloads the raw bytes behind the URL with a single GET
    async fn download(&self, url: &Url) -> anyhow::Result<Vec<u8>>;
}

/// HTTP transport for image downloads
#[derive(Debug, Clone)]
pub struct HttpImageTransport {
    client: Client,
}

impl Default for HttpImageTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpImageTransport {
    /// Creates a transport with its own HTTP client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a transport sharing an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageTransport for HttpImageTransport {
    async fn download(&self, url: &Url) -> anyhow::Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Two-tier cache mapping image URLs to image bytes
///
/// One instance is shared by reference for the process lifetime. The memory
/// tier is a bounded concurrent map cleared on restart; the disk tier lives
/// under the platform cache directory and survives restarts until an
/// explicit [`clear`](ImageCache::clear).
pub struct ImageCache {
    transport: Arc<dyn ImageTransport>,
    memory: Cache<String, Vec<u8>>,
    disk_dir: PathBuf,
}

impl ImageCache {
    /// Creates a cache rooted at the platform cache directory
    ///
    /// Falls back to a subdirectory of the system temp directory when the
    /// platform cache directory cannot be determined; the fallback is
    /// logged and non-fatal. The directory itself is created lazily on
    /// first write.
    pub fn new(transport: Arc<dyn ImageTransport>) -> Self {
        let disk_dir = match ProjectDirs::from("", "", "mealfeed") {
            Some(project_dirs) => project_dirs.cache_dir().join(IMAGE_DIR),
            None => {
                let fallback = std::env::temp_dir().join("mealfeed").join(IMAGE_DIR);
                tracing::warn!(
                    dir = %fallback.display(),
                    "platform cache directory unavailable, using temp directory"
                );
                fallback
            }
        };
        Self::with_dir(transport, disk_dir)
    }

    /// Creates a cache with a custom disk directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(transport: Arc<dyn ImageTransport>, disk_dir: PathBuf) -> Self {
        let memory = Cache::builder()
            .max_capacity(MEMORY_CAPACITY_BYTES)
            .weigher(|_key: &String, value: &Vec<u8>| {
                value.len().try_into().unwrap_or(u32::MAX)
            })
            .build();

        Self {
            transport,
            memory,
            disk_dir,
        }
    }

    /// Looks up the image for a URL, downloading on a full miss
    ///
    /// Lookup order: memory tier, disk tier (populating memory on a hit),
    /// then a single GET through the transport. A fresh download is decoded,
    /// re-encoded, and written through to both tiers. A malformed URL, a
    /// failed download, or bytes that do not decode as a supported image all
    /// yield `None`.
    pub async fn get_image(&self, url: &str) -> Option<Vec<u8>> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(url, error = %err, "image URL is malformed");
                return None;
            }
        };
        let key = match cache_file_name(&parsed) {
            Some(key) => key,
            None => {
                tracing::warn!(url, "image URL has no host");
                return None;
            }
        };

        if let Some(bytes) = self.memory.get(&key).await {
            return Some(bytes);
        }

        let path = self.disk_dir.join(&key);
        if let Ok(bytes) = tokio::fs::read(&path).await {
            self.memory.insert(key, bytes.clone()).await;
            return Some(bytes);
        }

        self.download_into_tiers(&parsed, key).await
    }

    /// Inserts or overwrites the memory-tier entry for a URL
    ///
    /// Does not touch the disk tier. A malformed URL is ignored.
    pub async fn add_image(&self, url: &str, bytes: Vec<u8>) {
        let Some(key) = Url::parse(url).ok().as_ref().and_then(cache_file_name) else {
            tracing::warn!(url, "ignoring malformed image URL");
            return;
        };
        self.memory.insert(key, bytes).await;
    }

    /// Returns whether the memory tier holds an entry for the URL
    ///
    /// Does not probe the disk tier.
    pub fn is_cached(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .as_ref()
            .and_then(cache_file_name)
            .map(|key| self.memory.contains_key(&key))
            .unwrap_or(false)
    }

    /// Removes all memory entries and deletes every file in the disk tier
    ///
    /// Failures deleting individual files are logged and do not abort the
    /// clear of the remaining files.
    pub async fn clear(&self) {
        self.memory.invalidate_all();

        let mut entries = match tokio::fs::read_dir(&self.disk_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
            Err(err) => {
                tracing::warn!(dir = %self.disk_dir.display(), error = %err, "failed to list disk cache");
                return;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Err(err) = tokio::fs::remove_file(entry.path()).await {
                        tracing::warn!(
                            path = %entry.path().display(),
                            error = %err,
                            "failed to remove cached image"
                        );
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(dir = %self.disk_dir.display(), error = %err, "failed to walk disk cache");
                    break;
                }
            }
        }
    }

    /// Downloads, re-encodes, and writes through to both tiers
    // TODO: deduplicate concurrent downloads for the same key; two in-flight
    // get_image calls for one URL currently both hit the network.
    async fn download_into_tiers(&self, url: &Url, key: String) -> Option<Vec<u8>> {
        let raw = match self.transport.download(url).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(%url, error = %err, "image download failed");
                return None;
            }
        };

        let encoded = match reencode(&raw, &key) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(%url, error = %err, "downloaded bytes are not a supported image");
                return None;
            }
        };

        self.memory.insert(key.clone(), encoded.clone()).await;
        self.write_to_disk(&key, &encoded).await;
        Some(encoded)
    }

    /// Persists bytes to the disk tier; failures are logged, not returned
    async fn write_to_disk(&self, file_name: &str, bytes: &[u8]) {
        if let Err(err) = self.try_write_to_disk(file_name, bytes).await {
            tracing::warn!(file = file_name, error = %err, "failed to persist image to disk cache");
        }
    }

    /// Atomic-replace write: temp file then rename, so a concurrent reader
    /// never observes a partial file
    async fn try_write_to_disk(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.disk_dir).await?;
        let tmp_path = self.disk_dir.join(format!("{file_name}.part"));
        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, self.disk_dir.join(file_name)).await
    }
}

/// Derives the cache key and disk file name for an image URL
///
/// The scheme and query string are stripped, `/` and `:` are replaced with
/// `_`, and the path extension is preserved, defaulting to `.jpg` when the
/// path has none. Two URLs differing only by query string therefore share
/// one entry, a deliberate and documented limitation. Returns `None` for URLs
/// without a host.
fn cache_file_name(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();

    let token = format!("{host}{port}{}", url.path());
    let file_name = token.replace(['/', ':'], "_");

    if Path::new(url.path()).extension().is_some() {
        Some(file_name)
    } else {
        Some(format!("{file_name}.jpg"))
    }
}

/// Decodes raw bytes and re-encodes them for the given file name
///
/// PNG entries stay PNG; everything else is stored as JPEG. The re-encoded
/// bytes are the cache value in both tiers, so repeated lookups return
/// byte-identical data regardless of which tier serves them.
fn reencode(raw: &[u8], file_name: &str) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(raw)?;
    let format = match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some("png") => ImageFormat::Png,
        _ => ImageFormat::Jpeg,
    };

    let mut buf = Cursor::new(Vec::new());
    match format {
        // The JPEG encoder rejects alpha channels
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(decoded.to_rgb8()).write_to(&mut buf, format)?
        }
        _ => decoded.write_to(&mut buf, format)?,
    }
    Ok(buf.into_inner())
}
