//! Background texture acquisition.
//!
//! Fetching and decoding happen on worker threads; the render loop collects
//! finished results with [`TextureLoader::drain_results`] once per frame and never
//! waits on a load.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::texture::{DecodedTexture, TextureSlot};

/// Largest edge a decoded image may have before it is downscaled.
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a texture could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum TextureLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported texture location {0:?}")]
    UnsupportedLocation(String),
}

/// Where a texture comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureLocation {
    Http(String),
    File(PathBuf),
}

impl TextureLocation {
    /// Classify a configured location. Anything with a scheme other than
    /// `http`/`https`/`file` is rejected.
    pub fn parse(location: &str) -> Result<Self, TextureLoadError> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(TextureLoadError::UnsupportedLocation(location.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(TextureLocation::Http(trimmed.to_string()));
        }
        if let Some(path) = trimmed.strip_prefix("file://") {
            return Ok(TextureLocation::File(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = trimmed.split_once("://")
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
        {
            return Err(TextureLoadError::UnsupportedLocation(location.to_string()));
        }
        Ok(TextureLocation::File(PathBuf::from(trimmed)))
    }
}

/// Read the raw bytes behind a location.
pub fn fetch_bytes(location: &TextureLocation) -> Result<Vec<u8>, TextureLoadError> {
    match location {
        TextureLocation::File(path) => std::fs::read(path).map_err(|source| TextureLoadError::Io {
            path: path.clone(),
            source,
        }),
        TextureLocation::Http(url) => {
            let http_err = |source| TextureLoadError::Http {
                url: url.clone(),
                source,
            };
            let client = reqwest::blocking::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(http_err)?;
            let response = client.get(url).send().map_err(http_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(TextureLoadError::Status {
                    url: url.clone(),
                    status,
                });
            }
            Ok(response.bytes().map_err(http_err)?.to_vec())
        }
    }
}

/// Decode an encoded image into RGBA8, shrinking it so neither edge exceeds `max_dimension`.
pub fn decode_image(bytes: &[u8], max_dimension: u32) -> Result<DecodedTexture, TextureLoadError> {
    let mut image = image::load_from_memory(bytes)?;
    if image.width() > max_dimension || image.height() > max_dimension {
        tracing::debug!(
            "Downscaling {}x{} image to fit {max_dimension}",
            image.width(),
            image.height()
        );
        image = image.resize(
            max_dimension,
            max_dimension,
            image::imageops::FilterType::Triangle,
        );
    }
    let rgba = image.to_rgba8();
    Ok(DecodedTexture {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Fetch and decode one location.
pub fn load_texture(location: &str, max_dimension: u32) -> Result<DecodedTexture, TextureLoadError> {
    let location = TextureLocation::parse(location)?;
    let bytes = fetch_bytes(&location)?;
    decode_image(&bytes, max_dimension)
}

/// One texture to acquire.
#[derive(Clone, Debug)]
pub struct TextureRequest {
    pub slot: TextureSlot,
    pub location: String,
}

/// A finished acquisition, successful or not.
#[derive(Debug)]
pub struct TextureLoadResult {
    pub slot: TextureSlot,
    pub location: String,
    pub result: Result<DecodedTexture, TextureLoadError>,
}

/// Worker pool that turns [`TextureRequest`]s into [`TextureLoadResult`]s.
pub struct TextureLoader {
    request_sender: Option<crossbeam_channel::Sender<TextureRequest>>,
    result_receiver: crossbeam_channel::Receiver<TextureLoadResult>,
    cancelled: Arc<AtomicBool>,
    worker_count: usize,
}

impl TextureLoader {
    /// Spawn `worker_count` loader threads (at least one).
    pub fn new(worker_count: usize, max_dimension: u32) -> Self {
        let worker_count = worker_count.max(1);
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<TextureRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));

        for index in 0..worker_count {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let cancelled = Arc::clone(&cancelled);

            let spawned = std::thread::Builder::new()
                .name(format!("terra-texture-{index}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        if cancelled.load(Ordering::Acquire) {
                            break;
                        }
                        let result = load_texture(&request.location, max_dimension);
                        if cancelled.load(Ordering::Acquire) {
                            break;
                        }
                        let _ = tx.send(TextureLoadResult {
                            slot: request.slot,
                            location: request.location,
                            result,
                        });
                    }
                });
            if let Err(err) = spawned {
                tracing::warn!("Failed to spawn texture worker {index}: {err}");
            }
        }

        Self {
            request_sender: Some(request_tx),
            result_receiver: result_rx,
            cancelled,
            worker_count,
        }
    }

    /// Queue a request. Returns `false` after shutdown.
    pub fn submit(&self, request: TextureRequest) -> bool {
        match &self.request_sender {
            Some(sender) => sender.send(request).is_ok(),
            None => false,
        }
    }

    /// Collect every result that has finished since the last call.
    pub fn drain_results(&self) -> Vec<TextureLoadResult> {
        self.result_receiver.try_iter().collect()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_shut_down(&self) -> bool {
        self.request_sender.is_none()
    }

    /// Stop accepting work and tell workers to discard whatever they finish.
    ///
    /// Does not join: a worker blocked on a slow download exits once the request
    /// returns, and its result is dropped.
    pub fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.request_sender.take();
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
