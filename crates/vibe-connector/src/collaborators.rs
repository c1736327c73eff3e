//! External collaborators run after a request has been admitted.
//!
//! Each trait abstracts an outside service (caption model, meme
//! renderer, image hosting). The implementations here are the minimal
//! ones the binary ships with; real backends plug in behind the traits.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use vibe_protocol::Vibe;

use crate::config::{CaptionConfig, StorageConfig};

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("caption generation failed: {0}")]
    Caption(String),
    #[error("meme composition failed: {0}")]
    Compose(String),
    #[error("image upload failed: {0}")]
    Upload(String),
}

pub type CollaboratorFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, CollaboratorError>> + Send + 'a>>;

/// Produces a short caption for an image in the requested vibe.
pub trait Captioner: Send + Sync {
    fn generate<'a>(&'a self, image: &'a [u8], vibe: Vibe) -> CollaboratorFuture<'a, String>;
}

/// Renders caption text onto the base image.
pub trait Compositor: Send + Sync {
    fn compose(&self, image: &[u8], caption: &str) -> Result<Bytes, CollaboratorError>;
}

/// Stores a finished meme and returns its public URL.
pub trait ImageStore: Send + Sync {
    fn upload(&self, image: Bytes) -> CollaboratorFuture<'_, String>;
}

/// Meme captions are shown trimmed and upper-cased.
pub fn normalize_caption(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Captioner answering from a fixed per-vibe table.
pub struct CannedCaptioner {
    captions: CaptionConfig,
}

impl CannedCaptioner {
    pub fn new(captions: CaptionConfig) -> Self {
        Self { captions }
    }
}

impl Captioner for CannedCaptioner {
    fn generate<'a>(&'a self, _image: &'a [u8], vibe: Vibe) -> CollaboratorFuture<'a, String> {
        Box::pin(async move { Ok(self.captions.caption_for(vibe).to_string()) })
    }
}

/// Compositor that returns the base image untouched.
pub struct PassthroughCompositor;

impl Compositor for PassthroughCompositor {
    fn compose(&self, image: &[u8], _caption: &str) -> Result<Bytes, CollaboratorError> {
        if image.is_empty() {
            return Err(CollaboratorError::Compose("empty base image".into()));
        }
        Ok(Bytes::copy_from_slice(image))
    }
}

/// Writes memes into a local directory served under `public_base_url`.
pub struct LocalImageStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.meme_dir.clone(), storage.public_base_url.clone())
    }
}

impl ImageStore for LocalImageStore {
    fn upload(&self, image: Bytes) -> CollaboratorFuture<'_, String> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|e| CollaboratorError::Upload(format!("create {}: {e}", self.dir.display())))?;
            let file_name = format!("{}.jpg", uuid::Uuid::new_v4());
            let path = self.dir.join(&file_name);
            tokio::fs::write(&path, &image)
                .await
                .map_err(|e| CollaboratorError::Upload(format!("write {}: {e}", path.display())))?;
            tracing::debug!(path = %path.display(), bytes = image.len(), "meme stored");
            Ok(format!("{}/{}", self.public_base_url, file_name))
        })
    }
}
