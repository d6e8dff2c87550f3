use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

/// Subdirectory of the images path that holds recipe uploads.
const RECIPE_DIR: &str = "recipe";

/// Image formats accepted for upload, detected from content rather than
/// the client-supplied filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Writes uploaded images to disk and hands back a reference relative to
/// the images directory, e.g. `recipe/<uuid>.jpg`.
pub struct ImageService {
    images_path: PathBuf,
}

impl ImageService {
    #[must_use]
    pub fn new(images_path: impl Into<PathBuf>) -> Self {
        Self {
            images_path: images_path.into(),
        }
    }

    pub async fn save_recipe_image(&self, format: ImageFormat, bytes: &[u8]) -> Result<String> {
        let dir = self.images_path.join(RECIPE_DIR);
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let filename = format!("{}.{}", Uuid::new_v4(), format.extension());
        let file_path = dir.join(&filename);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(path = %file_path.display(), size = bytes.len(), "Stored recipe image");

        Ok(format!("{RECIPE_DIR}/{filename}"))
    }

    /// Best effort; a missing file is not an error.
    pub async fn remove(&self, reference: &str) {
        if reference.contains("..") {
            return;
        }
        let path = self.images_path.join(reference);
        if let Err(e) = fs::remove_file(&path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), "Failed to remove old image: {e}");
        }
    }
}
