//! Local storage for finished panels.

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::constants::IMAGE_ROUTE;
use crate::error::ComicError;

/// Writes rendered panels to a directory served under [`IMAGE_ROUTE`].
#[derive(Clone, Debug)]
pub struct PanelStorage {
    image_dir: PathBuf,
    public_base_url: String,
}

impl PanelStorage {
    /// Storage rooted at `image_dir`, linking through `public_base_url`.
    pub fn new(image_dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            image_dir: image_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory panels are written to.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Public URL of a stored file name.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}{}/{}", self.public_base_url, IMAGE_ROUTE, file_name)
    }

    /// Stores `png` under a fresh name and returns its public URL.
    pub async fn store(&self, png: &[u8]) -> Result<String, ComicError> {
        let file_name = format!("panel-{}.png", Uuid::new_v4());
        self.write(&file_name, png).await?;
        Ok(self.public_url(&file_name))
    }

    /// Path inside the image directory for a caller-chosen file name.
    ///
    /// Only bare `.png` file names are allowed, so callers cannot write
    /// outside the image directory.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf, ComicError> {
        let candidate = Path::new(file_name);
        let is_bare = candidate.file_name().map(|name| name == candidate.as_os_str()) == Some(true);
        let is_png = candidate
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if !is_bare || !is_png || file_name.starts_with('.') {
            return Err(ComicError::BadRequest(format!(
                "output path must be a bare .png file name, got {file_name:?}"
            )));
        }
        Ok(self.image_dir.join(candidate))
    }

    /// Makes sure the image directory exists.
    pub async fn ensure_dir(&self) -> Result<(), ComicError> {
        tokio::fs::create_dir_all(&self.image_dir)
            .await
            .map_err(|err| {
                ComicError::Persist(format!(
                    "failed to create {}: {err}",
                    self.image_dir.display()
                ))
            })
    }

    async fn write(&self, file_name: &str, png: &[u8]) -> Result<(), ComicError> {
        self.ensure_dir().await?;
        let path = self.image_dir.join(file_name);
        tokio::fs::write(&path, png).await.map_err(|err| {
            ComicError::Persist(format!("failed to write {}: {err}", path.display()))
        })?;
        info!("Stored panel {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = PanelStorage::new(dir.path().join("images"), "https://comics.example.org/");
        let url = storage.store(b"png bytes").await.expect("store");

        let file_name = url
            .strip_prefix("https://comics.example.org/images/")
            .expect("url prefix");
        assert!(file_name.starts_with("panel-") && file_name.ends_with(".png"));
        let written = std::fs::read(dir.path().join("images").join(file_name)).expect("read back");
        assert_eq!(written, b"png bytes");
    }

    #[test]
    fn resolve_rejects_traversal() {
        let storage = PanelStorage::new("/srv/images", "http://localhost");
        assert_eq!(
            storage.resolve("panel_1_with_text.png").expect("bare name"),
            PathBuf::from("/srv/images/panel_1_with_text.png")
        );
        for bad in [
            "../escape.png",
            "nested/panel.png",
            "/etc/panel.png",
            "panel.jpg",
            ".png",
            "",
        ] {
            assert!(storage.resolve(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
