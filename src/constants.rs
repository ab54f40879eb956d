//! Shared constants/setters for things
//!

use std::path::PathBuf;
use std::sync::LazyLock;

/// The default place finished panels are written
pub static IMAGE_DIR: LazyLock<PathBuf> = LazyLock::new(|| PathBuf::from("./images"));

/// URL prefix stored panels are served under
pub const IMAGE_ROUTE: &str = "/images";

/// Number of panels in one comic, and the most a batch request may carry.
pub const PANELS_PER_COMIC: usize = 12;

/// Uploads smaller than this are rejected before decoding.
pub const MIN_UPLOAD_BYTES: usize = 1000;

/// Largest request body accepted on the render endpoints.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Timeout (in seconds) for fetching a source panel image.
pub const FETCH_TIMEOUT_SECONDS: u64 = 30;

/// Largest source image body accepted from a fetch.
pub const MAX_FETCH_BYTES: usize = 32 * 1024 * 1024;

#[cfg(test)]
/// Public base URL used in tests
pub const TEST_BASE_URL: &str = "http://comics.example.org";
