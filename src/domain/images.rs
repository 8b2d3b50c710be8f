//! Image hosting conventions.
//!
//! Hosted images are transformed on the fly by inserting directives after
//! the `/upload/` path segment of their delivery URL.

use std::path::Path;

const HOST_MARKER: &str = "cloudinary.com";
const UPLOAD_SEGMENT: &str = "/upload/";

pub const THUMBNAIL_WIDTH: u32 = 400;
pub const THUMBNAIL_HEIGHT: u32 = 300;

/// Largest accepted upload, 10 MB.
pub const MAX_UPLOAD_BYTES: u64 = 10_000_000;

pub const ALLOWED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn with_directives(url: &str, directives: &str) -> String {
    if !url.contains(HOST_MARKER) {
        return url.to_string();
    }
    url.replacen(UPLOAD_SEGMENT, &format!("{UPLOAD_SEGMENT}{directives}/"), 1)
}

/// Cropped thumbnail of the given size. URLs from other hosts pass through.
pub fn thumbnail_url(url: &str, width: u32, height: u32) -> String {
    with_directives(url, &format!("c_fill,w_{width},h_{height},q_auto,f_auto"))
}

/// [`thumbnail_url`] with the card dimensions used by the gallery.
pub fn default_thumbnail_url(url: &str) -> String {
    thumbnail_url(url, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT)
}

/// Full-size image with automatic quality and format.
pub fn optimized_url(url: &str) -> String {
    with_directives(url, "q_auto,f_auto")
}

/// Lowercased extension of `path` if it is an accepted image format.
pub fn allowed_format(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_FORMATS.contains(&ext.as_str()).then_some(ext)
}
