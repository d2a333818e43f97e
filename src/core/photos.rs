//! Photo attachments: downscale and re-encode before they join the lead.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::domain::PhotoAttachment;
use crate::errors::Result;

const JPEG_MIME: &str = "image/jpeg";
const FALLBACK_MIME: &str = "application/octet-stream";

/// Compression targets for attached photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSettings {
    pub max_width: u32,
    pub quality: u8,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            max_width: 1280,
            quality: 70,
        }
    }
}

/// Decodes an image, shrinks it to `max_width` keeping the aspect ratio, and
/// re-encodes it as JPEG.
pub fn compress_image(bytes: &[u8], settings: PhotoSettings) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = if decoded.width() > settings.max_width {
        let height = u64::from(decoded.height()) * u64::from(settings.max_width)
            / u64::from(decoded.width());
        let height = u32::try_from(height).unwrap_or(u32::MAX).max(1);
        decoded.resize_exact(settings.max_width, height, FilterType::Triangle)
    } else {
        decoded
    };

    let rgb = resized.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, settings.quality.clamp(1, 100));
    encoder.encode_image(&rgb)?;
    Ok(out.into_inner())
}

/// Builds an attachment, preferring the compressed form and falling back to
/// the original bytes when compression fails.
pub fn prepare_photo(file_name: &str, bytes: Vec<u8>, settings: PhotoSettings) -> PhotoAttachment {
    match compress_image(&bytes, settings) {
        Ok(compressed) => {
            tracing::debug!(
                file = file_name,
                original = bytes.len(),
                compressed = compressed.len(),
                "photo compressed"
            );
            PhotoAttachment::new(file_name, JPEG_MIME, compressed)
        }
        Err(err) => {
            tracing::warn!(file = file_name, error = %err, "compression failed, keeping original photo");
            let mime = guess_mime(&bytes);
            PhotoAttachment::new(file_name, mime, bytes)
        }
    }
}

/// Reads a photo from disk and prepares it. Only the read itself can fail.
pub fn load_photo(path: &Path, settings: PhotoSettings) -> Result<PhotoAttachment> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo")
        .to_string();
    Ok(prepare_photo(&file_name, bytes, settings))
}

fn guess_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}
