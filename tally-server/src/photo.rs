use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("image encode failed: {0}")]
    Encode(String),
}

pub const DEFAULT_MAX_DIMENSION: u32 = 256;
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// Turn an uploaded raster image into the inline form stored on a
/// player record: decode, downsize so neither dimension exceeds
/// `max_dimension` while preserving aspect ratio (a no-op when already
/// within the bound), re-encode as JPEG at the fixed quality, and wrap
/// the bytes as a self-contained base64 data string.
pub fn ingest_photo(bytes: &[u8], max_dimension: u32, quality: u8) -> Result<String, PhotoError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| PhotoError::Decode(e.to_string()))?;

    let bounded = if decoded.width() <= max_dimension && decoded.height() <= max_dimension {
        decoded
    } else {
        // resize() fits the image inside the bounding box and keeps
        // the aspect ratio.
        decoded.resize(max_dimension, max_dimension, FilterType::Triangle)
    };

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    bounded
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| PhotoError::Encode(e.to_string()))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(buffer.into_inner());
    Ok(format!("data:image/jpeg;base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn decode_inline(inline: &str) -> DynamicImage {
        let encoded = inline
            .strip_prefix("data:image/jpeg;base64,")
            .expect("inline photos carry the jpeg data prefix");
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_oversized_image_is_bounded_preserving_aspect() {
        let inline =
            ingest_photo(&png_bytes(1024, 512), DEFAULT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY)
                .unwrap();

        let result = decode_inline(&inline);
        assert_eq!(result.width(), 256);
        assert_eq!(result.height(), 128);
    }

    #[test]
    fn test_portrait_image_bounds_on_height() {
        let inline =
            ingest_photo(&png_bytes(200, 800), DEFAULT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY)
                .unwrap();

        let result = decode_inline(&inline);
        assert_eq!(result.height(), 256);
        assert_eq!(result.width(), 64);
    }

    #[test]
    fn test_image_within_bound_keeps_its_dimensions() {
        let inline =
            ingest_photo(&png_bytes(100, 60), DEFAULT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY)
                .unwrap();

        let result = decode_inline(&inline);
        assert_eq!((result.width(), result.height()), (100, 60));
    }

    #[test]
    fn test_undecodable_bytes_fail_with_decode_error() {
        let result = ingest_photo(b"not an image", DEFAULT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY);
        assert!(matches!(result, Err(PhotoError::Decode(_))));
    }
}
