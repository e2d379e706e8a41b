//! Image decoding with a fast JPEG path.
//!
//! Slab photos come off the capture station as JPEGs, so those go through
//! zune-jpeg first; everything else (and any JPEG zune rejects) goes through
//! the image crate.

use crate::core::scanner::ImageFormat;
use crate::error::ImageError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Format-aware decoder
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image file
    pub fn decode(path: &Path) -> Result<DynamicImage, ImageError> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown);

        let image = match format {
            ImageFormat::Jpeg => Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))?,
            _ => Self::decode_fallback(path)?,
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(ImageError::EmptyImage {
                label: path.display().to_string(),
            });
        }
        Ok(image)
    }

    fn decode_jpeg(path: &Path) -> Result<DynamicImage, ImageError> {
        let bytes = fs::read(path).map_err(|e| ImageError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&bytes, options);

        let pixels = decoder.decode().map_err(|e| Self::decode_error(path, format!("{:?}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| Self::decode_error(path, "missing JPEG header info".to_string()))?;
        let (width, height) = (info.width as u32, info.height as u32);

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgb8),
            ColorSpace::RGBA => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgba8),
            ColorSpace::Luma => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, pixels)
                .map(DynamicImage::ImageLuma8),
            _ => return Self::decode_fallback(path),
        };

        image.ok_or_else(|| Self::decode_error(path, "pixel buffer size mismatch".to_string()))
    }

    fn decode_fallback(path: &Path) -> Result<DynamicImage, ImageError> {
        image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => ImageError::IoError {
                path: path.to_path_buf(),
                source,
            },
            other => Self::decode_error(path, other.to_string()),
        })
    }

    fn decode_error(path: &Path, reason: String) -> ImageError {
        ImageError::DecodeError {
            label: path.display().to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn decodes_png_written_by_image_crate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slab.png");
        let buffer = ImageBuffer::from_fn(8, 6, |x, _| Rgb([x as u8 * 10, 0, 0]));
        buffer.save(&path).unwrap();

        let image = FastDecoder::decode(&path).unwrap();
        assert_eq!((image.width(), image.height()), (8, 6));
    }

    #[test]
    fn decodes_jpeg_through_fast_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slab.jpg");
        let buffer = ImageBuffer::from_fn(16, 16, |_, y| Rgb([0, y as u8 * 8, 0]));
        buffer.save(&path).unwrap();

        let image = FastDecoder::decode(&path).unwrap();
        assert_eq!((image.width(), image.height()), (16, 16));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"this is not a valid image file").unwrap();

        let error = FastDecoder::decode(&path).unwrap_err();
        assert!(matches!(error, ImageError::DecodeError { .. }));
        assert!(error.to_string().contains("broken.jpg"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = FastDecoder::decode(Path::new("/no/such/slab.png")).unwrap_err();
        assert!(matches!(error, ImageError::IoError { .. }));
    }
}
