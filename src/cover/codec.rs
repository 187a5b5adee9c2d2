//! Decode/encode capability consumed by the budgeted encoder.

use std::{borrow::Cow, io::Cursor};

use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbImage,
    codecs::jpeg::JpegEncoder,
};

use super::CoverError;

/// JPEG quality control value, always inside `Quality::MIN..=Quality::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(1);
    pub const MAX: Quality = Quality(95);

    pub fn new(value: u8) -> Option<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Some(Quality(value))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Next lower quality level, `None` once the floor is reached.
    pub fn lower(self) -> Option<Self> {
        Self::new(self.0.checked_sub(1)?)
    }
}

/// Raster decode and lossy encode used by [`BudgetedEncoder`](super::BudgetedEncoder).
pub trait ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CoverError>;

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CoverError>;
}

/// [`ImageCodec`] backed by the `image` crate's JPEG encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CoverError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CoverError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| CoverError::Decode(e.to_string()))
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CoverError> {
        // JPEG has no alpha channel
        let rgb: Cow<'_, RgbImage> = match image {
            DynamicImage::ImageRgb8(buffer) => Cow::Borrowed(buffer),
            other => Cow::Owned(other.to_rgb8()),
        };

        let mut buffer = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buffer, quality.value())
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CoverError::Encode(e.to_string()))?;

        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn test_quality_bounds() {
        assert_eq!(Quality::new(0), None);
        assert_eq!(Quality::new(96), None);
        assert_eq!(Quality::new(1), Some(Quality::MIN));
        assert_eq!(Quality::new(95), Some(Quality::MAX));
    }

    #[test]
    fn test_quality_lower_stops_at_floor() {
        assert_eq!(Quality::MAX.lower().map(Quality::value), Some(94));
        assert_eq!(Quality::MIN.lower(), None);
    }

    #[test]
    fn test_encode_produces_jpeg_markers() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, image::Rgb([200, 10, 10])));
        let bytes = JpegCodec.encode(&image, Quality::MAX).unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_flattens_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 255, 128])));
        assert!(JpegCodec.encode(&image, Quality::MAX).is_ok());
    }

    #[test]
    fn test_decode_png_roundtrip_dimensions() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(24, 12, image::Rgb([1, 2, 3])));
        let mut png = Cursor::new(Vec::new());
        source.write_to(&mut png, ImageFormat::Png).unwrap();

        let decoded = JpegCodec.decode(png.get_ref()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (24, 12));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result = JpegCodec.decode(b"definitely not an image");
        assert!(matches!(result, Err(CoverError::Decode(_))));
    }
}
