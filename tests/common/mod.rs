#![allow(dead_code)]

use std::{sync::Mutex, time::Duration};

use image::{DynamicImage, RgbImage};
use sporlcover::cover::{CoverError, ImageCodec, JpegCodec, Quality};

pub const KB: usize = 1024;

/// Codec whose output size is looked up per quality level.
pub struct TableCodec {
    sizes: Vec<usize>,
    pub calls: Mutex<Vec<u8>>,
}

impl TableCodec {
    /// `sizes[q - 1]` is the output length at quality `q`.
    pub fn new(sizes: Vec<usize>) -> Self {
        assert_eq!(sizes.len(), 95);
        Self {
            sizes,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Output of exactly `q` kilobytes at quality `q`.
    pub fn kb_per_quality() -> Self {
        Self::new((1..=95).map(|q| q * KB).collect())
    }

    pub fn calls(&self) -> Vec<u8> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageCodec for TableCodec {
    fn decode(&self, _bytes: &[u8]) -> Result<DynamicImage, CoverError> {
        Ok(DynamicImage::new_rgb8(1, 1))
    }

    fn encode(&self, _image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CoverError> {
        self.calls.lock().unwrap().push(quality.value());
        Ok(vec![0u8; self.sizes[quality.value() as usize - 1]])
    }
}

/// [`TableCodec`] that blocks its thread for `delay` on every encode.
pub struct SlowCodec {
    pub inner: TableCodec,
    pub delay: Duration,
}

impl SlowCodec {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: TableCodec::kb_per_quality(),
            delay,
        }
    }

    pub fn calls(&self) -> Vec<u8> {
        self.inner.calls()
    }
}

impl ImageCodec for SlowCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CoverError> {
        self.inner.decode(bytes)
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CoverError> {
        std::thread::sleep(self.delay);
        self.inner.encode(image, quality)
    }
}

/// Real JPEG codec recording the quality levels it was asked for.
#[derive(Default)]
pub struct CountingJpeg {
    pub calls: Mutex<Vec<u8>>,
}

impl CountingJpeg {
    pub fn calls(&self) -> Vec<u8> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageCodec for CountingJpeg {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CoverError> {
        JpegCodec.decode(bytes)
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CoverError> {
        self.calls.lock().unwrap().push(quality.value());
        JpegCodec.encode(image, quality)
    }
}

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            128,
        ])
    }))
}

/// Deterministic high-entropy image, expensive to compress.
pub fn noise_image(width: u32, height: u32) -> DynamicImage {
    let mut state: u32 = 0x2545_F491;
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    }))
}

/// Serves `router` on an ephemeral local port and returns its base URL.
///
/// The router is built from the base URL so handlers can hand out absolute
/// links (e.g. pagination `next` fields).
pub async fn spawn_mock<F>(router: F) -> String
where
    F: FnOnce(String) -> axum::Router,
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = router(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}
