use std::sync::atomic::{AtomicBool, Ordering};

use image::DynamicImage;

use super::{CoverError, ImageCodec, Quality};

/// Encoded bytes together with the quality level that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub quality: Quality,
}

impl EncodedArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    /// Whether the artifact is at or below `ceiling_kb` kilobytes.
    pub fn fits(&self, ceiling_kb: u32) -> bool {
        self.bytes.len() as u64 <= u64::from(ceiling_kb) * 1024
    }
}

/// Re-encodes a raster until it fits a size ceiling.
///
/// Starts at [`Quality::MAX`] and steps down one level at a time. The first
/// encoding at or below the ceiling is returned, so for a fixed codec and
/// source a tighter ceiling never yields a higher quality.
#[derive(Debug, Clone, Default)]
pub struct BudgetedEncoder<C> {
    codec: C,
}

impl<C: ImageCodec> BudgetedEncoder<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Encode `source` so that the result is at most `ceiling_kb` kilobytes.
    ///
    /// # Errors
    ///
    /// - [`CoverError::InvalidCeiling`] for a zero ceiling
    /// - [`CoverError::BudgetUnreachable`] when even [`Quality::MIN`] is too large
    /// - [`CoverError::Encode`] when the codec fails
    pub fn encode_to_budget(
        &self,
        source: &DynamicImage,
        ceiling_kb: u32,
    ) -> Result<EncodedArtifact, CoverError> {
        self.encode_to_budget_until(source, ceiling_kb, &AtomicBool::new(false))
    }

    /// Same as [`encode_to_budget`](Self::encode_to_budget), but gives up
    /// with [`CoverError::Cancelled`] once `cancelled` is set. The flag is
    /// checked before every quality level.
    pub fn encode_to_budget_until(
        &self,
        source: &DynamicImage,
        ceiling_kb: u32,
        cancelled: &AtomicBool,
    ) -> Result<EncodedArtifact, CoverError> {
        if ceiling_kb == 0 {
            return Err(CoverError::InvalidCeiling { ceiling_kb });
        }

        let mut quality = Quality::MAX;
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err(CoverError::Cancelled);
            }
            let artifact = EncodedArtifact {
                bytes: self.codec.encode(source, quality)?,
                quality,
            };
            if artifact.fits(ceiling_kb) {
                return Ok(artifact);
            }

            match quality.lower() {
                Some(next) => quality = next,
                None => {
                    return Err(CoverError::BudgetUnreachable {
                        ceiling_kb,
                        smallest_bytes: artifact.len(),
                    });
                }
            }
        }
    }

    /// Decode raw image bytes and encode them to the ceiling.
    pub fn encode_bytes_to_budget(
        &self,
        source: &[u8],
        ceiling_kb: u32,
    ) -> Result<EncodedArtifact, CoverError> {
        let image = self.codec.decode(source)?;
        self.encode_to_budget(&image, ceiling_kb)
    }
}
