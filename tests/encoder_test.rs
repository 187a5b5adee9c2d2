mod common;

use std::{
    io::Cursor,
    sync::atomic::{AtomicBool, Ordering},
};

use common::{CountingJpeg, KB, TableCodec, gradient_image, noise_image};
use image::{DynamicImage, ImageFormat};
use proptest::prelude::*;
use sporlcover::cover::{BudgetedEncoder, CoverError, ImageCodec, JpegCodec, Quality};

#[test]
fn test_artifact_equal_to_ceiling_is_accepted() {
    let encoder = BudgetedEncoder::new(TableCodec::kb_per_quality());
    let artifact = encoder
        .encode_to_budget(&DynamicImage::new_rgb8(1, 1), 50)
        .unwrap();

    assert_eq!(artifact.quality.value(), 50);
    assert_eq!(artifact.len(), 50 * KB);
    assert_eq!(artifact.size_kb(), 50.0);
    assert!(artifact.fits(50));
}

#[test]
fn test_quality_steps_down_one_level_at_a_time() {
    let encoder = BudgetedEncoder::new(TableCodec::kb_per_quality());
    encoder
        .encode_to_budget(&DynamicImage::new_rgb8(1, 1), 90)
        .unwrap();

    assert_eq!(encoder.codec().calls(), vec![95, 94, 93, 92, 91, 90]);
}

#[test]
fn test_small_image_under_generous_ceiling_keeps_top_quality() {
    let encoder = BudgetedEncoder::new(CountingJpeg::default());
    let source = gradient_image(64, 64);

    let artifact = encoder.encode_to_budget(&source, 500).unwrap();

    assert_eq!(artifact.quality, Quality::MAX);
    assert_eq!(encoder.codec().calls(), vec![95]);
    assert!(artifact.len() < 10 * KB);
}

#[test]
fn test_unreachable_budget_stops_at_floor() {
    // 10 KB even at the lowest quality
    let sizes = (1..=95).map(|q| 10 * KB + q * 100).collect();
    let encoder = BudgetedEncoder::new(TableCodec::new(sizes));

    let result = encoder.encode_to_budget(&DynamicImage::new_rgb8(1, 1), 5);

    match result {
        Err(CoverError::BudgetUnreachable {
            ceiling_kb,
            smallest_bytes,
        }) => {
            assert_eq!(ceiling_kb, 5);
            assert_eq!(smallest_bytes, 10 * KB + 100);
        }
        other => panic!("expected BudgetUnreachable, got {:?}", other),
    }

    let calls = encoder.codec().calls();
    assert_eq!(calls.len(), 95);
    assert_eq!(calls.last(), Some(&1));
    assert!(calls.iter().all(|q| (1..=95).contains(q)));
}

#[test]
fn test_zero_ceiling_is_rejected_without_encoding() {
    let encoder = BudgetedEncoder::new(TableCodec::kb_per_quality());
    let result = encoder.encode_to_budget(&DynamicImage::new_rgb8(1, 1), 0);

    assert!(matches!(result, Err(CoverError::InvalidCeiling { ceiling_kb: 0 })));
    assert!(encoder.codec().calls().is_empty());
}

#[test]
fn test_cancelled_encode_stops_before_next_level() {
    let encoder = BudgetedEncoder::new(TableCodec::kb_per_quality());
    let cancelled = AtomicBool::new(true);

    let result = encoder.encode_to_budget_until(&DynamicImage::new_rgb8(1, 1), 50, &cancelled);

    assert!(matches!(result, Err(CoverError::Cancelled)));
    assert!(encoder.codec().calls().is_empty());

    cancelled.store(false, Ordering::Relaxed);
    let artifact = encoder
        .encode_to_budget_until(&DynamicImage::new_rgb8(1, 1), 50, &cancelled)
        .unwrap();
    assert_eq!(artifact.quality.value(), 50);
}

#[test]
fn test_real_jpeg_meets_tight_ceiling() {
    let source = noise_image(128, 128);
    let top = JpegCodec.encode(&source, Quality::MAX).unwrap().len();
    let bottom = JpegCodec.encode(&source, Quality::MIN).unwrap().len();
    assert!(top > bottom + 4 * KB, "top={} bottom={}", top, bottom);

    let ceiling_kb = ((top + bottom) / 2 / KB) as u32;
    let artifact = BudgetedEncoder::new(JpegCodec)
        .encode_to_budget(&source, ceiling_kb)
        .unwrap();

    assert!(artifact.fits(ceiling_kb));
    assert!(artifact.quality < Quality::MAX);
    assert_eq!(&artifact.bytes[0..2], &[0xFF, 0xD8]);
}

#[test]
fn test_real_jpeg_is_deterministic() {
    let source = noise_image(96, 96);
    let encoder = BudgetedEncoder::new(JpegCodec);

    let first = encoder.encode_to_budget(&source, 12).unwrap();
    let second = encoder.encode_to_budget(&source, 12).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_encode_bytes_decodes_png_source() {
    let mut png = Cursor::new(Vec::new());
    gradient_image(40, 40)
        .write_to(&mut png, ImageFormat::Png)
        .unwrap();

    let artifact = BudgetedEncoder::new(JpegCodec)
        .encode_bytes_to_budget(png.get_ref(), 50)
        .unwrap();

    let decoded = JpegCodec.decode(&artifact.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 40));
}

#[test]
fn test_encode_bytes_rejects_garbage() {
    let result = BudgetedEncoder::new(JpegCodec).encode_bytes_to_budget(b"<html></html>", 50);
    assert!(matches!(result, Err(CoverError::Decode(_))));
}

fn size_table() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(KB..=120 * KB, 95..=95)
}

proptest! {
    /// A returned artifact never exceeds its ceiling.
    #[test]
    fn prop_result_fits_ceiling(sizes in size_table(), ceiling_kb in 1u32..=150) {
        let encoder = BudgetedEncoder::new(TableCodec::new(sizes));
        match encoder.encode_to_budget(&DynamicImage::new_rgb8(1, 1), ceiling_kb) {
            Ok(artifact) => prop_assert!(artifact.fits(ceiling_kb)),
            Err(CoverError::BudgetUnreachable { smallest_bytes, .. }) => {
                prop_assert!(smallest_bytes as u64 > u64::from(ceiling_kb) * 1024)
            }
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }

    /// A tighter ceiling never yields a higher quality, even when the codec
    /// is not monotonic in size.
    #[test]
    fn prop_tighter_ceiling_never_raises_quality(
        sizes in size_table(),
        low in 1u32..=130,
        extra in 1u32..=60,
    ) {
        let high = low + extra;
        let encoder = BudgetedEncoder::new(TableCodec::new(sizes));
        let source = DynamicImage::new_rgb8(1, 1);

        let tight = encoder.encode_to_budget(&source, low);
        let loose = encoder.encode_to_budget(&source, high);

        match (tight, loose) {
            (Ok(tight), Ok(loose)) => prop_assert!(tight.quality <= loose.quality),
            (Ok(_), Err(e)) => prop_assert!(false, "looser ceiling failed: {}", e),
            (Err(_), _) => {}
        }
    }
}
