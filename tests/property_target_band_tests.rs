use glucochart::core::PixelRect;
use glucochart::core::targets::merge_band_rects;
use proptest::prelude::*;

fn build_rects(raw: Vec<(f64, f64)>) -> Vec<PixelRect> {
    let mut rects: Vec<PixelRect> = raw
        .into_iter()
        .map(|(x, width)| PixelRect::new(x, 100.0, width, 20.0))
        .collect();
    rects.sort_by(|a, b| a.x.total_cmp(&b.x));
    rects
}

proptest! {
    #[test]
    fn merged_bands_never_overlap_property(
        raw in prop::collection::vec((0.0f64..1000.0, 1.0f64..300.0), 0..12),
    ) {
        let merged = merge_band_rects(build_rects(raw));

        for pair in merged.windows(2) {
            prop_assert!(pair[0].max_x() <= pair[1].x + 1e-9);
        }
    }

    #[test]
    fn merging_is_idempotent_property(
        raw in prop::collection::vec((0.0f64..1000.0, 1.0f64..300.0), 0..12),
    ) {
        let once = merge_band_rects(build_rects(raw));
        let twice = merge_band_rects(once.clone());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merging_preserves_band_count_and_starts_property(
        raw in prop::collection::vec((0.0f64..1000.0, 1.0f64..300.0), 0..12),
    ) {
        let rects = build_rects(raw);
        let merged = merge_band_rects(rects.clone());

        prop_assert_eq!(merged.len(), rects.len());
        for (original, band) in rects.iter().zip(&merged) {
            prop_assert_eq!(original.x, band.x);
        }
    }
}
