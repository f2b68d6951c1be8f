use crate::core::mapper::CoordinateMapper;
use crate::core::types::{PixelRect, TempTargetWindow};

/// Projects temporary glycemic targets as non-overlapping bands.
///
/// Windows are projected in start-time order, then collapsed in a single
/// left-to-right pass by [`merge_band_rects`].
#[must_use]
pub fn project_temp_target_bands(
    targets: &[TempTargetWindow],
    mapper: &CoordinateMapper,
) -> Vec<PixelRect> {
    let outset = mapper.layout().target_band_outset;

    let mut ordered: Vec<TempTargetWindow> = targets.to_vec();
    ordered.sort_by(|a, b| a.start_secs().total_cmp(&b.start_secs()));

    let rects = ordered
        .iter()
        .map(|target| {
            let x0 = mapper.time_to_x(target.start_secs());
            let x1 = mapper.time_to_x(target.end_secs());
            let top = mapper.value_to_y(target.high_bound) - outset;
            let bottom = mapper.value_to_y(target.low_bound) + outset;
            PixelRect::new(x0, top, x1 - x0, bottom - top)
        })
        .collect();

    merge_band_rects(rects)
}

/// Collapses overlapping bands so none overlap in X.
///
/// Single left-to-right pass over start-ordered rects: when the accumulated
/// band reaches past the next band's start, the earlier band is truncated to
/// end exactly there (most recent wins) and the next band is kept unmodified.
/// Already non-overlapping input is a fixed point.
#[must_use]
pub fn merge_band_rects(rects: Vec<PixelRect>) -> Vec<PixelRect> {
    let mut merged: Vec<PixelRect> = Vec::with_capacity(rects.len());
    for rect in rects {
        if let Some(last) = merged.last_mut()
            && last.x + last.width > rect.x
        {
            last.width = rect.x - last.x;
        }
        merged.push(rect);
    }
    merged
}
