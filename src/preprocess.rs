// SPDX-License-Identifier: MIT
//! Line preprocessor (spec.md §4.B): estimates page skew from the block
//! quadrilaterals, de-skews, and emits axis-aligned normalized bboxes
//! sorted top-to-bottom.

use core::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::block::{NormalizedBlock, TextBlock};
use crate::geometry::Rect;

/// Skew angles within this many radians of zero are treated as "no skew"
/// and the rotation step is skipped (spec.md §4.B step 3).
const SKEW_THRESHOLD: f64 = 3.0 * PI / 180.0;

/// Width of the hysteresis band straddling the `+pi/2` wrap boundary, used
/// to keep a block whose long side is nearly vertical from flipping between
/// `+pi/2 - eps` and `-pi/2 + eps` on successive near-identical inputs
/// (spec.md §4.B step 1).
const HYSTERESIS: f64 = 3.0 * PI / 180.0;

/// Wraps `theta` into `[-pi/2, pi/2)`, folding the hysteresis band at the
/// upper boundary down to its negative equivalent so near-vertical angles
/// settle on one consistent side.
fn normalize_angle(theta: f64) -> f64 {
    let mut t = theta;
    while t >= FRAC_PI_2 + HYSTERESIS / 2.0 {
        t -= PI;
    }
    while t < -FRAC_PI_2 - HYSTERESIS / 2.0 {
        t += PI;
    }
    if t >= FRAC_PI_2 - HYSTERESIS / 2.0 {
        t - PI
    } else {
        t
    }
}

/// Median of a slice of angles. Robust to the occasional wildly-rotated
/// caption/stamp that would otherwise skew a mean-based estimate
/// (spec.md §4.B step 2).
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Runs the line preprocessor over `blocks`, returning them paired with
/// their normalized bbox and sorted ascending by `y0`.
pub fn preprocess(blocks: Vec<TextBlock>) -> Vec<NormalizedBlock> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let angles: Vec<f64> = blocks
        .iter()
        .map(|b| normalize_angle(b.quad.long_side_angle()))
        .collect();
    let theta = median(angles);
    debug!(skew_deg = theta.to_degrees(), blocks = blocks.len(), "line preprocessor: estimated page skew");

    let rects: Vec<Rect> = if theta.abs() <= SKEW_THRESHOLD {
        blocks.iter().map(|b| b.quad.bounding_rect()).collect()
    } else {
        let rotated: Vec<Rect> = blocks
            .iter()
            .map(|b| b.quad.rotated(-theta).bounding_rect())
            .collect();
        let min_x = rotated.iter().map(|r| r.x0).fold(f64::INFINITY, f64::min);
        let min_y = rotated.iter().map(|r| r.y0).fold(f64::INFINITY, f64::min);
        let (dx, dy) = (
            if min_x < 0.0 { -min_x } else { 0.0 },
            if min_y < 0.0 { -min_y } else { 0.0 },
        );
        rotated.iter().map(|r| r.shifted(dx, dy)).collect()
    };

    let mut normalized: Vec<NormalizedBlock> = blocks
        .into_iter()
        .zip(rects)
        .map(|(block, rect)| NormalizedBlock { rect, block })
        .collect();
    normalized.sort_by(|a, b| a.rect.y0.partial_cmp(&b.rect.y0).unwrap());
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Quad};

    fn axis_aligned_block(x0: f64, y0: f64, x1: f64, y1: f64, text: &str) -> TextBlock {
        TextBlock::new(
            Quad::new(
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ),
            text,
            0.9,
        )
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(preprocess(Vec::new()).is_empty());
    }

    #[test]
    fn straight_page_sorts_by_y_without_rotating() {
        let blocks = vec![
            axis_aligned_block(0.0, 20.0, 50.0, 30.0, "b"),
            axis_aligned_block(0.0, 0.0, 50.0, 10.0, "a"),
        ];
        let out = preprocess(blocks);
        assert_eq!(out[0].block.text, "a");
        assert_eq!(out[1].block.text, "b");
        assert_eq!(out[0].rect, Rect::new(0.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn single_block_returned_unchanged_in_shape() {
        let out = preprocess(vec![axis_aligned_block(1.0, 1.0, 11.0, 11.0, "solo")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rect, Rect::new(1.0, 1.0, 11.0, 11.0));
    }

    #[test]
    fn rotated_page_normalizes_into_nonnegative_quadrant() {
        let theta = 10.0_f64.to_radians();
        let make = |x0: f64, y0: f64, x1: f64, y1: f64, text: &str| {
            let corners = [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ]
            .map(|p| p.rotate(theta));
            TextBlock::new(Quad(corners), text, 0.9)
        };
        let blocks = vec![
            make(0.0, 0.0, 50.0, 10.0, "a1"),
            make(0.0, 20.0, 50.0, 30.0, "a2"),
            make(60.0, 0.0, 110.0, 10.0, "b1"),
        ];
        let out = preprocess(blocks);
        for nb in &out {
            assert!(nb.rect.x0 >= -1e-6 && nb.rect.y0 >= -1e-6);
        }
    }
}
