// SPDX-License-Identifier: MIT
//! Code-block formatter (spec.md §4.G): groups blocks into lines the same
//! way as the single-column line grouper, then merges each line into a
//! single block and reconstructs indentation from horizontal offsets.

use crate::block::{NormalizedBlock, Separator, TextBlock};
use crate::geometry::{Point, Quad, Rect};
use crate::singlecol::group_lines;
use tracing::debug;

/// Runs the code-block formatter over an already gap-tree-flattened,
/// single-column set of blocks: groups into lines, merges each line into
/// one block, then reconstructs per-line indentation.
pub(crate) fn run(mut blocks: Vec<NormalizedBlock>) -> Vec<TextBlock> {
    let blocks_in = blocks.len();
    let lines = group_lines(&mut blocks);
    let merged: Vec<NormalizedBlock> = lines.iter().map(|line| merge_line(&blocks, line)).collect();
    let out = indent(merged);
    debug!(blocks_in, blocks_out = out.len(), "code formatter: merged lines and reconstructed indentation");
    out
}

/// Merges one physical line's blocks into a single block (spec.md §4.G):
/// text is joined with a run of double-spaces sized to the horizontal gap
/// (in line-height units), the bounding box is the union of the line's
/// blocks, and the score is their average. Always ends in a newline.
fn merge_line(blocks: &[NormalizedBlock], line: &[usize]) -> NormalizedBlock {
    let first = &blocks[line[0]];
    let mut rect = first.rect;
    let mut line_height = rect.safe_height();
    let mut text = first.block.text.clone();
    let mut score_sum = first.block.score;

    for &idx in &line[1..] {
        let next = &blocks[idx];
        line_height = (line_height + next.rect.safe_height()) / 2.0;

        let gap = next.rect.x0 - rect.x1;
        let spaces = if gap > 0.0 {
            (gap / line_height).round() as usize
        } else {
            0
        };
        text.push_str(&"  ".repeat(spaces));
        text.push_str(&next.block.text);

        rect = Rect::new(
            rect.x0.min(next.rect.x0),
            rect.y0.min(next.rect.y0),
            rect.x1.max(next.rect.x1),
            rect.y1.max(next.rect.y1),
        );
        score_sum += next.block.score;
    }

    let score = score_sum / line.len() as f32;
    let mut block = TextBlock::new(axis_quad(rect), text, score);
    block.end = Some(Separator::Newline);
    NormalizedBlock { rect, block }
}

/// Reconstructs indentation across merged lines (spec.md §4.G): buckets
/// each line's left edge into levels spaced one average-line-height apart,
/// prefixes the line's text with two spaces per level, and resets every
/// line to start at the leftmost observed edge.
fn indent(mut lines: Vec<NormalizedBlock>) -> Vec<TextBlock> {
    if lines.is_empty() {
        return Vec::new();
    }

    let line_height: f64 =
        lines.iter().map(|nb| nb.rect.safe_height()).sum::<f64>() / lines.len() as f64;
    let half_height = line_height / 2.0;
    let x_min = lines.iter().map(|nb| nb.rect.x0).fold(f64::INFINITY, f64::min);
    let x_max = lines.iter().map(|nb| nb.rect.x0).fold(f64::NEG_INFINITY, f64::max);

    let mut levels = Vec::new();
    let mut x = x_min;
    while x < x_max {
        levels.push(x);
        x += line_height;
    }

    for nb in &mut lines {
        let probe = nb.rect.x0 + half_height;
        let level = levels.partition_point(|&l| l < probe).saturating_sub(1);
        nb.block.text = format!("{}{}", "  ".repeat(level), nb.block.text);
        nb.rect.x0 = x_min;
        nb.block.quad = axis_quad(nb.rect);
    }

    lines.into_iter().map(|nb| nb.into_block()).collect()
}

fn axis_quad(rect: Rect) -> Quad {
    Quad::new(
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    )
}
