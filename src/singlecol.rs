// SPDX-License-Identifier: MIT
//! Single-column line grouper (spec.md §4.F): clusters blocks into
//! horizontal lines while ignoring column structure, then infers
//! intra-line separators.

use crate::block::{NormalizedBlock, Separator};
use crate::geometry::Rect;
use crate::separator::word_separator_opt;
use tracing::debug;

/// Clusters `blocks` into left-to-right, top-to-bottom lines and assigns
/// every block's `end`: interior blocks get the word-separator oracle's
/// verdict (or a forced space across an oversized gap), the last block of
/// every line gets a newline.
///
/// Returns the lines, each a left-to-right `Vec` of indices into `blocks`,
/// sorted top-to-bottom by the line's first block.
pub(crate) fn group_lines(blocks: &mut [NormalizedBlock]) -> Vec<Vec<usize>> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by(|&a, &b| blocks[a].rect.x0.partial_cmp(&blocks[b].rect.x0).unwrap());

    let mut used = vec![false; order.len()];
    let mut lines: Vec<Vec<usize>> = Vec::new();

    for i1 in 0..order.len() {
        if used[i1] {
            continue;
        }
        used[i1] = true;
        let anchor: Rect = blocks[order[i1]].rect;
        let (top1, bottom1) = (anchor.y0, anchor.y1);
        let h1 = anchor.safe_height();
        let mut r1 = anchor.x1;
        let mut line = vec![order[i1]];

        for i2 in (i1 + 1)..order.len() {
            if used[i2] {
                continue;
            }
            let cand: Rect = blocks[order[i2]].rect;
            let h2 = cand.safe_height();
            if cand.x0 < r1 - h1 {
                continue;
            }
            if cand.y0 < top1 - 0.5 * h1 || cand.y1 > bottom1 + 0.5 * h1 {
                continue;
            }
            if (h1 - h2).abs() > 0.5 * h1.min(h2) {
                continue;
            }
            used[i2] = true;
            line.push(order[i2]);
            r1 = cand.x1;
        }
        lines.push(line);
    }

    for line in &lines {
        assign_intra_line_separators(blocks, line);
    }

    lines.sort_by(|a, b| blocks[a[0]].rect.y0.partial_cmp(&blocks[b[0]].rect.y0).unwrap());
    debug!(blocks_in = blocks.len(), lines_out = lines.len(), "single-column line grouper: clustered blocks into lines");
    lines
}

/// Step 3 of spec.md §4.F: forced space across an oversized gap, otherwise
/// the word-separator oracle; the line's last block always ends in a
/// newline.
fn assign_intra_line_separators(blocks: &mut [NormalizedBlock], line: &[usize]) {
    for pair in line.windows(2) {
        let (i1, i2) = (pair[0], pair[1]);
        let (r1, h1) = (blocks[i1].rect.x1, blocks[i1].rect.safe_height());
        let (l2, h2) = (blocks[i2].rect.x0, blocks[i2].rect.safe_height());
        let h = (h1 + h2) / 2.0;
        let end = if l2 - r1 > 1.5 * h {
            Separator::Space
        } else {
            word_separator_opt(blocks[i1].block.last_char(), blocks[i2].block.first_char())
        };
        blocks[i1].block.end = Some(end);
    }
    if let Some(&last) = line.last() {
        blocks[last].block.end = Some(Separator::Newline);
    }
}
