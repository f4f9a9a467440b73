// SPDX-License-Identifier: MIT
//! Paragraph analyzer (spec.md §4.E): within a single column region, groups
//! lines into natural paragraphs using left/right-edge alignment and
//! line-spacing heuristics, then assigns inter-line separators.

use crate::block::{NormalizedBlock, Separator};
use crate::geometry::Rect;
use crate::separator::word_separator_opt;
use tracing::debug;

/// Line-height multiplier used as the proximity threshold throughout
/// paragraph analysis (spec.md §4.E).
const TH: f64 = 1.2;

struct Unit {
    /// Index back into the `blocks` slice passed to [`run`].
    idx: usize,
    rect: Rect,
    first: Option<char>,
    last: Option<char>,
}

/// Runs paragraph analysis over `blocks`, which must all belong to a single
/// column region (one leaf of the gap tree, or the whole page in
/// single-column mode). Sets `end` on every block.
pub(crate) fn run(blocks: &mut [NormalizedBlock]) {
    let items: Vec<(Rect, Option<char>, Option<char>)> = blocks
        .iter()
        .map(|nb| (nb.rect, nb.block.first_char(), nb.block.last_char()))
        .collect();
    for (nb, end) in blocks.iter_mut().zip(analyze(&items)) {
        nb.block.end = Some(end);
    }
}

/// The pure form of paragraph analysis (spec.md §4.E): given each item's
/// rect and boundary characters, returns the separator that should follow
/// it. [`run`] is a thin wrapper of this over [`NormalizedBlock`]s; the
/// single-column natural-paragraph parser calls this directly over
/// synthetic per-line items so a packaged line, not a raw block, is the
/// unit of paragraph analysis.
pub(crate) fn analyze(items: &[(Rect, Option<char>, Option<char>)]) -> Vec<Separator> {
    if items.is_empty() {
        return Vec::new();
    }
    if items.len() == 1 {
        return vec![Separator::Newline];
    }

    let mut units: Vec<Unit> = items
        .iter()
        .enumerate()
        .map(|(idx, &(rect, first, last))| Unit { idx, rect, first, last })
        .collect();
    units.sort_by(|a, b| a.rect.y0.partial_cmp(&b.rect.y0).unwrap());

    let (mut paras, mut paras_line_space) = group_into_paragraphs(&units);
    reattach_orphans(&units, &mut paras, &mut paras_line_space);
    debug!(items_in = items.len(), paragraphs_out = paras.len(), "paragraph analyzer: grouped lines into paragraphs");

    let mut ends = vec![Separator::Newline; items.len()];
    for para in &paras {
        for w in para.windows(2) {
            let (a, b) = (w[0], w[1]);
            ends[units[a].idx] = word_separator_opt(units[a].last, units[b].first);
        }
        let last = *para.last().unwrap();
        ends[units[last].idx] = Separator::Newline;
    }
    ends
}

/// Pass 1 (spec.md §4.E): greedy top-to-bottom paragraph grouping by
/// left/right-edge alignment and line-spacing consistency.
fn group_into_paragraphs(units: &[Unit]) -> (Vec<Vec<usize>>, Vec<Option<f64>>) {
    let mut para_l = units[0].rect.x0;
    let mut para_r = units[0].rect.x1;
    let mut para_line_h = units[0].rect.safe_height();
    let mut para_line_s: Option<f64> = None;
    let mut para_bottom = units[0].rect.y1;

    let mut now_para = vec![0usize];
    let mut paras = Vec::new();
    let mut paras_line_space = Vec::new();

    for i in 1..units.len() {
        let rect = units[i].rect;
        let h = rect.safe_height();
        let ls = rect.y0 - para_bottom;

        let joins = (para_l - rect.x0).abs() <= para_line_h * TH
            && (para_r - rect.x1).abs() <= para_line_h * TH
            && para_line_s.map_or(true, |s| ls < s + para_line_h * 0.5);

        if joins {
            para_l = (para_l + rect.x0) / 2.0;
            para_r = (para_r + rect.x1) / 2.0;
            para_line_h = (para_line_h + h) / 2.0;
            para_line_s = Some(para_line_s.map_or(ls, |s| (s + ls) / 2.0));
            now_para.push(i);
        } else {
            paras.push(std::mem::replace(&mut now_para, vec![i]));
            paras_line_space.push(para_line_s);
            para_l = rect.x0;
            para_r = rect.x1;
            para_line_h = h;
            para_line_s = None;
        }
        para_bottom = rect.y1;
    }
    paras.push(now_para);
    paras_line_space.push(para_line_s);
    (paras, paras_line_space)
}

/// Pass 2 (spec.md §4.E): reattach one-line "orphan" paragraphs to the
/// paragraph above or below when alignment/spacing allow it.
fn reattach_orphans(units: &[Unit], paras: &mut Vec<Vec<usize>>, paras_line_space: &mut Vec<Option<f64>>) {
    let mut i1 = paras.len();
    while i1 > 0 {
        i1 -= 1;
        if paras[i1].len() != 1 {
            continue;
        }
        let line = units[paras[i1][0]].rect;
        let (l, top, r, bottom) = (line.x0, line.y0, line.x1, line.y1);

        let mut up_flag = false;
        if i1 > 0 {
            let up_last = units[*paras[i1 - 1].last().unwrap()].rect;
            let (up_l, up_top, up_r, up_bottom) = (up_last.x0, up_last.y0, up_last.x1, up_last.y1);
            let up_h = up_bottom - up_top;
            let up_dist = (up_l - l).abs();
            up_flag = up_dist <= up_h * TH && r <= up_r + up_h * TH;
            if let Some(s) = paras_line_space[i1 - 1] {
                if top - up_bottom > s + up_h * 0.5 {
                    up_flag = false;
                }
            }
        }

        let mut down_flag = false;
        if i1 < paras.len() - 1 {
            let down_first = units[paras[i1 + 1][0]].rect;
            let (down_l, down_top, down_r, down_bottom) =
                (down_first.x0, down_first.y0, down_first.x1, down_first.y1);
            let down_h = down_bottom - down_top;
            if l >= down_l - down_h * TH && l <= down_l + down_h * (1.0 + TH) {
                if paras[i1 + 1].len() > 1 {
                    down_flag = (down_r - r).abs() <= down_h * TH;
                } else {
                    down_flag = down_r - down_h * TH < r;
                }
            }
            if let Some(s) = paras_line_space[i1 + 1] {
                if down_top - bottom > s + down_h * 0.5 {
                    down_flag = false;
                }
            }
        }

        if up_flag && down_flag {
            let up_bottom = units[*paras[i1 - 1].last().unwrap()].rect.y1;
            let down_top = units[paras[i1 + 1][0]].rect.y0;
            if top - up_bottom < down_top - bottom {
                let line_idx = paras[i1][0];
                paras[i1 - 1].push(line_idx);
            } else {
                let line_idx = paras[i1][0];
                paras[i1 + 1].insert(0, line_idx);
            }
        } else if up_flag {
            let line_idx = paras[i1][0];
            paras[i1 - 1].push(line_idx);
        } else if down_flag {
            let line_idx = paras[i1][0];
            paras[i1 + 1].insert(0, line_idx);
        }

        if up_flag || down_flag {
            paras.remove(i1);
            paras_line_space.remove(i1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TextBlock;
    use crate::geometry::{Point, Quad};

    fn block(x0: f64, y0: f64, x1: f64, y1: f64, text: &str) -> NormalizedBlock {
        NormalizedBlock {
            rect: Rect::new(x0, y0, x1, y1),
            block: TextBlock::new(
                Quad::new(
                    Point::new(x0, y0),
                    Point::new(x1, y0),
                    Point::new(x1, y1),
                    Point::new(x0, y1),
                ),
                text,
                0.9,
            ),
        }
    }

    #[test]
    fn two_close_lines_then_a_gapped_third_splits_into_two_paragraphs() {
        // foo/bar at y=0,12 (same 10-tall box, spacing 2); baz at y=40 (gap 18).
        let mut blocks = vec![
            block(0.0, 0.0, 100.0, 10.0, "foo"),
            block(0.0, 12.0, 100.0, 22.0, "bar"),
            block(0.0, 40.0, 100.0, 50.0, "baz"),
        ];
        run(&mut blocks);
        assert_eq!(blocks[0].block.end, Some(Separator::Space));
        assert_eq!(blocks[1].block.end, Some(Separator::Newline));
        assert_eq!(blocks[2].block.end, Some(Separator::Newline));
    }

    #[test]
    fn cjk_lines_join_without_space() {
        let mut blocks = vec![
            block(0.0, 0.0, 100.0, 10.0, "你好"),
            block(0.0, 11.0, 100.0, 21.0, "世界"),
        ];
        run(&mut blocks);
        assert_eq!(blocks[0].block.end, Some(Separator::Empty));
        assert_eq!(blocks[1].block.end, Some(Separator::Newline));
    }

    #[test]
    fn single_line_region_ends_with_newline() {
        let mut blocks = vec![block(0.0, 0.0, 50.0, 10.0, "solo")];
        run(&mut blocks);
        assert_eq!(blocks[0].block.end, Some(Separator::Newline));
    }
}
