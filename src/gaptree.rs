// SPDX-License-Identifier: MIT
//! Gap-tree column segmenter (spec.md §4.D): discovers multi-column
//! structure by tracking vertical whitespace gaps across horizontal rows,
//! builds a tree of rectangular regions, and exposes a preorder (reading
//! order) traversal of that tree.

use tracing::debug;

use crate::geometry::{nearly_eq, Rect, EPS};

/// A maximal run of vertically-overlapping blocks (spec.md §3 "Row").
/// Each entry is `(rect, original index)`, sorted left-to-right.
type Row = Vec<(Rect, usize)>;

/// A finished vertical whitespace corridor: `(left_x, right_x, first_row,
/// last_row)`, inclusive on both row bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cut {
    l: f64,
    r: f64,
    first_row: usize,
    last_row: usize,
}

#[derive(Debug, Clone, Copy)]
struct OpenGap {
    l: f64,
    r: f64,
    first_row: usize,
}

/// Tagged region-tree node, replacing the Python reference's single struct
/// where `children` and `units` are both always present by convention
/// (spec.md §9 REDESIGN FLAGS).
#[derive(Debug, Clone)]
pub(crate) struct RegionNode {
    pub x_left: f64,
    pub x_right: f64,
    pub r_top: i64,
    pub r_bottom: i64,
    /// Original-block indices belonging directly to this region, sorted
    /// top-to-bottom. Empty for the root and for purely-internal regions;
    /// non-empty marks a region as a leaf for the purposes of
    /// [`leaf_groups`].
    pub units: Vec<usize>,
    /// Child region indices into the same arena, sorted left-to-right.
    pub children: Vec<usize>,
}

/// Assembles rows: a maximal run of consecutive (sorted-by-`y0`) blocks
/// whose `y0` does not exceed the running maximum `y1` seen so far
/// (spec.md §4.D step 1).
fn assemble_rows(rects: &[Rect]) -> Vec<Row> {
    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by(|&a, &b| rects[a].y0.partial_cmp(&rects[b].y0).unwrap());

    let mut rows = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let mut row = vec![(rects[order[i]], order[i])];
        let mut row_bottom = rects[order[i]].y1;
        let mut j = i + 1;
        while j < order.len() {
            let r = rects[order[j]];
            if r.y0 > row_bottom {
                break;
            }
            row.push((r, order[j]));
            row_bottom = row_bottom.max(r.y1);
            j += 1;
        }
        row.sort_by(|a, b| {
            a.0.x0
                .partial_cmp(&b.0.x0)
                .unwrap()
                .then(a.0.x1.partial_cmp(&b.0.x1).unwrap())
        });
        rows.push(row);
        i = j;
    }
    rows
}

/// Per-row gap computation (spec.md §4.D step 2): walks left-to-right from
/// the page-left boundary to the page-right boundary, coalescing
/// overlapping/adjacent blocks and emitting every uncovered interval.
fn row_gaps(row: &Row, page_l: f64, page_r: f64) -> Vec<(f64, f64)> {
    let mut gaps = Vec::new();
    let mut search_start = page_l;
    for (rect, _) in row {
        if rect.x0 > search_start {
            gaps.push((search_start, rect.x0));
        }
        if rect.x1 > search_start {
            search_start = rect.x1;
        }
    }
    gaps.push((search_start, page_r));
    gaps
}

/// Intersects the currently-open gaps with a new row's gaps (spec.md §4.D
/// step 3), expressed as an interval merge rather than the reference's
/// two-flag list scan (spec.md §9 REDESIGN FLAGS): every open/new pair that
/// overlaps produces a continuing (narrowed) entry; an open gap with no
/// overlapping new gap closes out; a new gap with no overlapping open gap
/// starts fresh.
fn update_gaps(open: &[OpenGap], new_gaps: &[(f64, f64)], row_index: usize) -> (Vec<OpenGap>, Vec<Cut>) {
    let mut updated = Vec::new();
    let mut closed = Vec::new();
    let mut matched_new = vec![false; new_gaps.len()];

    for og in open {
        let mut continued = false;
        for (ni, &(nl, nr)) in new_gaps.iter().enumerate() {
            let inter_l = og.l.max(nl);
            let inter_r = og.r.min(nr);
            if inter_l <= inter_r {
                updated.push(OpenGap {
                    l: inter_l,
                    r: inter_r,
                    first_row: og.first_row,
                });
                matched_new[ni] = true;
                continued = true;
            }
        }
        if !continued {
            closed.push(Cut {
                l: og.l,
                r: og.r,
                first_row: og.first_row,
                last_row: row_index.saturating_sub(1),
            });
        }
    }
    for (ni, &(nl, nr)) in new_gaps.iter().enumerate() {
        if !matched_new[ni] {
            updated.push(OpenGap {
                l: nl,
                r: nr,
                first_row: row_index,
            });
        }
    }
    updated.sort_by(|a, b| a.l.partial_cmp(&b.l).unwrap());
    (updated, closed)
}

/// Finds all rows and vertical cutting lines (spec.md §4.D steps 1-3).
/// Returns cuts sorted by left edge.
fn rows_and_cuts(rects: &[Rect]) -> (Vec<Row>, Vec<Cut>) {
    let rows = assemble_rows(rects);
    let page_l = rects.iter().map(|r| r.x0).fold(f64::INFINITY, f64::min) - 1.0;
    let page_r = rects.iter().map(|r| r.x1).fold(f64::NEG_INFINITY, f64::max) + 1.0;

    let mut open: Vec<OpenGap> = Vec::new();
    let mut cuts: Vec<Cut> = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        let gaps = row_gaps(row, page_l, page_r);
        let (new_open, closed) = update_gaps(&open, &gaps, row_index);
        open = new_open;
        cuts.extend(closed);
    }
    let last_row = rows.len().saturating_sub(1);
    for og in open {
        cuts.push(Cut {
            l: og.l,
            r: og.r,
            first_row: og.first_row,
            last_row,
        });
    }
    cuts.sort_by(|a, b| a.l.partial_cmp(&b.l).unwrap());
    (rows, cuts)
}

/// Finds the parent for a just-closed region: the deepest already-closed
/// region whose horizontal span strictly encloses the child's right edge
/// and whose bottom sits above the child's top, breaking ties by the
/// rightmost candidate (spec.md §4.D step 4).
fn attach(arena: &mut Vec<RegionNode>, completed: &mut Vec<usize>, node_idx: usize) {
    let node_r = arena[node_idx].x_right - 2.0;
    let node_top = arena[node_idx].r_top;

    let mut max_bottom = i64::MIN;
    let mut candidates: Vec<usize> = Vec::new();
    for &ci in completed.iter() {
        let c = &arena[ci];
        if node_r < c.x_left || node_r > c.x_right + EPS {
            continue;
        }
        if c.r_bottom >= node_top {
            continue;
        }
        match c.r_bottom.cmp(&max_bottom) {
            std::cmp::Ordering::Greater => {
                max_bottom = c.r_bottom;
                candidates = vec![ci];
            }
            std::cmp::Ordering::Equal => candidates.push(ci),
            std::cmp::Ordering::Less => {}
        }
    }
    let parent = *candidates
        .iter()
        .max_by(|&&a, &&b| arena[a].x_right.partial_cmp(&arena[b].x_right).unwrap())
        .expect("root always qualifies as a parent candidate");
    arena[parent].children.push(node_idx);
    completed.push(node_idx);
}

/// Builds the region tree from rows and cuts (spec.md §4.D step 4). Returns
/// the arena and the root's index (always `0`).
fn build_tree(rows: &[Row], cuts: &[Cut]) -> Vec<RegionNode> {
    let mut rows_gaps: Vec<Vec<(f64, f64)>> = vec![Vec::new(); rows.len()];
    for cut in cuts {
        for row_gaps in rows_gaps.iter_mut().take(cut.last_row + 1).skip(cut.first_row) {
            row_gaps.push((cut.l, cut.r));
        }
    }

    let mut arena: Vec<RegionNode> = vec![RegionNode {
        x_left: cuts[0].l - 1.0,
        x_right: cuts[cuts.len() - 1].r + 1.0,
        r_top: -1,
        r_bottom: -1,
        units: Vec::new(),
        children: Vec::new(),
    }];
    let mut completed: Vec<usize> = vec![0];
    let mut now_nodes: Vec<usize> = Vec::new();

    for (r_i, row) in rows.iter().enumerate() {
        let row_gap_list = &rows_gaps[r_i];

        // Close any region whose edges are no longer carried, or which has
        // an intruding gap strictly inside its span.
        let mut still_open = Vec::new();
        for &idx in &now_nodes {
            let (x_left, x_right) = (arena[idx].x_left, arena[idx].x_right);
            let mut l_flag = false;
            let mut r_flag = false;
            let mut intruded = false;
            for &(gl, gr) in row_gap_list {
                if nearly_eq(gr, x_left) {
                    l_flag = true;
                }
                if nearly_eq(gl, x_right) {
                    r_flag = true;
                }
                if (x_left < gl && gl < x_right) || (x_left < gr && gr < x_right) {
                    intruded = true;
                    break;
                }
            }
            if intruded || !l_flag || !r_flag {
                attach(&mut arena, &mut completed, idx);
            } else {
                arena[idx].r_bottom = r_i as i64;
                still_open.push(idx);
            }
        }
        now_nodes = still_open;

        let mut u_i = 0;
        let mut g_i = 0;
        while u_i < row.len() {
            let (rect, orig_index) = row[u_i];
            let x_l = row_gap_list[g_i].1;
            let x_r = row_gap_list[g_i + 1].0;
            if rect.x0 + EPS > x_r {
                g_i += 1;
                continue;
            }
            if let Some(&idx) = now_nodes
                .iter()
                .find(|&&idx| nearly_eq(arena[idx].x_left, x_l) && nearly_eq(arena[idx].x_right, x_r))
            {
                arena[idx].units.push(orig_index);
            } else {
                arena.push(RegionNode {
                    x_left: x_l,
                    x_right: x_r,
                    r_top: r_i as i64,
                    r_bottom: r_i as i64,
                    units: vec![orig_index],
                    children: Vec::new(),
                });
                now_nodes.push(arena.len() - 1);
            }
            u_i += 1;
        }
    }
    for idx in now_nodes {
        attach(&mut arena, &mut completed, idx);
    }

    arena
}

/// Sorts each region's children left-to-right and its units top-to-bottom
/// (spec.md §4.D step 4, end of construction).
fn sort_children_and_units(rects: &[Rect], arena: &mut [RegionNode]) {
    let x_lefts: Vec<f64> = arena.iter().map(|n| n.x_left).collect();
    for node in arena.iter_mut() {
        node.children
            .sort_by(|&a, &b| x_lefts[a].partial_cmp(&x_lefts[b]).unwrap());
        node.units
            .sort_by(|&a, &b| rects[a].y0.partial_cmp(&rects[b].y0).unwrap());
    }
}

/// Preorder (depth-first, left-to-right) traversal of the region tree
/// (spec.md §4.D step 5). Returns the visited node indices in order.
fn preorder(arena: &[RegionNode], root: usize) -> Vec<usize> {
    let mut stack = vec![root];
    let mut result = Vec::new();
    while let Some(idx) = stack.pop() {
        result.push(idx);
        for &child in arena[idx].children.iter().rev() {
            stack.push(child);
        }
    }
    result
}

/// Result of running the gap-tree segmenter: the original-block indices in
/// reading order, and the same indices grouped by leaf region in that same
/// order (used by the multi-column paragraph mode).
pub(crate) struct GapTreeOutcome {
    pub order: Vec<usize>,
    pub leaf_groups: Vec<Vec<usize>>,
}

/// Sorts `rects` (by original index) into human reading order: top-to-
/// bottom, then left column fully before right column of the same
/// horizontal band (spec.md §4.D).
pub(crate) fn sort(rects: &[Rect]) -> GapTreeOutcome {
    if rects.is_empty() {
        return GapTreeOutcome {
            order: Vec::new(),
            leaf_groups: Vec::new(),
        };
    }
    if rects.len() == 1 {
        return GapTreeOutcome {
            order: vec![0],
            leaf_groups: vec![vec![0]],
        };
    }

    let (rows, cuts) = rows_and_cuts(rects);
    debug!(rows = rows.len(), cuts = cuts.len(), "gap-tree: rows and vertical cuts computed");
    let mut arena = build_tree(&rows, &cuts);
    sort_children_and_units(rects, &mut arena);

    let nodes = preorder(&arena, 0);
    let mut order = Vec::new();
    let mut leaf_groups = Vec::new();
    for &idx in &nodes {
        if !arena[idx].units.is_empty() {
            order.extend(arena[idx].units.iter().copied());
            leaf_groups.push(arena[idx].units.clone());
        }
    }
    GapTreeOutcome { order, leaf_groups }
}
