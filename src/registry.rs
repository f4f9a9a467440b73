// SPDX-License-Identifier: MIT
//! Parser registry (spec.md §4.H): dispatches a mode key to one of the
//! eight layout parsers and wires the shared pipeline stages together.

use std::str::FromStr;

use crate::block::{NormalizedBlock, Separator, TextBlock};
use crate::code;
use crate::error::TbpuError;
use crate::gaptree;
use crate::geometry::Rect;
use crate::paragraph;
use crate::preprocess::preprocess;
use crate::separator::word_separator_opt;
use crate::singlecol::group_lines;

/// One of the eight registered layout parsers (spec.md §4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No processing beyond defaulting an unset `end` to a newline.
    None,
    /// Multi-column, natural paragraphs.
    MultiPara,
    /// Multi-column, every block its own line.
    MultiLine,
    /// Multi-column, no line breaks at all.
    MultiNone,
    /// Single column, natural paragraphs.
    SinglePara,
    /// Single column, every physical line its own line.
    SingleLine,
    /// Single column, no line breaks at all.
    SingleNone,
    /// Single column, reconstructs code indentation.
    SingleCode,
}

impl FromStr for Mode {
    type Err = TbpuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Mode::None),
            "multi_para" => Ok(Mode::MultiPara),
            "multi_line" => Ok(Mode::MultiLine),
            "multi_none" => Ok(Mode::MultiNone),
            "single_para" => Ok(Mode::SinglePara),
            "single_line" => Ok(Mode::SingleLine),
            "single_none" => Ok(Mode::SingleNone),
            "single_code" => Ok(Mode::SingleCode),
            other => Err(TbpuError::UnknownMode(other.to_string())),
        }
    }
}

/// Runs `mode`'s pipeline over `blocks`.
pub(crate) fn run(mode: Mode, blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    match mode {
        Mode::None => none(blocks),
        Mode::MultiPara => multi_para(blocks),
        Mode::MultiLine => multi_line(blocks),
        Mode::MultiNone => multi_none(blocks),
        Mode::SinglePara => single_para(blocks),
        Mode::SingleLine => single_line(blocks),
        Mode::SingleNone => single_none(blocks),
        Mode::SingleCode => single_code(blocks),
    }
}

fn none(mut blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    for b in &mut blocks {
        if b.end.is_none() {
            b.end = Some(Separator::Newline);
        }
    }
    blocks
}

/// Multi-column, natural paragraphs: gap-tree into columns, then run the
/// paragraph analyzer independently within each leaf region.
fn multi_para(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let normalized = preprocess(blocks);
    let rects: Vec<Rect> = normalized.iter().map(|nb| nb.rect).collect();
    let outcome = gaptree::sort(&rects);

    let mut slots: Vec<Option<NormalizedBlock>> = normalized.into_iter().map(Some).collect();
    for group in &outcome.leaf_groups {
        let mut region: Vec<NormalizedBlock> =
            group.iter().map(|&i| slots[i].take().unwrap()).collect();
        paragraph::run(&mut region);
        for (nb, &i) in region.into_iter().zip(group) {
            slots[i] = Some(nb);
        }
    }

    outcome
        .order
        .into_iter()
        .map(|i| slots[i].take().unwrap().into_block())
        .collect()
}

/// Multi-column, every block becomes its own line: gap-tree order only.
fn multi_line(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let normalized = preprocess(blocks);
    let rects: Vec<Rect> = normalized.iter().map(|nb| nb.rect).collect();
    let outcome = gaptree::sort(&rects);

    let mut slots: Vec<Option<TextBlock>> =
        normalized.into_iter().map(|nb| Some(nb.into_block())).collect();
    outcome
        .order
        .into_iter()
        .map(|i| {
            let mut b = slots[i].take().unwrap();
            b.end = Some(Separator::Newline);
            b
        })
        .collect()
}

/// Multi-column, no line breaks: gap-tree order, separators from the word
/// separator oracle between every consecutive pair.
fn multi_none(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let normalized = preprocess(blocks);
    let rects: Vec<Rect> = normalized.iter().map(|nb| nb.rect).collect();
    let outcome = gaptree::sort(&rects);

    let mut slots: Vec<Option<TextBlock>> =
        normalized.into_iter().map(|nb| Some(nb.into_block())).collect();
    let mut ordered: Vec<TextBlock> = outcome
        .order
        .into_iter()
        .map(|i| slots[i].take().unwrap())
        .collect();

    let n = ordered.len();
    for i in 0..n {
        let end = if i + 1 < n {
            word_separator_opt(ordered[i].last_char(), ordered[i + 1].first_char())
        } else {
            Separator::Newline
        };
        ordered[i].end = Some(end);
    }
    ordered
}

/// Single column, every physical line its own line: the line grouper
/// already assigns intra-line separators and a per-line trailing newline.
fn single_line(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let mut normalized = preprocess(blocks);
    let lines = group_lines(&mut normalized);

    let mut slots: Vec<Option<TextBlock>> =
        normalized.into_iter().map(|nb| Some(nb.into_block())).collect();
    lines
        .into_iter()
        .flatten()
        .map(|i| slots[i].take().unwrap())
        .collect()
}

/// Single column, no line breaks: run `single_line`, then replace every
/// line-break separator with the word separator oracle's verdict (the
/// final block's trailing newline is left alone).
fn single_none(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let mut ordered = single_line(blocks);
    let n = ordered.len();
    for i in 0..n.saturating_sub(1) {
        if ordered[i].end == Some(Separator::Newline) {
            let sep = word_separator_opt(ordered[i].last_char(), ordered[i + 1].first_char());
            ordered[i].end = Some(sep);
        }
    }
    ordered
}

/// Single column, natural paragraphs: package each physical line as one
/// synthetic paragraph-analysis item (its union bbox, and the boundary
/// characters of its first and last block), run the paragraph analyzer
/// over those packaged lines, then apply the verdict to each line's last
/// block — the intra-line separators the line grouper already assigned
/// are left untouched.
fn single_para(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let mut normalized = preprocess(blocks);
    let lines = group_lines(&mut normalized);

    let packaged: Vec<(Rect, Option<char>, Option<char>)> = lines
        .iter()
        .map(|line| {
            let rect = line.iter().skip(1).fold(normalized[line[0]].rect, |acc, &i| {
                let r = normalized[i].rect;
                Rect::new(acc.x0.min(r.x0), acc.y0.min(r.y0), acc.x1.max(r.x1), acc.y1.max(r.y1))
            });
            let first = normalized[line[0]].block.first_char();
            let last = normalized[*line.last().unwrap()].block.last_char();
            (rect, first, last)
        })
        .collect();

    for (line, end) in lines.iter().zip(paragraph::analyze(&packaged)) {
        let last_idx = *line.last().unwrap();
        normalized[last_idx].block.end = Some(end);
    }

    let mut slots: Vec<Option<TextBlock>> =
        normalized.into_iter().map(|nb| Some(nb.into_block())).collect();
    lines
        .into_iter()
        .flatten()
        .map(|i| slots[i].take().unwrap())
        .collect()
}

/// Single column, code block: gap-tree is skipped (code never has a
/// meaningful multi-column layout); the line grouper and merge/indent
/// pass do the rest.
fn single_code(blocks: Vec<TextBlock>) -> Vec<TextBlock> {
    let normalized = preprocess(blocks);
    code::run(normalized)
}
