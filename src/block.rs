// SPDX-License-Identifier: MIT
//! The text block record (spec.md §3) and the transient normalized-bbox
//! companion the preprocessor attaches to it.

use crate::error::TbpuError;
use crate::geometry::{Point, Quad, Rect};

/// The separator to emit after a block's text when reconstructing document
/// flow. Modeled as an enum (rather than a raw `&str`, as the Python
/// reference does via a string-keyed field) so the "exactly one of three
/// values" invariant in spec.md §3 is enforced by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Empty,
    Space,
    Newline,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Empty => "",
            Separator::Space => " ",
            Separator::Newline => "\n",
        }
    }
}

/// A single OCR detection: a quadrilateral bounding box, recognized text,
/// and a confidence score.
///
/// `end` is `None` on blocks a caller constructs and `Some(_)` on every
/// block a parser returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub quad: Quad,
    pub text: String,
    pub score: f32,
    pub end: Option<Separator>,
}

impl TextBlock {
    /// Builds a block from an already-typed quad. Infallible: `Quad` fixes
    /// the vertex arity at the type level, so there is no "wrong arity of
    /// quad points" failure mode to report here.
    pub fn new(quad: Quad, text: impl Into<String>, score: f32) -> Self {
        Self {
            quad,
            text: text.into(),
            score,
            end: None,
        }
    }

    /// Builds a block from the raw `[x, y]` pairs an OCR engine response
    /// carries on the wire (spec.md §6: `box` is a JSON array of four
    /// `[x, y]` points, top-left/top-right/bottom-right/bottom-left).
    /// Fails with [`TbpuError::MalformedBlock`] if `points` does not have
    /// exactly four entries.
    pub fn try_from_points(
        points: &[[f64; 2]],
        text: impl Into<String>,
        score: f32,
        index: usize,
    ) -> Result<Self, TbpuError> {
        let [tl, tr, br, bl]: [[f64; 2]; 4] =
            points
                .try_into()
                .map_err(|_| TbpuError::MalformedBlock {
                    index,
                    reason: format!("expected 4 quad points, got {}", points.len()),
                })?;
        let quad = Quad::new(
            Point::new(tl[0], tl[1]),
            Point::new(tr[0], tr[1]),
            Point::new(br[0], br[1]),
            Point::new(bl[0], bl[1]),
        );
        Ok(Self::new(quad, text, score))
    }

    pub(crate) fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    pub(crate) fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }
}

/// A block paired with its axis-aligned, skew-corrected bounding rectangle.
/// This is the typed replacement for the Python reference's `normalized_bbox`
/// string key (spec.md §9 REDESIGN FLAGS): it exists only for the duration
/// of a `parse` call and is stripped before any block is returned to a
/// caller.
#[derive(Debug, Clone)]
pub struct NormalizedBlock {
    pub rect: Rect,
    pub block: TextBlock,
}

impl NormalizedBlock {
    pub fn into_block(self) -> TextBlock {
        self.block
    }
}
