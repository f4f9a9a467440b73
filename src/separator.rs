// SPDX-License-Identifier: MIT
//! The word separator oracle (spec.md §4.C): a pure function mapping a
//! trailing/leading character pair to the separator that should sit between
//! them.

use icu_properties::props::GeneralCategory;
use icu_properties::CodePointMapData;

use crate::block::Separator;

/// CJK Unicode ranges, plus the full-width punctuation/symbol blocks that
/// travel with CJK text (spec.md §4.C). Grounded on the same range-table
/// shape used elsewhere in the pack for CJK detection.
const CJK_RANGES: &[(u32, u32)] = &[
    (0x4E00, 0x9FFF),   // CJK Unified Ideographs
    (0x3040, 0x30FF),   // Hiragana / Katakana
    (0x1100, 0x11FF),   // Hangul Jamo
    (0x3130, 0x318F),   // Hangul Compatibility Jamo
    (0xAC00, 0xD7AF),   // Hangul Syllables
    (0x3000, 0x303F),   // CJK Symbols and Punctuation
    (0xFE30, 0xFE4F),   // CJK Compatibility Forms
    (0xFF00, 0xFFEF),   // Halfwidth and Fullwidth Forms
];

/// Whether `c` falls in one of the CJK/CJK-punctuation ranges.
pub fn is_cjk(c: char) -> bool {
    let code = c as u32;
    CJK_RANGES
        .iter()
        .any(|&(start, end)| code >= start && code <= end)
}

/// Whether `c`'s Unicode general category is any of the punctuation
/// categories (general category starts with `P`).
fn is_punctuation(c: char) -> bool {
    matches!(
        CodePointMapData::<GeneralCategory>::new().as_borrowed().get(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Maps the last character of one line/block and the first character of the
/// next to the separator that should sit between them (spec.md §4.C):
///
/// - both CJK -> no separator
/// - trailing char is a hyphen -> no separator (soft hyphenation)
/// - leading char is any punctuation -> no separator
/// - otherwise -> a space
pub fn word_separator(c1: char, c2: char) -> Separator {
    if is_cjk(c1) && is_cjk(c2) {
        return Separator::Empty;
    }
    if c1 == '-' {
        return Separator::Empty;
    }
    if is_punctuation(c2) {
        return Separator::Empty;
    }
    Separator::Space
}

/// Same as [`word_separator`] but tolerant of blocks with empty text
/// (spec.md §7: an empty text string is treated as having no trailing or
/// leading character, and the oracle defaults to a space).
pub fn word_separator_opt(c1: Option<char>, c2: Option<char>) -> Separator {
    match (c1, c2) {
        (Some(a), Some(b)) => word_separator(a, b),
        _ => Separator::Space,
    }
}
