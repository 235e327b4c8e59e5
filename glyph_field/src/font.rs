//! Bold 8×8 bitmap glyphs and proportional single-line layout.
//!
//! Glyph rows come from `font8x8`'s basic Latin table (bit 0 = leftmost
//! pixel). Emboldening smears every row one column to the right, so a bold
//! glyph is up to [`BOLD_COLS`] columns wide. Layout packs glyphs by their
//! inked columns, which keeps symmetric letters centred on their own axis.

use font8x8::legacy::BASIC_LEGACY;

pub const GLYPH_ROWS: usize = 8;
pub const BOLD_COLS:  usize = 9;

/// Advance, in font columns, of a glyph with no ink (space, controls).
pub const BLANK_ADVANCE: usize = 4;

/// Blank columns between neighbouring glyphs.
pub const TRACKING: usize = 1;

/// Regular-weight rows for `ch`; characters outside the table render as `?`.
pub fn glyph_bits(ch: char) -> [u8; GLYPH_ROWS] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Bold rows for `ch`.
pub fn bold_rows(ch: char) -> [u16; GLYPH_ROWS] {
    glyph_bits(ch).map(|r| {
        let r = r as u16;
        r | (r << 1)
    })
}

/// Leftmost and rightmost inked column of a glyph, or `None` when blank.
pub fn ink_columns(rows: &[u16; GLYPH_ROWS]) -> Option<(usize, usize)> {
    let mask = rows.iter().fold(0u16, |acc, &r| acc | r);
    if mask == 0 { return None; }
    let lo = mask.trailing_zeros() as usize;
    let hi = 15 - mask.leading_zeros() as usize;
    Some((lo, hi))
}

/// One inked glyph positioned on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub rows:   [u16; GLYPH_ROWS],
    /// First inked source column; drawing starts here.
    pub skip:   usize,
    /// Line column where the glyph's first inked column lands.
    pub column: usize,
    /// Inked width in columns.
    pub width:  usize,
}

/// A laid-out line of text, in font columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    pub glyphs:  Vec<PlacedGlyph>,
    pub columns: usize,
}

/// Lay `text` out on one line.
pub fn layout(text: &str) -> TextLayout {
    let mut glyphs = Vec::new();
    let mut cursor = 0usize;
    for (i, ch) in text.chars().enumerate() {
        if i > 0 { cursor += TRACKING; }
        let rows = bold_rows(ch);
        match ink_columns(&rows) {
            Some((lo, hi)) => {
                let width = hi - lo + 1;
                glyphs.push(PlacedGlyph { rows, skip: lo, column: cursor, width });
                cursor += width;
            }
            None => cursor += BLANK_ADVANCE,
        }
    }
    TextLayout { glyphs, columns: cursor }
}
