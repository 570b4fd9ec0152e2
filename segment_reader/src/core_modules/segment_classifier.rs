// THEORY:
// The `segment_classifier` is the last and simplest stage of per-digit analysis.
// A seven-segment glyph is fully described by which of its seven bars are lit, so
// recognising a digit is a closed lookup: the pattern either is one of the eleven
// glyphs the instrument can show, or it is not a glyph at all.
//
// The table is data, not logic. There is no nearest-neighbor matching and no
// learning; a single mis-sampled segment makes the digit unmatched, and the
// assembler decides what an unmatched digit means for the whole reading.

use std::fmt;

/// One of the seven bars of a digit, in sampling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Top,
    UpperLeft,
    UpperRight,
    Center,
    LowerLeft,
    LowerRight,
    Bottom,
}

impl Segment {
    /// All segments in the fixed pattern order.
    pub const ALL: [Segment; 7] = [
        Segment::Top,
        Segment::UpperLeft,
        Segment::UpperRight,
        Segment::Center,
        Segment::LowerLeft,
        Segment::LowerRight,
        Segment::Bottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The on/off state of a digit's seven segments, ordered as `Segment::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentPattern(pub [bool; 7]);

impl SegmentPattern {
    /// Builds a pattern from 0/1 flags, the notation of the lookup table.
    pub const fn from_bits(bits: [u8; 7]) -> Self {
        let mut lit = [false; 7];
        let mut i = 0;
        while i < 7 {
            lit[i] = bits[i] != 0;
            i += 1;
        }
        Self(lit)
    }

    pub fn is_lit(&self, segment: Segment) -> bool {
        self.0[segment.index()]
    }

    pub fn lit_count(&self) -> usize {
        self.0.iter().filter(|&&on| on).count()
    }
}

impl fmt::Display for SegmentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for on in self.0 {
            write!(f, "{}", if on { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// A glyph the display can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitSymbol {
    Digit(u8),
    Minus,
}

impl DigitSymbol {
    pub fn as_char(self) -> char {
        match self {
            DigitSymbol::Digit(d) => char::from(b'0' + d),
            DigitSymbol::Minus => '-',
        }
    }
}

impl fmt::Display for DigitSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pattern -> glyph table for the instrument's display.
pub const DIGIT_LOOKUP: [(SegmentPattern, DigitSymbol); 11] = [
    (SegmentPattern::from_bits([1, 1, 1, 0, 1, 1, 1]), DigitSymbol::Digit(0)),
    (SegmentPattern::from_bits([0, 0, 1, 0, 0, 1, 0]), DigitSymbol::Digit(1)),
    (SegmentPattern::from_bits([1, 0, 1, 1, 1, 0, 1]), DigitSymbol::Digit(2)),
    (SegmentPattern::from_bits([1, 0, 1, 1, 0, 1, 1]), DigitSymbol::Digit(3)),
    (SegmentPattern::from_bits([0, 1, 1, 1, 0, 1, 0]), DigitSymbol::Digit(4)),
    (SegmentPattern::from_bits([1, 1, 0, 1, 0, 1, 1]), DigitSymbol::Digit(5)),
    (SegmentPattern::from_bits([1, 1, 0, 1, 1, 1, 1]), DigitSymbol::Digit(6)),
    (SegmentPattern::from_bits([1, 0, 1, 0, 0, 1, 0]), DigitSymbol::Digit(7)),
    (SegmentPattern::from_bits([1, 1, 1, 1, 1, 1, 1]), DigitSymbol::Digit(8)),
    (SegmentPattern::from_bits([1, 1, 1, 1, 0, 1, 1]), DigitSymbol::Digit(9)),
    (SegmentPattern::from_bits([0, 0, 0, 1, 0, 0, 0]), DigitSymbol::Minus),
];

/// Exact-match lookup. `None` means the pattern is not a glyph.
pub fn classify(pattern: &SegmentPattern) -> Option<DigitSymbol> {
    DIGIT_LOOKUP
        .iter()
        .find(|(key, _)| key == pattern)
        .map(|&(_, symbol)| symbol)
}

/// Reverse lookup, used to render glyphs (synthetic fixtures, diagnostics).
pub fn pattern_for(symbol: DigitSymbol) -> Option<SegmentPattern> {
    DIGIT_LOOKUP
        .iter()
        .find(|(_, s)| *s == symbol)
        .map(|&(pattern, _)| pattern)
}
