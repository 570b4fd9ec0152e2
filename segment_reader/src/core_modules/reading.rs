// THEORY:
// The `reading` module turns per-cell results into the one number the logger
// records for a tick. It drives the segmenter -> sampler -> classifier chain over
// all digit cells and then applies a deliberately strict policy:
//
// 1.  **Sign Slot**: The leftmost cell holds the minus sign when the value is
//     negative and is dark otherwise. An unmatched leftmost cell is therefore
//     read as "no sign" and dropped. No other cell gets this treatment.
// 2.  **All or Nothing**: Any remaining unmatched cell makes the whole reading
//     unreadable. A partially decoded number is never reported.
// 3.  **Sign Position**: A minus is accepted only as the first remaining symbol.
//     A minus anywhere else is treated as a misread.
// 4.  **Implied Decimal Point**: The display's decimal point is not sampled; the
//     digit string is parsed as an integer and divided by a fixed scale.
//
// "Unreadable" is an ordinary value carrying its cause, never an error: a bad
// tick is logged and the next tick starts from scratch.

use crate::core_modules::digit_sampler::digit_sampler;
use crate::core_modules::display_segmenter::{display_segmenter, DisplayRegion};
use crate::core_modules::segment_classifier::{classify, DigitSymbol};
use crate::pipeline::DecoderConfig;
use image::GrayImage;
use log::debug;
use std::fmt;
use std::num::IntErrorKind;

/// Token written for readings that could not be decoded.
pub const UNREADABLE_TOKEN: &str = "unreadable";

/// Why a tick produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnreadableCause {
    /// The mask had no active pixel.
    NoDisplayFound,
    /// A cell's segment pattern is not a glyph.
    SegmentMismatch { cell: usize },
    /// A minus sign appeared after the first symbol.
    MisplacedSign { cell: usize },
    /// The digit string does not fit the integer range.
    Overflow,
}

/// The decoded value of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reading {
    Value(f64),
    Unreadable(UnreadableCause),
}

impl Reading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Unreadable(_) => None,
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, Reading::Value(_))
    }
}

impl fmt::Display for Reading {
    /// Four decimals (the implied precision of the display) or `unreadable`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{v:.4}"),
            Reading::Unreadable(_) => f.write_str(UNREADABLE_TOKEN),
        }
    }
}

/// Samples and classifies every cell of the region, left to right.
pub fn read_cells(region: &DisplayRegion, fill_threshold: f64) -> Vec<Option<DigitSymbol>> {
    region
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let pattern = digit_sampler::sample(&region.cell_image(cell), fill_threshold);
            let symbol = classify(&pattern);
            debug!("cell {index} at x={} w={}: pattern {pattern} -> {symbol:?}", cell.x, cell.width);
            symbol
        })
        .collect()
}

/// Applies the sign-slot and all-or-nothing policy to classified cells.
pub fn assemble_symbols(symbols: &[Option<DigitSymbol>], decimal_scale: f64) -> Reading {
    // Carry each symbol's cell index for diagnostics.
    let mut remaining: Vec<(usize, Option<DigitSymbol>)> = symbols.iter().copied().enumerate().collect();
    if matches!(remaining.first(), Some((_, None))) {
        remaining.remove(0);
    }

    let mut digits = String::with_capacity(remaining.len());
    for (position, &(cell, symbol)) in remaining.iter().enumerate() {
        match symbol {
            None => return Reading::Unreadable(UnreadableCause::SegmentMismatch { cell }),
            Some(DigitSymbol::Minus) if position != 0 => {
                return Reading::Unreadable(UnreadableCause::MisplacedSign { cell });
            }
            Some(symbol) => digits.push(symbol.as_char()),
        }
    }

    match digits.parse::<i64>() {
        Ok(number) => Reading::Value(number as f64 / decimal_scale),
        Err(err) => {
            debug!("digit string {digits:?} did not parse: {err}");
            match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Reading::Unreadable(UnreadableCause::Overflow),
                // A lone sign, or no cells at all.
                _ => Reading::Unreadable(UnreadableCause::SegmentMismatch {
                    cell: remaining.first().map_or(0, |&(cell, _)| cell),
                }),
            }
        }
    }
}

/// Full mask -> reading chain.
pub fn assemble(mask: &GrayImage, config: &DecoderConfig) -> Reading {
    match display_segmenter::segment(mask, config) {
        Some(region) => assemble_symbols(&read_cells(&region, config.fill_threshold), config.decimal_scale),
        None => Reading::Unreadable(UnreadableCause::NoDisplayFound),
    }
}
