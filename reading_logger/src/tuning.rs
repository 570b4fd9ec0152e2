// THEORY:
// The tuning file keeps the operator's threshold sliders between sessions. It is a
// flat list of seven integers, one per line, in a fixed order: the low HSV corner,
// the high HSV corner, then the camera focus step. It is read once at start-up
// and, on request, written back when the logger exits.

use anyhow::Context;
use segment_reader::{HsvTriple, ThresholdBounds};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_TUNING_FILE: &str = "gui_values.txt";

/// Upper limit of each value, in file order.
const LIMITS: [(&str, u32); 7] = [
    ("low_H", 179),
    ("low_S", 255),
    ("low_V", 255),
    ("high_H", 179),
    ("high_S", 255),
    ("high_V", 255),
    ("focus", 51),
];

/// Focus steps are multiplied by this before they reach the camera.
pub const FOCUS_STEP: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TuningError {
    #[error("expected {expected} values, found {found}")]
    WrongCount { expected: usize, found: usize },
    #[error("line {line}: {text:?} is not an integer")]
    NotAnInteger { line: usize, text: String },
    #[error("{name} = {value} is outside 0..={max}")]
    OutOfRange { name: &'static str, value: i64, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningConfig {
    pub bounds: ThresholdBounds,
    /// Focus slider position; the camera receives `focus * FOCUS_STEP`.
    pub focus: u8,
}

impl Default for TuningConfig {
    /// Saturated red, the color of the instrument's LEDs.
    fn default() -> Self {
        Self {
            bounds: ThresholdBounds::new(HsvTriple::new(0, 100, 100), HsvTriple::new(10, 255, 255)),
            focus: 5,
        }
    }
}

impl TuningConfig {
    pub fn parse(text: &str) -> Result<Self, TuningError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .collect();
        if lines.len() != LIMITS.len() {
            return Err(TuningError::WrongCount {
                expected: LIMITS.len(),
                found: lines.len(),
            });
        }

        let mut values = [0u8; 7];
        for (slot, ((line, text), (name, max))) in lines.into_iter().zip(LIMITS).enumerate() {
            let value: i64 = text.parse().map_err(|_| TuningError::NotAnInteger {
                line,
                text: text.to_string(),
            })?;
            if !(0..=max as i64).contains(&value) {
                return Err(TuningError::OutOfRange { name, value, max });
            }
            values[slot] = value as u8;
        }

        Ok(Self {
            bounds: ThresholdBounds::from_values([values[0], values[1], values[2], values[3], values[4], values[5]]),
            focus: values[6],
        })
    }

    /// Seven lines, no trailing newline.
    pub fn format(&self) -> String {
        self.bounds
            .to_values()
            .iter()
            .chain(std::iter::once(&self.focus))
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Reads the tuning file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::warn!("tuning file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing tuning file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.format())
            .with_context(|| format!("writing tuning file {}", path.display()))
    }

    /// Value handed to the camera's focus control.
    pub fn camera_focus(&self) -> u32 {
        self.focus as u32 * FOCUS_STEP
    }
}

/// Parses the `--bounds lh,ls,lv,hh,hs,hv` override.
pub fn parse_bounds(arg: &str) -> Result<ThresholdBounds, String> {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(format!("expected 6 comma-separated values, got {}", parts.len()));
    }
    let mut values = [0u8; 6];
    for (slot, (part, (name, max))) in parts.iter().zip(LIMITS).enumerate() {
        let value: u32 = part.parse().map_err(|_| format!("{name}: {part:?} is not an integer"))?;
        if value > max {
            return Err(format!("{name} = {value} is outside 0..={max}"));
        }
        values[slot] = value as u8;
    }
    Ok(ThresholdBounds::from_values(values))
}
