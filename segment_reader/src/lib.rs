// THEORY:
// This file is the main entry point for the `segment_reader` library crate.
// It exports the `DisplayDecoder` and its associated data structures
// (`DecoderConfig`, `FrameAnalysis`, `Reading`, `ThresholdBounds`) as the
// high-level interface for reading a seven-segment LED display out of a camera
// frame. The individual stages live in `core_modules` and stay usable on their
// own for tests and diagnostics.
//
// Callers that need to chew through a backlog of frames use the
// `parallel_pipeline::BatchDecoder` instead; it runs the same decoder on a
// tokio worker pool.

pub mod core_modules;
pub mod pipeline;
pub mod parallel_pipeline;

pub use core_modules::reading::{Reading, UnreadableCause, UNREADABLE_TOKEN};
pub use core_modules::threshold::{HsvTriple, ThresholdBounds};
pub use parallel_pipeline::{BatchDecoder, BatchError};
pub use pipeline::{ConfigError, DecoderConfig, DisplayDecoder, FrameAnalysis};
