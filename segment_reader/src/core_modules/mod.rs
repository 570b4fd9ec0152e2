pub mod digit_sampler;
pub mod display_segmenter;
pub mod morphology;
pub mod pixel;
pub mod reading;
pub mod segment_classifier;
pub mod threshold;
pub mod utils;
