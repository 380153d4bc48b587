//! Pitch contour processing.

pub mod fir;
pub mod processor;

pub use fir::{LowPassCutoff, convolve, design_lowpass};
pub use processor::{
    ContourProcessor, LeadingFill, ProcessedContour, freq_to_note, interpolate, note_center,
    resample, transpose,
};
