//! Error types for bit timing validation.

use thiserror::Error;

/// Validation error for bit timing parameters and search bounds.
///
/// Each variant names the offending field and the rule it violates, so the
/// message can be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("clock_hz must be a positive finite frequency, got {clock_hz}")]
    InvalidClock { clock_hz: f64 },
    #[error("prescaler must be at least 1")]
    InvalidPrescaler,
    #[error("tseg1 must be at least 1")]
    InvalidTseg1,
    #[error("tseg2 must be at least 1")]
    InvalidTseg2,
    #[error("sjw must be at least 1")]
    InvalidSjw,
    #[error("sjw {sjw} is greater than min(tseg1, tseg2) = {limit}")]
    SjwOutOfRange { sjw: u32, limit: u32 },
    #[error("target bitrate must be greater than 0")]
    InvalidBitrate,
    #[error("sample point target must be between 0 and 100 percent, got {sample_point}")]
    InvalidSamplePoint { sample_point: f64 },
    #[error("sample point tolerance must be non-negative and finite, got {tolerance}")]
    InvalidTolerance { tolerance: f64 },
    #[error("{field} range [{min}, {max}] is empty or starts below 1")]
    InvalidBounds {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("sjw_max must be at least 1")]
    InvalidSjwBound,
}
