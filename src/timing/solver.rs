//! Search for register settings that hit a target bitrate.

use tracing::debug;

use crate::timing::error::Error;
use crate::timing::{BitTimingConfig, SYNC_SEG};

/// Hardware limits used to bound the timing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchBounds {
    pub prescaler_min: u32,
    pub prescaler_max: u32,
    pub tseg1_min: u32,
    pub tseg1_max: u32,
    pub tseg2_min: u32,
    pub tseg2_max: u32,
    pub sjw_max: u32,
}

impl Default for SearchBounds {
    /// Limits of an SJA1000 class controller.
    fn default() -> Self {
        Self {
            prescaler_min: 1,
            prescaler_max: 64,
            tseg1_min: 1,
            tseg1_max: 16,
            tseg2_min: 1,
            tseg2_max: 8,
            sjw_max: 4,
        }
    }
}

impl SearchBounds {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for (field, min, max) in [
            ("prescaler", self.prescaler_min, self.prescaler_max),
            ("tseg1", self.tseg1_min, self.tseg1_max),
            ("tseg2", self.tseg2_min, self.tseg2_max),
        ] {
            if min < 1 || min > max {
                return Err(Error::InvalidBounds { field, min, max });
            }
        }
        if self.sjw_max < 1 {
            return Err(Error::InvalidSjwBound);
        }
        Ok(())
    }
}

/// Policy for choosing the synchronization jump width of a candidate.
///
/// A larger jump width tolerates more clock drift between nodes, but some
/// integrations want a fixed small value instead, so the choice is left to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SjwPolicy {
    /// `min(4, tseg1, tseg2)`, additionally capped by the bounds' `sjw_max`.
    Conservative,
    /// The largest legal jump width, for maximum resynchronization margin.
    MaxMargin,
    /// Aim for a specific width, capped by the legal ceiling.
    Target(u32),
}

impl Default for SjwPolicy {
    fn default() -> Self {
        SjwPolicy::Conservative
    }
}

impl SjwPolicy {
    pub(crate) fn choose(&self, tseg1: u32, tseg2: u32, sjw_max: u32) -> u32 {
        let ceiling = sjw_max.min(tseg1).min(tseg2);
        let target = match self {
            SjwPolicy::Conservative => 4,
            SjwPolicy::MaxMargin => ceiling,
            SjwPolicy::Target(sjw) => *sjw,
        };
        target.clamp(1, ceiling)
    }
}

/// Enumerates register settings that reproduce a target bitrate exactly.
///
/// ```rust
/// use bittiming::timing::{SearchBounds, Solver};
///
/// let bounds = SearchBounds {
///     prescaler_min: 1,
///     prescaler_max: 16,
///     tseg1_min: 1,
///     tseg1_max: 31,
///     tseg2_min: 1,
///     tseg2_max: 31,
///     sjw_max: 4,
/// };
///
/// let candidates = Solver::with_bounds(bounds)
///     .solve(500_000, 80_000_000.0, 80.0, 0.5)
///     .unwrap();
///
/// let best = &candidates[0];
/// assert_eq!(best.bitrate_bps(), 500_000.0);
/// assert_eq!(best.sample_point_percent(), 80.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    bounds: SearchBounds,
    sjw_policy: SjwPolicy,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Solver with [`SearchBounds::default`] limits.
    pub fn new() -> Self {
        Self::with_bounds(SearchBounds::default())
    }

    pub fn with_bounds(bounds: SearchBounds) -> Self {
        Self {
            bounds,
            sjw_policy: SjwPolicy::default(),
        }
    }

    /// Overrides the jump width policy applied to every candidate.
    pub fn sjw_policy(mut self, sjw_policy: SjwPolicy) -> Self {
        self.sjw_policy = sjw_policy;
        self
    }

    /// Enumerates all settings within the bounds that hit `target_bitrate`
    /// exactly and sample within `tolerance_percent` of
    /// `sample_point_percent`.
    ///
    /// Candidates are ordered by increasing sample point deviation from the
    /// target; ties are broken in favor of more quanta per bit (finer time
    /// resolution), then lower `tseg1`. The result only depends on the
    /// arguments, identical calls return identically ordered candidates.
    ///
    /// An empty result means no integer combination reproduces the target,
    /// which is a valid outcome and not an error.
    pub fn solve(
        &self,
        target_bitrate: u32,
        clock_hz: f64,
        sample_point_percent: f64,
        tolerance_percent: f64,
    ) -> Result<Vec<BitTimingConfig>, Error> {
        self.bounds.validate()?;
        if target_bitrate == 0 {
            return Err(Error::InvalidBitrate);
        }
        if !clock_hz.is_finite() || clock_hz <= 0.0 {
            return Err(Error::InvalidClock { clock_hz });
        }
        if !sample_point_percent.is_finite()
            || sample_point_percent <= 0.0
            || sample_point_percent >= 100.0
        {
            return Err(Error::InvalidSamplePoint {
                sample_point: sample_point_percent,
            });
        }
        if !tolerance_percent.is_finite() || tolerance_percent < 0.0 {
            return Err(Error::InvalidTolerance {
                tolerance: tolerance_percent,
            });
        }

        let mut candidates = Vec::new();
        for (prescaler, tq_per_bit) in exact_divisions(target_bitrate, clock_hz, &self.bounds) {
            for (tseg1, tseg2) in splits(tq_per_bit, &self.bounds) {
                let sample_point = 100.0 * (SYNC_SEG + tseg1) as f64 / tq_per_bit as f64;
                let deviation = (sample_point - sample_point_percent).abs();
                if deviation > tolerance_percent {
                    continue;
                }

                let sjw = self.sjw_policy.choose(tseg1, tseg2, self.bounds.sjw_max);
                let timing = BitTimingConfig::new(clock_hz, prescaler, tseg1, tseg2, sjw)?;
                candidates.push((deviation, timing));
            }
        }

        candidates.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| b.1.bit_time_tq().cmp(&a.1.bit_time_tq()))
                .then_with(|| a.1.tseg1().cmp(&b.1.tseg1()))
        });

        debug!(
            "{} candidates for {} bps at {} Hz",
            candidates.len(),
            target_bitrate,
            clock_hz
        );

        Ok(candidates.into_iter().map(|(_, timing)| timing).collect())
    }
}

/// Prescalers within bounds whose implied whole number of quanta per bit
/// reproduces the target bitrate exactly.
pub(crate) fn exact_divisions(
    target_bitrate: u32,
    clock_hz: f64,
    bounds: &SearchBounds,
) -> Vec<(u32, u32)> {
    let tq_min = SYNC_SEG + bounds.tseg1_min + bounds.tseg2_min;
    let tq_max = SYNC_SEG + bounds.tseg1_max + bounds.tseg2_max;

    let mut divisions = Vec::new();
    for prescaler in bounds.prescaler_min..=bounds.prescaler_max {
        let ideal = clock_hz / (prescaler as f64 * target_bitrate as f64);
        let tq_per_bit = ideal.round() as u32;
        if tq_per_bit < tq_min || tq_per_bit > tq_max {
            continue;
        }

        let achieved = clock_hz / (prescaler as u64 * tq_per_bit as u64) as f64;
        if achieved != target_bitrate as f64 {
            continue;
        }

        divisions.push((prescaler, tq_per_bit));
    }
    divisions
}

/// Integer splits `tseg1 + tseg2 = tq_per_bit - 1` within bounds.
pub(crate) fn splits(tq_per_bit: u32, bounds: &SearchBounds) -> Vec<(u32, u32)> {
    let total = tq_per_bit - SYNC_SEG;

    let mut out = Vec::new();
    for tseg1 in bounds.tseg1_min..=bounds.tseg1_max {
        if tseg1 >= total {
            break;
        }
        let tseg2 = total - tseg1;
        if tseg2 < bounds.tseg2_min || tseg2 > bounds.tseg2_max {
            continue;
        }
        out.push((tseg1, tseg2));
    }
    out
}
