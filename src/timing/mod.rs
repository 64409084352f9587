//! CAN bit timing parameters and the values derived from them.
//!
//! A CAN bit is divided into four segments, measured in time quanta:
//!
//! ```text
//! <---------------- bit time ---------------->
//! --------------------------------------------
//! |  SYNC   |  PROP   |  PHASE1   !  PHASE2  |
//! --------------------------------------------
//!           <-------TSEG1---------><--TSEG2-->
//! ```
//!
//! The sync segment is fixed at one quantum, `TSEG1` covers propagation and
//! phase segment 1, and the bus is sampled at the `!` mark between `TSEG1`
//! and `TSEG2`. One time quantum is the input clock period multiplied by the
//! prescaler, so the bitrate and sample point follow directly from the
//! register values. [`BitTimingConfig`] holds the register values and
//! computes the derived quantities; [`Solver`] runs the search in the other
//! direction.

pub mod error;
pub mod solver;

pub use error::Error;
pub use solver::{SearchBounds, SjwPolicy, Solver};

/// The synchronization segment is one time quantum long by the CAN standard.
pub const SYNC_SEG: u32 = 1;

/// Validated bit timing register parameters for a single CAN phase.
///
/// Construction checks every field, so a value of this type always describes
/// a timing a controller could be programmed with. The derived quantities
/// are recomputed on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitTimingConfig {
    clock_hz: f64,
    prescaler: u32,
    tseg1: u32,
    tseg2: u32,
    sjw: u32,
}

/// Values implied by a [`BitTimingConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedTiming {
    /// Duration of one time quantum in seconds.
    pub time_quantum_s: f64,
    /// Number of time quanta in one bit time.
    pub tq_per_bit: u32,
    /// Bitrate in bits per second.
    pub bitrate_bps: f64,
    /// Sample point position inside the bit time in percent.
    pub sample_point_percent: f64,
}

impl BitTimingConfig {
    /// Validates the parameters and builds a config.
    ///
    /// `tseg1` is the combined propagation and phase 1 segment length in
    /// time quanta, `tseg2` the phase 2 segment length. `sjw` must not
    /// exceed either segment.
    pub fn new(
        clock_hz: f64,
        prescaler: u32,
        tseg1: u32,
        tseg2: u32,
        sjw: u32,
    ) -> Result<Self, Error> {
        if !clock_hz.is_finite() || clock_hz <= 0.0 {
            return Err(Error::InvalidClock { clock_hz });
        }
        if prescaler < 1 {
            return Err(Error::InvalidPrescaler);
        }
        if tseg1 < 1 {
            return Err(Error::InvalidTseg1);
        }
        if tseg2 < 1 {
            return Err(Error::InvalidTseg2);
        }
        if sjw < 1 {
            return Err(Error::InvalidSjw);
        }

        let limit = std::cmp::min(tseg1, tseg2);
        if sjw > limit {
            return Err(Error::SjwOutOfRange { sjw, limit });
        }

        Ok(Self {
            clock_hz,
            prescaler,
            tseg1,
            tseg2,
            sjw,
        })
    }

    /// Input clock frequency in Hz.
    pub fn clock_hz(&self) -> f64 {
        self.clock_hz
    }

    /// Prescaler dividing the input clock into time quanta.
    pub fn prescaler(&self) -> u32 {
        self.prescaler
    }

    /// Time segment 1 (propagation segment + phase segment 1) in time quanta.
    pub fn tseg1(&self) -> u32 {
        self.tseg1
    }

    /// Time segment 2 (phase segment 2) in time quanta.
    pub fn tseg2(&self) -> u32 {
        self.tseg2
    }

    /// Synchronization jump width in time quanta.
    pub fn sjw(&self) -> u32 {
        self.sjw
    }

    /// Duration of one time quantum in seconds.
    pub fn time_quantum_s(&self) -> f64 {
        self.prescaler as f64 / self.clock_hz
    }

    /// Duration of one bit in time quanta.
    pub fn bit_time_tq(&self) -> u32 {
        SYNC_SEG + self.tseg1 + self.tseg2
    }

    /// Bitrate in bits per second.
    ///
    /// Computed as `clock / (prescaler * quanta per bit)` so the integer
    /// product stays exact before the single division.
    pub fn bitrate_bps(&self) -> f64 {
        self.clock_hz / (self.prescaler as u64 * self.bit_time_tq() as u64) as f64
    }

    /// Sample point position inside the bit time in percent.
    pub fn sample_point_percent(&self) -> f64 {
        100.0 * (SYNC_SEG + self.tseg1) as f64 / self.bit_time_tq() as f64
    }

    /// Computes all derived values at once.
    pub fn derive(&self) -> DerivedTiming {
        DerivedTiming {
            time_quantum_s: self.time_quantum_s(),
            tq_per_bit: self.bit_time_tq(),
            bitrate_bps: self.bitrate_bps(),
            sample_point_percent: self.sample_point_percent(),
        }
    }
}

impl std::fmt::Display for BitTimingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "prescaler={} tseg1={} tseg2={} sjw={}",
            self.prescaler, self.tseg1, self.tseg2, self.sjw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_500k_at_80mhz() {
        let timing = BitTimingConfig::new(80_000_000.0, 8, 15, 4, 1).unwrap();
        let derived = timing.derive();

        assert_eq!(derived.time_quantum_s, 1.0e-7);
        assert_eq!(derived.tq_per_bit, 20);
        assert_eq!(derived.bitrate_bps, 500_000.0);
        assert_eq!(derived.sample_point_percent, 80.0);
    }

    #[test]
    fn bit_time_identity() {
        for (tseg1, tseg2) in [(1, 1), (15, 4), (16, 8), (63, 31)] {
            let timing = BitTimingConfig::new(24_000_000.0, 2, tseg1, tseg2, 1).unwrap();
            assert_eq!(timing.bit_time_tq(), 1 + tseg1 + tseg2);

            let sp = timing.sample_point_percent();
            assert!(sp > 0.0 && sp < 100.0);
        }
    }

    #[test]
    fn minimum_config() {
        let timing = BitTimingConfig::new(8_000_000.0, 1, 1, 1, 1).unwrap();
        assert_eq!(timing.bit_time_tq(), 3);
    }

    #[test]
    fn zero_prescaler_rejected() {
        let err = BitTimingConfig::new(80_000_000.0, 0, 15, 4, 1).unwrap_err();
        assert_eq!(err, Error::InvalidPrescaler);
    }

    #[test]
    fn zero_segments_rejected() {
        assert_eq!(
            BitTimingConfig::new(80_000_000.0, 8, 0, 4, 1).unwrap_err(),
            Error::InvalidTseg1
        );
        assert_eq!(
            BitTimingConfig::new(80_000_000.0, 8, 15, 0, 1).unwrap_err(),
            Error::InvalidTseg2
        );
    }

    #[test]
    fn sjw_above_segments_rejected() {
        let err = BitTimingConfig::new(80_000_000.0, 8, 2, 2, 3).unwrap_err();
        assert_eq!(err, Error::SjwOutOfRange { sjw: 3, limit: 2 });
    }

    #[test]
    fn non_positive_clock_rejected() {
        for clock_hz in [0.0, -80_000_000.0, f64::NAN, f64::INFINITY] {
            let err = BitTimingConfig::new(clock_hz, 8, 15, 4, 1).unwrap_err();
            assert!(matches!(err, Error::InvalidClock { .. }));
        }
    }
}
