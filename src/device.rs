//! Presets with the timing limits of known CAN controllers.

use strum_macros::{EnumIter, FromRepr};
use tracing::debug;

use crate::timing::solver::{exact_divisions, splits};
use crate::timing::{BitTimingConfig, SearchBounds, SjwPolicy, SYNC_SEG};

/// Standard classic CAN bitrates in kbit/s.
pub static CLASSIC_BITRATES_KBPS: &[u32] = &[250, 500, 800, 1000];

/// Standard CAN-FD data phase bitrates in kbit/s.
pub static FD_BITRATES_KBPS: &[u32] = &[250, 500, 800, 1000, 2000, 4000, 6000];

/// Timings sampling earlier than this are not worth listing.
const MIN_SAMPLE_POINT_PERCENT: f64 = 70.0;

/// Phase of a frame a set of timing limits applies to.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, EnumIter, FromRepr)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CanPhase {
    /// Arbitration phase (identifier, DLC). Classic CAN frames use this
    /// timing for the whole frame.
    Arbitration = 0,
    /// Data phase (payload). CAN-FD frames switch to the data bitrate here.
    Data = 1,
}

/// Timing limits of a device for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseTiming {
    pub phase: CanPhase,
    pub bounds: SearchBounds,
}

/// A CAN controller preset.
///
/// Presets are compiled in, so this only serializes and is never read back.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CanDevice {
    pub name: &'static str,
    pub comment: &'static str,
    /// Input clock frequency in Hz.
    pub clock_hz: f64,
    /// Maximum supported bitrate in kbit/s.
    pub max_bitrate_kbps: u32,
    /// Maximum supported CAN-FD data bitrate in kbit/s, 0 for classic-only
    /// devices.
    pub max_fd_bitrate_kbps: u32,
    pub timing: &'static [PhaseTiming],
}

pub static DEVICES: &[CanDevice] = &[
    CanDevice {
        name: "SJA1000",
        comment: "SJA1000 compatible CAN IP from OpenCores",
        clock_hz: 24_000_000.0,
        max_bitrate_kbps: 1000,
        max_fd_bitrate_kbps: 0,
        timing: &[PhaseTiming {
            phase: CanPhase::Arbitration,
            bounds: SearchBounds {
                prescaler_min: 1,
                prescaler_max: 64,
                tseg1_min: 1,
                tseg1_max: 16,
                tseg2_min: 1,
                tseg2_max: 8,
                sjw_max: 4,
            },
        }],
    },
    CanDevice {
        name: "XCANFD",
        comment: "Xilinx CANFD IP",
        clock_hz: 80_000_000.0,
        max_bitrate_kbps: 1000,
        max_fd_bitrate_kbps: 2000,
        timing: &[
            PhaseTiming {
                phase: CanPhase::Arbitration,
                bounds: SearchBounds {
                    prescaler_min: 1,
                    prescaler_max: 256,
                    tseg1_min: 1,
                    tseg1_max: 64,
                    tseg2_min: 1,
                    tseg2_max: 32,
                    sjw_max: 16,
                },
            },
            PhaseTiming {
                phase: CanPhase::Data,
                bounds: SearchBounds {
                    prescaler_min: 1,
                    prescaler_max: 256,
                    tseg1_min: 1,
                    tseg1_max: 16,
                    tseg2_min: 1,
                    tseg2_max: 8,
                    sjw_max: 4,
                },
            },
        ],
    },
];

/// Looks up a device preset by name.
pub fn get(name: &str) -> Result<&'static CanDevice, crate::error::Error> {
    DEVICES
        .iter()
        .find(|device| device.name == name)
        .ok_or(crate::error::Error::NotFound)
}

impl CanDevice {
    /// Timing limits for a phase, if the device supports it.
    pub fn bounds(&self, phase: CanPhase) -> Option<&'static SearchBounds> {
        self.timing
            .iter()
            .find(|timing| timing.phase == phase)
            .map(|timing| &timing.bounds)
    }

    /// Standard bitrates selectable for a phase, limited to what the device
    /// supports.
    pub fn bitrates_kbps(&self, phase: CanPhase) -> Vec<u32> {
        let (list, max) = match phase {
            CanPhase::Arbitration => (CLASSIC_BITRATES_KBPS, self.max_bitrate_kbps),
            CanPhase::Data => (FD_BITRATES_KBPS, self.max_fd_bitrate_kbps),
        };
        list.iter().copied().filter(|kbps| *kbps <= max).collect()
    }

    /// All register settings that hit `bitrate_bps` exactly on this device
    /// and sample no earlier than 70 % of the bit time.
    ///
    /// Rows are ordered by sample point, latest first, then by finer time
    /// resolution. Returns [`crate::Error::NotFound`] if the device has no
    /// limits for `phase`.
    pub fn timing_table(
        &self,
        phase: CanPhase,
        bitrate_bps: u32,
        sjw_policy: SjwPolicy,
    ) -> Result<Vec<BitTimingConfig>, crate::error::Error> {
        let bounds = self.bounds(phase).ok_or(crate::error::Error::NotFound)?;
        bounds.validate()?;

        let mut rows = Vec::new();
        for (prescaler, tq_per_bit) in exact_divisions(bitrate_bps, self.clock_hz, bounds) {
            for (tseg1, tseg2) in splits(tq_per_bit, bounds) {
                let sample_point = 100.0 * (SYNC_SEG + tseg1) as f64 / tq_per_bit as f64;
                if sample_point < MIN_SAMPLE_POINT_PERCENT {
                    continue;
                }

                let sjw = sjw_policy.choose(tseg1, tseg2, bounds.sjw_max);
                let timing = BitTimingConfig::new(self.clock_hz, prescaler, tseg1, tseg2, sjw)?;
                rows.push(timing);
            }
        }

        rows.sort_by(|a, b| {
            b.sample_point_percent()
                .total_cmp(&a.sample_point_percent())
                .then_with(|| b.bit_time_tq().cmp(&a.bit_time_tq()))
        });

        debug!(
            "{}: {} timings for {} bps in the {:?} phase",
            self.name,
            rows.len(),
            bitrate_bps,
            phase
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn presets_are_well_formed() {
        for device in DEVICES {
            for timing in device.timing {
                assert!(timing.bounds.validate().is_ok(), "{}", device.name);
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(get("SJA1000").unwrap().max_bitrate_kbps, 1000);
        assert_eq!(get("MCP2515").unwrap_err(), crate::error::Error::NotFound);
    }

    #[test]
    fn classic_device_has_no_data_phase() {
        let device = get("SJA1000").unwrap();
        assert!(device.bounds(CanPhase::Arbitration).is_some());
        assert!(device.bounds(CanPhase::Data).is_none());

        let err = device
            .timing_table(CanPhase::Data, 500_000, SjwPolicy::default())
            .unwrap_err();
        assert_eq!(err, crate::error::Error::NotFound);
    }

    #[test]
    fn fd_device_covers_both_phases() {
        let device = get("XCANFD").unwrap();
        for phase in CanPhase::iter() {
            assert!(device.bounds(phase).is_some());
        }
    }

    #[test]
    fn bitrate_lists_respect_device_maximums() {
        let sja1000 = get("SJA1000").unwrap();
        assert_eq!(
            sja1000.bitrates_kbps(CanPhase::Arbitration),
            vec![250, 500, 800, 1000]
        );
        assert!(sja1000.bitrates_kbps(CanPhase::Data).is_empty());

        let xcanfd = get("XCANFD").unwrap();
        assert_eq!(
            xcanfd.bitrates_kbps(CanPhase::Data),
            vec![250, 500, 800, 1000, 2000]
        );
    }

    #[test]
    fn sja1000_table_for_500k() {
        let device = get("SJA1000").unwrap();
        let rows = device
            .timing_table(CanPhase::Arbitration, 500_000, SjwPolicy::default())
            .unwrap();

        assert!(!rows.is_empty());
        for row in &rows {
            assert_eq!(row.bitrate_bps(), 500_000.0);
            assert!(row.sample_point_percent() >= 70.0);
        }

        // Latest sample point first.
        let points: Vec<f64> = rows.iter().map(|r| r.sample_point_percent()).collect();
        let mut sorted = points.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(points, sorted);
    }

    #[test]
    fn phase_round_trips_through_repr() {
        assert_eq!(CanPhase::from_repr(0), Some(CanPhase::Arbitration));
        assert_eq!(CanPhase::from_repr(1), Some(CanPhase::Data));
        assert_eq!(CanPhase::from_repr(2), None);
    }
}
