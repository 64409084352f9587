//! Register mapping for SJA1000 compatible controllers.

use std::fmt;

use crate::timing::BitTimingConfig;

/// The BTR0/BTR1 bit timing register pair of an SJA1000.
///
/// BTR0 packs the prescaler and jump width, BTR1 packs both time segments
/// and the triple sampling flag. All fields are stored minus one.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sja1000Registers {
    pub btr0: u8,
    pub btr1: u8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// Prescaler does not fit the 6 bit BTR0 field
    PrescalerTooLarge,
    /// TSEG1 does not fit the 4 bit BTR1 field
    Tseg1TooLarge,
    /// TSEG2 does not fit the 3 bit BTR1 field
    Tseg2TooLarge,
    /// SJW does not fit the 2 bit BTR0 field
    SjwTooLarge,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::PrescalerTooLarge => write!(fmt, "Prescaler Too Large"),
            Error::Tseg1TooLarge => write!(fmt, "TSEG1 Too Large"),
            Error::Tseg2TooLarge => write!(fmt, "TSEG2 Too Large"),
            Error::SjwTooLarge => write!(fmt, "SJW Too Large"),
        }
    }
}

impl std::error::Error for Error {}

impl Sja1000Registers {
    /// Packs a timing into the register pair.
    ///
    /// With `triple_sampling` the controller samples the bus three times per
    /// bit instead of once.
    pub fn new(timing: &BitTimingConfig, triple_sampling: bool) -> Result<Self, Error> {
        if timing.prescaler() > 64 {
            return Err(Error::PrescalerTooLarge);
        }
        if timing.tseg1() > 16 {
            return Err(Error::Tseg1TooLarge);
        }
        if timing.tseg2() > 8 {
            return Err(Error::Tseg2TooLarge);
        }
        if timing.sjw() > 4 {
            return Err(Error::SjwTooLarge);
        }

        let sam = triple_sampling as u8;
        let btr0 = ((timing.sjw() - 1) as u8) << 6 | (timing.prescaler() - 1) as u8;
        let btr1 = sam << 7 | ((timing.tseg2() - 1) as u8) << 4 | (timing.tseg1() - 1) as u8;

        Ok(Self { btr0, btr1 })
    }
}

impl TryFrom<&BitTimingConfig> for Sja1000Registers {
    type Error = crate::error::Error;

    fn try_from(timing: &BitTimingConfig) -> Result<Self, Self::Error> {
        Ok(Sja1000Registers::new(timing, false)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(prescaler: u32, tseg1: u32, tseg2: u32, sjw: u32) -> BitTimingConfig {
        BitTimingConfig::new(24_000_000.0, prescaler, tseg1, tseg2, sjw).unwrap()
    }

    #[test]
    fn packs_fields_minus_one() {
        let regs = Sja1000Registers::new(&timing(3, 15, 4, 2), false).unwrap();
        assert_eq!(regs.btr0, 0b0100_0010);
        assert_eq!(regs.btr1, 0b0011_1110);
    }

    #[test]
    fn triple_sampling_sets_the_sam_bit() {
        let regs = Sja1000Registers::new(&timing(3, 15, 4, 2), true).unwrap();
        assert_eq!(regs.btr1, 0b1011_1110);
    }

    #[test]
    fn extremes_fill_all_field_bits() {
        let regs = Sja1000Registers::new(&timing(64, 16, 8, 4), true).unwrap();
        assert_eq!(regs.btr0, 0xff);
        assert_eq!(regs.btr1, 0xff);
    }

    #[test]
    fn out_of_width_fields_rejected() {
        assert_eq!(
            Sja1000Registers::new(&timing(65, 16, 8, 4), false).unwrap_err(),
            Error::PrescalerTooLarge
        );
        assert_eq!(
            Sja1000Registers::new(&timing(64, 17, 8, 4), false).unwrap_err(),
            Error::Tseg1TooLarge
        );
        assert_eq!(
            Sja1000Registers::new(&timing(64, 16, 9, 4), false).unwrap_err(),
            Error::Tseg2TooLarge
        );
        assert_eq!(
            Sja1000Registers::new(&timing(64, 16, 8, 5), false).unwrap_err(),
            Error::SjwTooLarge
        );
    }

    #[test]
    fn try_from_defaults_to_single_sampling() {
        let regs = Sja1000Registers::try_from(&timing(3, 15, 4, 2)).unwrap();
        assert_eq!(regs.btr1 & 0x80, 0);
    }
}
