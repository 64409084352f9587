//! # The Bittiming Crate
//! Welcome to the `bittiming` crate documentation. The purpose of this crate is to convert CAN and CAN-FD bit timing register parameters into the values they imply on the bus, and to search for register settings that hit a target bitrate.
//!
//! ## Computing Derived Values
//!
//! A validated [`timing::BitTimingConfig`] knows its time quantum, bitrate and sample point.
//!
//! ```rust
//! let timing = bittiming::timing::BitTimingConfig::new(80_000_000.0, 8, 15, 4, 1).unwrap();
//! let derived = timing.derive();
//!
//! assert_eq!(derived.time_quantum_s, 1.0e-7);
//! assert_eq!(derived.tq_per_bit, 20);
//! assert_eq!(derived.bitrate_bps, 500_000.0);
//! assert_eq!(derived.sample_point_percent, 80.0);
//! ```
//!
//! ## Searching For Register Settings
//!
//! The [`timing::Solver`] runs the calculation in the other direction: given a target bitrate, a clock and a sample point target it enumerates every register combination that hits the bitrate exactly, best sample point match first.
//!
//! ```rust
//! let candidates = bittiming::timing::Solver::new()
//!     .solve(500_000, 80_000_000.0, 87.5, 5.0)
//!     .unwrap();
//!
//! for timing in &candidates {
//!     println!("{}\t{:.1} %", timing, timing.sample_point_percent());
//! }
//! ```
//!
//! ## Device Presets
//!
//! The [`device`] module ships the timing limits of known controllers, so a frontend only needs to pick a device and a bitrate.
//!
//! ```rust
//! use bittiming::device::{self, CanPhase};
//! use bittiming::timing::SjwPolicy;
//!
//! let device = device::get("SJA1000").unwrap();
//! let table = device
//!     .timing_table(CanPhase::Arbitration, 500_000, SjwPolicy::default())
//!     .unwrap();
//!
//! assert!(!table.is_empty());
//! ```

pub mod device;
mod error;
pub mod registers;
pub mod timing;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
