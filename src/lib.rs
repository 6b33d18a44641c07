//! # RustPskBeacon
//!
//! Signal-generation core of a PSK beacon transmitter: a 121-bit,
//! BCH-protected frame phase-modulated onto a 40 kHz carrier, one
//! 12-bit DAC sample per 5 µs tick.
//!
//! ## Architecture
//!
//! The frame and the waveform tables are built once and consumed
//! read-only; [`SampleScheduler`] owns every mutable counter and is
//! ticked from exactly one context. No locks anywhere: the probe,
//! fault latch and log ring are the only cross-context surfaces and
//! all are lock-free.
//!
//! The core is pure logic and runs on the host; hardware lives in
//! [`hal`] and the `beacon` binary.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod bch;
pub mod frame;
pub mod waveform;
pub mod scheduler;
pub mod probe;
pub mod fault;
pub mod logging;
pub mod log_globals;
pub mod uart_logger;
pub mod hal;

pub use config::FrameConfig;
pub use frame::BeaconFrame;
pub use scheduler::{SampleScheduler, TxPhase};
pub use probe::TxProbe;
pub use fault::{FaultCode, FaultState};
pub use log_globals::TX_LOG_STREAM;
