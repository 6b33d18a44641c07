//! Hardware Abstraction Layer for RustPskBeacon.
//!
//! Thin wrappers around the DAC and the periodic tick timer.
//! Signal generation stays in core modules, HAL is just I/O.

pub mod dac;
pub mod timer;

pub use dac::{DacConfig, Mcp4921, Mcp4921Error, SampleSink};
pub use timer::TickSourceConfig;
