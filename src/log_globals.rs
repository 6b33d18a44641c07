//! Global log stream instance.
//!
//! Single stream: the transmitter has one producing context at a
//! time (boot until the tick source is enabled, the tick context
//! afterwards) and one draining context (the idle loop).

use crate::logging::LogStream;

/// Transmitter log stream.
pub static TX_LOG_STREAM: LogStream = LogStream::new();
