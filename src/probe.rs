//! Debug probe: mirror of the last DAC word written.
//!
//! The tick context records each sample after latching it to the
//! DAC; diagnostics and the test harness read the mirror from any
//! context without disturbing timing.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

/// Atomic mirror of the transmit output.
///
/// Written once per tick by the tick context; readable concurrently.
pub struct TxProbe {
    /// Last DAC word written.
    last_sample: AtomicU16,

    /// Ticks since boot (wraps at u32).
    tick_count: AtomicU32,
}

impl TxProbe {
    /// Create a probe with no samples recorded.
    pub const fn new() -> Self {
        Self {
            last_sample: AtomicU16::new(0),
            tick_count: AtomicU32::new(0),
        }
    }

    /// Record one emitted sample. Called from the tick context only.
    #[inline]
    pub fn record(&self, sample: u16) {
        self.last_sample.store(sample, Ordering::Release);
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Last DAC word written.
    #[inline]
    pub fn last_sample(&self) -> u16 {
        self.last_sample.load(Ordering::Acquire)
    }

    /// Total ticks recorded since boot.
    #[inline]
    pub fn tick_count(&self) -> u32 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Consistent snapshot for diagnostics.
    #[inline]
    pub fn snapshot(&self) -> ProbeSnapshot {
        ProbeSnapshot {
            last_sample: self.last_sample(),
            tick_count: self.tick_count(),
        }
    }
}

impl Default for TxProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Probe state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct ProbeSnapshot {
    pub last_sample: u16,
    pub tick_count: u32,
}
