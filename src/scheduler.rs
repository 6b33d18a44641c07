//! Tick-driven transmit state machine.
//!
//! Pure logic, no hardware dependencies. One call to [`tick`] per
//! 5 µs sample period produces exactly one DAC word and advances the
//! transmit cycle: 160 ms of unmodulated carrier, then the 121 frame
//! bits at 400 baud, then 2 guard symbols, then back to the preamble,
//! forever.
//!
//! The carrier-cycle position is tracked independently of bit and
//! macro-phase boundaries and is never reset: only the table selected
//! by the current bit changes at a boundary, so the synthesized
//! carrier stays phase-continuous across the whole transmission.
//!
//! Every tick is O(1), allocation-free and branch-light; there is no
//! error path. Exclusive ownership by the tick context is the
//! concurrency discipline — nothing here is shared.
//!
//! [`tick`]: SampleScheduler::tick

use crate::config::{GUARD_SYMBOLS, PREAMBLE_TICKS, SAMPLES_PER_CYCLE, SAMPLES_PER_SYMBOL};
use crate::frame::{BeaconFrame, FRAME_BITS};
use crate::waveform::{CARRIER_DAC, SYMBOL_DAC};

/// Macro-phase of the transmit cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxPhase {
    /// Unmodulated carrier (160 ms).
    Preamble,
    /// Frame bits, then guard symbols.
    Data,
}

/// The transmitter state machine.
///
/// Borrows the frame built at startup; owns all mutable transmit
/// state. Must only be ticked from a single context.
///
/// # Example
///
/// ```
/// use rust_psk_beacon::config::FrameConfig;
/// use rust_psk_beacon::frame::BeaconFrame;
/// use rust_psk_beacon::scheduler::SampleScheduler;
///
/// let frame = BeaconFrame::build(&FrameConfig::default());
/// let mut scheduler = SampleScheduler::new(&frame);
///
/// // First preamble sample is the phase-0 carrier word.
/// let sample = scheduler.tick();
/// assert_eq!(sample, 3906);
/// ```
pub struct SampleScheduler<'a> {
    frame: &'a BeaconFrame,

    phase: TxPhase,
    carrier_position: usize,
    preamble_ticks: u32,
    symbol_ticks: u32,
    bit_index: usize,
    guard_symbols: u32,
}

impl<'a> SampleScheduler<'a> {
    /// Create a scheduler at the start of a preamble phase.
    pub fn new(frame: &'a BeaconFrame) -> Self {
        Self {
            frame,
            phase: TxPhase::Preamble,
            carrier_position: 0,
            preamble_ticks: 0,
            symbol_ticks: 0,
            bit_index: 0,
            guard_symbols: 0,
        }
    }

    /// Produce the DAC word for this tick and advance the cycle.
    ///
    /// # Timing
    ///
    /// O(1), no allocation, no blocking. Must complete well within
    /// one 5 µs tick period.
    #[inline]
    pub fn tick(&mut self) -> u16 {
        let sample = match self.phase {
            TxPhase::Preamble => self.tick_preamble(),
            TxPhase::Data => self.tick_data(),
        };

        // Carrier position advances every tick regardless of phase.
        self.carrier_position = (self.carrier_position + 1) % SAMPLES_PER_CYCLE;

        sample
    }

    /// Current macro-phase.
    #[inline]
    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    /// Carrier-cycle position of the NEXT sample, in [0,5).
    #[inline]
    pub fn carrier_position(&self) -> usize {
        self.carrier_position
    }

    /// Index of the frame bit currently being transmitted, in [0,121].
    /// 121 means the guard interval.
    #[inline]
    pub fn bit_index(&self) -> usize {
        self.bit_index
    }

    /// Ticks elapsed in the current preamble phase.
    #[inline]
    pub fn preamble_ticks(&self) -> u32 {
        self.preamble_ticks
    }

    /// Ticks elapsed within the current symbol.
    #[inline]
    pub fn symbol_ticks(&self) -> u32 {
        self.symbol_ticks
    }

    /// Guard symbols completed since the last frame bit.
    #[inline]
    pub fn guard_symbols(&self) -> u32 {
        self.guard_symbols
    }

    /// Bit value driving the modulator this tick: the current frame
    /// bit during the frame, 0 during the guard interval.
    #[inline]
    pub fn current_bit(&self) -> u8 {
        if self.bit_index < FRAME_BITS {
            self.frame.bit(self.bit_index)
        } else {
            0
        }
    }

    /// Return to the power-on state, including the carrier position.
    pub fn reset(&mut self) {
        self.phase = TxPhase::Preamble;
        self.carrier_position = 0;
        self.preamble_ticks = 0;
        self.symbol_ticks = 0;
        self.bit_index = 0;
        self.guard_symbols = 0;
    }

    // --- Private methods ---

    fn tick_preamble(&mut self) -> u16 {
        let sample = CARRIER_DAC[self.carrier_position];

        self.preamble_ticks += 1;
        if self.preamble_ticks >= PREAMBLE_TICKS {
            self.phase = TxPhase::Data;
            self.preamble_ticks = 0;
            self.bit_index = 0;
            self.symbol_ticks = 0;
        }

        sample
    }

    fn tick_data(&mut self) -> u16 {
        let sample = SYMBOL_DAC[self.current_bit() as usize][self.carrier_position];

        self.symbol_ticks += 1;
        if self.symbol_ticks >= SAMPLES_PER_SYMBOL {
            self.symbol_ticks = 0;

            if self.bit_index < FRAME_BITS {
                self.bit_index += 1;
            } else {
                self.guard_symbols += 1;
                if self.guard_symbols >= GUARD_SYMBOLS {
                    self.phase = TxPhase::Preamble;
                    self.guard_symbols = 0;
                }
            }
        }

        sample
    }
}
