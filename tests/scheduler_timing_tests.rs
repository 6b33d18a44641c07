//! Sample scheduler timing tests
//!
//! Drives the state machine with synthetic ticks and checks the tick
//! budgets of every transmission stage against the design constants.

use rust_psk_beacon::config::{FrameConfig, GUARD_SYMBOLS, PREAMBLE_TICKS, SAMPLES_PER_SYMBOL};
use rust_psk_beacon::frame::{BeaconFrame, FRAME_BITS};
use rust_psk_beacon::hal::dac::SampleSink;
use rust_psk_beacon::probe::TxProbe;
use rust_psk_beacon::scheduler::{SampleScheduler, TxPhase};
use rust_psk_beacon::waveform::{CARRIER_DAC, SYMBOL_DAC};

/// Ticks in one full transmission cycle:
/// preamble + 121 bits + 2 guard symbols.
const CYCLE_TICKS: u32 =
    PREAMBLE_TICKS + (FRAME_BITS as u32 + GUARD_SYMBOLS) * SAMPLES_PER_SYMBOL;

#[test]
fn test_preamble_lasts_exactly_32000_ticks() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    let mut preamble_ticks = 0u32;
    while scheduler.phase() == TxPhase::Preamble {
        scheduler.tick();
        preamble_ticks += 1;
    }

    assert_eq!(preamble_ticks, PREAMBLE_TICKS);
    assert_eq!(preamble_ticks, 32_000);
}

#[test]
fn test_each_bit_held_exactly_500_ticks() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    for _ in 0..PREAMBLE_TICKS {
        scheduler.tick();
    }

    for bit in 0..FRAME_BITS {
        for _ in 0..SAMPLES_PER_SYMBOL {
            assert_eq!(scheduler.bit_index(), bit);
            scheduler.tick();
        }
    }
    assert_eq!(scheduler.bit_index(), FRAME_BITS);
}

#[test]
fn test_data_phase_emits_symbol_waveform_of_current_bit() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    for _ in 0..PREAMBLE_TICKS {
        scheduler.tick();
    }

    for _ in 0..(FRAME_BITS as u32 * SAMPLES_PER_SYMBOL) {
        let bit = frame.bit(scheduler.bit_index()) as usize;
        let position = scheduler.carrier_position();
        assert_eq!(scheduler.tick(), SYMBOL_DAC[bit][position]);
    }
}

#[test]
fn test_guard_interval_uses_symbol_zero_waveform() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    for _ in 0..PREAMBLE_TICKS + FRAME_BITS as u32 * SAMPLES_PER_SYMBOL {
        scheduler.tick();
    }

    // Exactly 2 guard symbol-durations of the symbol-0 waveform.
    for _ in 0..GUARD_SYMBOLS * SAMPLES_PER_SYMBOL {
        assert_eq!(scheduler.phase(), TxPhase::Data);
        assert_eq!(scheduler.current_bit(), 0);
        let position = scheduler.carrier_position();
        assert_eq!(scheduler.tick(), SYMBOL_DAC[0][position]);
    }

    assert_eq!(scheduler.phase(), TxPhase::Preamble);
}

#[test]
fn test_carrier_position_advances_one_mod_five_forever() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    // Two full cycles, covering every transition twice.
    for tick in 0..2 * CYCLE_TICKS as usize {
        let position = scheduler.carrier_position();
        assert!(position < 5);
        assert_eq!(position, tick % 5);
        scheduler.tick();
    }
}

#[test]
fn test_carrier_phase_continuous_into_data() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    // Unbroken +1 mod 5 chain through the Preamble→Data boundary.
    // Every stage budget is a multiple of 5, so the boundary itself
    // lands on position 0; the property that holds is the chain, not
    // the boundary value.
    let mut prev = scheduler.carrier_position();
    for _ in 0..PREAMBLE_TICKS + 10 {
        scheduler.tick();
        let position = scheduler.carrier_position();
        assert_eq!(position, (prev + 1) % 5);
        prev = position;
    }
    assert_eq!(scheduler.phase(), TxPhase::Data);
}

#[test]
fn test_carrier_position_not_reset_on_return_to_preamble() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    for _ in 0..CYCLE_TICKS - 10 {
        scheduler.tick();
    }
    assert_eq!(scheduler.phase(), TxPhase::Data);

    // The Data→Preamble transition may only select a different
    // table; the cycle counter keeps advancing by 1 mod 5 with no
    // forced reset.
    let mut prev = scheduler.carrier_position();
    for _ in 0..20 {
        scheduler.tick();
        let position = scheduler.carrier_position();
        assert_eq!(position, (prev + 1) % 5);
        prev = position;
    }
    assert_eq!(scheduler.phase(), TxPhase::Preamble);
    assert_eq!(scheduler.carrier_position(), (CYCLE_TICKS as usize + 10) % 5);
}

#[test]
fn test_counters_restart_clean_except_carrier_position() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    for _ in 0..CYCLE_TICKS {
        scheduler.tick();
    }

    // Same as at first startup, apart from the carrier cycle.
    assert_eq!(scheduler.phase(), TxPhase::Preamble);
    assert_eq!(scheduler.preamble_ticks(), 0);
    assert_eq!(scheduler.symbol_ticks(), 0);
    assert_eq!(scheduler.guard_symbols(), 0);
}

#[test]
fn test_transmission_cycle_repeats_exactly() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    // One cycle is a whole number of carrier cycles, so consecutive
    // transmissions emit identical sample streams.
    assert_eq!(CYCLE_TICKS % 5, 0);

    let first: Vec<u16> = (0..CYCLE_TICKS).map(|_| scheduler.tick()).collect();
    let second: Vec<u16> = (0..CYCLE_TICKS).map(|_| scheduler.tick()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_preamble_emits_carrier_table_only() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);

    for tick in 0..PREAMBLE_TICKS as usize {
        assert_eq!(scheduler.tick(), CARRIER_DAC[tick % 5]);
    }
}

/// Capture sink double for the tick wrapper.
struct CaptureSink {
    samples: Vec<u16>,
}

impl SampleSink for CaptureSink {
    fn write(&mut self, sample: u16) {
        self.samples.push(sample);
    }
}

#[test]
fn test_tick_wrapper_mirrors_output_to_probe() {
    let frame = BeaconFrame::build(&FrameConfig::default());
    let mut scheduler = SampleScheduler::new(&frame);
    let mut sink = CaptureSink { samples: Vec::new() };
    let probe = TxProbe::new();

    // The tick handler body: emit, latch, mirror.
    for _ in 0..100 {
        let sample = scheduler.tick();
        sink.write(sample);
        probe.record(sample);

        assert_eq!(probe.last_sample(), *sink.samples.last().unwrap());
    }
    assert_eq!(probe.tick_count(), 100);
    assert_eq!(sink.samples.len(), 100);
}
