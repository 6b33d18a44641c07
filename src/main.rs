//! RustPskBeacon - Main entry point
//!
//! Startup sequencing contract, in order:
//! 1. Build the beacon frame
//! 2. Configure the sample sink
//! 3. Configure, then enable, the periodic tick source
//!
//! The tick source must not be enabled before the frame is built.
//! After enable, all transmit work happens in the tick handler; the
//! main thread is the idle context and only drains logs and watches
//! the fault latch.

#![no_std]
#![no_main]

use esp_idf_svc::sys as esp_idf_sys;

use core::ffi::c_void;
use core::sync::atomic::{AtomicBool, Ordering};

use rust_psk_beacon::{
    config::FrameConfig,
    fault::{FaultCode, FaultState},
    frame::BeaconFrame,
    hal::timer::{EspTickSource, TickSourceConfig},
    log_globals::TX_LOG_STREAM,
    probe::TxProbe,
    scheduler::SampleScheduler,
    uart_logger::{self, UartLoggerConfig},
    rt_error, rt_info,
};

// Static allocations: the frame is built once, before the tick source
// is enabled, then shared read-only with the tick handler. The
// scheduler is touched by the tick handler only.
static mut BEACON_FRAME: Option<BeaconFrame> = None;
static mut SCHEDULER: Option<SampleScheduler<'static>> = None;

static FAULT_STATE: FaultState = FaultState::new();
static TX_PROBE: TxProbe = TxProbe::new();

// Re-entry guard: set for the duration of one tick handler run.
static TICK_BUSY: AtomicBool = AtomicBool::new(false);

/// Build the frame and the scheduler (call once at startup).
fn init_transmitter(config: &FrameConfig) {
    unsafe {
        BEACON_FRAME = Some(BeaconFrame::build(config));
        let frame: &'static BeaconFrame =
            BEACON_FRAME.as_ref().expect("frame not initialized");
        SCHEDULER = Some(SampleScheduler::new(frame));
    }
}

/// Tick handler, ISR dispatch at 200 kHz.
///
/// One table lookup, one DAC latch, counter updates. Must complete
/// well within the 5 µs period; there is no reentrancy protection
/// beyond the guard below, and no queuing.
unsafe extern "C" fn on_tick(_arg: *mut c_void) {
    if TICK_BUSY.swap(true, Ordering::Acquire) {
        // Previous handler still running: missed deadline.
        FAULT_STATE.set(FaultCode::TickOverrun, TX_PROBE.tick_count());
        return;
    }

    let scheduler = SCHEDULER.as_mut().expect("scheduler not initialized");
    let sample = scheduler.tick();
    write_sample(sample);
    TX_PROBE.record(sample);

    TICK_BUSY.store(false, Ordering::Release);
}

#[no_mangle]
fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()
        .expect("peripherals already taken");

    let mut uart = uart_logger::init_uart_logger(
        peripherals.uart1,
        peripherals.pins.gpio6,
        &UartLoggerConfig::default(),
    )
    .expect("uart bring-up failed");

    rt_info!(TX_LOG_STREAM, timestamp_us(), "{}", env!("VERSION_STRING"));

    // 1. Build the beacon frame.
    init_transmitter(&FrameConfig::default());

    // 2. Configure the sample sink.
    configure_sample_sink();

    // 3. Configure, then enable, the tick source.
    let mut tick_source =
        match EspTickSource::configure(&TickSourceConfig::default(), on_tick, core::ptr::null_mut()) {
            Ok(source) => source,
            Err(err) => {
                FAULT_STATE.set(FaultCode::HardwareFault, err.code() as u32);
                halt(&mut uart);
            }
        };

    if let Err(err) = tick_source.enable() {
        FAULT_STATE.set(FaultCode::HardwareFault, err.code() as u32);
        halt(&mut uart);
    }

    rt_info!(TX_LOG_STREAM, timestamp_us(), "transmitting");

    // Idle context: drains logs and watches the fault latch. Never
    // touches transmitter state.
    let mut last_dropped_report = 0i64;
    loop {
        uart_logger::drain_logs(&mut uart, &mut last_dropped_report);

        if FAULT_STATE.is_active() {
            // Mistimed samples are worse than silence: stop the ticks.
            let _ = tick_source.disable();

            let snap = FAULT_STATE.snapshot();
            rt_error!(
                TX_LOG_STREAM,
                timestamp_us(),
                "FAULT: {:?} data={} count={}",
                snap.code,
                snap.data,
                snap.count
            );
            halt(&mut uart);
        }

        unsafe {
            esp_idf_sys::vTaskDelay(10);
        }
    }
}

/// Drain remaining logs forever after a fatal fault.
fn halt(uart: &mut esp_idf_svc::hal::uart::UartTxDriver<'_>) -> ! {
    let mut last_dropped_report = 0i64;
    loop {
        uart_logger::drain_logs(uart, &mut last_dropped_report);
        unsafe {
            esp_idf_sys::vTaskDelay(100);
        }
    }
}

// --- Sample sink (hardware-specific, boundary only) ---

fn configure_sample_sink() {
    // TODO: bring up the MCP4921 (hal::dac) on a DMA-capable bus.
    // Plain esp-idf SPI transactions cannot run at ISR level, so the
    // latch below stays a stub until the I2S-clocked board spin.
}

#[inline]
fn write_sample(_sample: u16) {
    // TODO: Mcp4921::latch once the bus above exists. The DAC keeps
    // the low 12 bits of the word.
}

fn timestamp_us() -> i64 {
    unsafe { esp_idf_sys::esp_timer_get_time() }
}
