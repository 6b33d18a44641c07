//! Periodic tick source over the esp_timer service.
//!
//! Wraps timer creation and start behind the two-step contract the
//! core expects: `configure` then `enable`. The handler is dispatched
//! at ISR level and must never be re-entered; re-entry detection is
//! the tick wrapper's job, not this module's.

/// Tick source configuration.
#[derive(Debug, Clone)]
pub struct TickSourceConfig {
    /// Tick rate in Hz.
    pub rate_hz: u32,
}

impl Default for TickSourceConfig {
    fn default() -> Self {
        Self {
            rate_hz: crate::config::SAMPLE_RATE_HZ,
        }
    }
}

impl TickSourceConfig {
    /// Tick period in microseconds (5 at the design rate).
    #[inline]
    pub const fn period_us(&self) -> u64 {
        1_000_000 / self.rate_hz as u64
    }
}

/// esp_timer-backed periodic tick source.
///
/// ISR dispatch requires `ESP_TIMER_SUPPORTS_ISR_DISPATCH` in
/// sdkconfig; at 5 µs per tick, task dispatch cannot keep up.
#[cfg(not(test))]
pub struct EspTickSource {
    handle: esp_idf_svc::sys::esp_timer_handle_t,
    period_us: u64,
    enabled: bool,
}

#[cfg(not(test))]
impl EspTickSource {
    /// Create the periodic timer, dispatching `handler` at each tick.
    ///
    /// The timer is created stopped; call [`enable`] to start it.
    /// Must not be called before the beacon frame is built (startup
    /// sequencing contract).
    ///
    /// [`enable`]: EspTickSource::enable
    pub fn configure(
        config: &TickSourceConfig,
        handler: unsafe extern "C" fn(*mut core::ffi::c_void),
        arg: *mut core::ffi::c_void,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        use esp_idf_svc::sys;

        let args = sys::esp_timer_create_args_t {
            callback: Some(handler),
            arg,
            dispatch_method: sys::esp_timer_dispatch_t_ESP_TIMER_ISR,
            name: b"beacon_tick\0".as_ptr() as *const core::ffi::c_char,
            skip_unhandled_events: true,
        };

        let mut handle: sys::esp_timer_handle_t = core::ptr::null_mut();
        sys::esp!(unsafe { sys::esp_timer_create(&args, &mut handle) })?;

        Ok(Self {
            handle,
            period_us: config.period_us(),
            enabled: false,
        })
    }

    /// Start the periodic ticks.
    pub fn enable(&mut self) -> Result<(), esp_idf_svc::sys::EspError> {
        use esp_idf_svc::sys;

        sys::esp!(unsafe { sys::esp_timer_start_periodic(self.handle, self.period_us) })?;
        self.enabled = true;
        Ok(())
    }

    /// Stop the ticks. The only shutdown path the design has.
    pub fn disable(&mut self) -> Result<(), esp_idf_svc::sys::EspError> {
        use esp_idf_svc::sys;

        sys::esp!(unsafe { sys::esp_timer_stop(self.handle) })?;
        self.enabled = false;
        Ok(())
    }

    /// Whether ticks are currently being delivered.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(not(test))]
impl Drop for EspTickSource {
    fn drop(&mut self) {
        if self.enabled {
            let _ = self.disable();
        }
        unsafe {
            esp_idf_svc::sys::esp_timer_delete(self.handle);
        }
    }
}
