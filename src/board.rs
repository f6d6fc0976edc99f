//! # Board
//!
//! Startup glue for the STM32F4 Discovery board: ties the SysTick tick
//! source, the tick multiplexer and the LED bank together.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► board::start()          ← LEDs to output/off, SysTick priority,
//!         │                             1ms tick running, table cleared
//!         ├─► TICKS.request_tick() ×N ← Register periodic callbacks
//!         └─► loop { wfi }            ← Everything else happens in SysTick
//! ```
//!
//! The firmware owns the `static` instances and hands this module
//! references; nothing here is global.

use crate::arch::cortex_m4::{self, GpioD, SysTickSource};
use crate::config::MAX_TICK_CLIENTS;
use crate::error::TickError;
use crate::led::{Led, LedBank};
use crate::prescaler::TimerSetting;
use crate::timer::{Configuration, TickTimer, TimerState};

/// Tick multiplexer on SysTick with the board's default capacity.
pub type BoardTimer = TickTimer<SysTickSource, MAX_TICK_CLIENTS>;

/// User LEDs on GPIOD.
pub type BoardLeds = LedBank<GpioD>;

/// Bring up the LEDs and start the 1ms tick.
///
/// Every LED is configured as an output and switched off, the tick
/// interrupt is set to the lowest priority, and the timer enters
/// `Running`, which clears any previous subscriptions.
///
/// # Returns
/// - `Ok(setting)` — SysTick divider and period in use
/// - `Err(ConfigurationOverflow)` — the system clock cannot produce 1ms
pub fn start(timer: &BoardTimer, leds: &BoardLeds) -> Result<TimerSetting, TickError> {
    for led in Led::ALL {
        leds.enable(led);
        leds.off(led);
    }

    cortex_m4::set_interrupt_priorities();

    match timer.set_configuration(Configuration::OneMillisecond)? {
        TimerState::Running(setting) => Ok(setting),
        TimerState::Off => Err(TickError::NotConfigured),
    }
}

/// Stop the tick interrupt. Subscriptions stay in place until the next
/// [`start`], which clears them.
pub fn stop(timer: &BoardTimer) {
    // Switching off cannot fail.
    let _ = timer.set_configuration(Configuration::Off);
}
