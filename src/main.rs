//! # TickMux Demo Firmware
//!
//! Blinks the four user LEDs from tick callbacks at different rates, all
//! driven by one SysTick interrupt:
//!
//! | Handler | LED | Rate | Behavior |
//! |---------|-----|------|----------|
//! | `heartbeat` | Green | 500 ticks | Toggles at 1 Hz |
//! | `fast_blink` | Orange | 125 ticks | Toggles at 4 Hz |
//! | `burst` | Red | 50 ticks | Flashes 10 times, then cancels itself |
//! | `watchdog` | Blue | 2000 ticks | Re-arms `burst` every 2 s |
//!
//! The main loop only sleeps; every LED change happens in the SysTick
//! exception.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::{entry, exception};
use panic_halt as _;

#[cfg(feature = "defmt")]
use defmt_rtt as _;

use tickmux::arch::cortex_m4::{GpioD, SysTickSource};
use tickmux::board::{self, BoardLeds, BoardTimer};
use tickmux::{Handler, Led, LedBank, TickTimer};

// ---------------------------------------------------------------------------
// Board instances
// ---------------------------------------------------------------------------

// SAFETY: these are the only owners of SysTick and GPIOD in the firmware.
static TICKS: BoardTimer = TickTimer::new(unsafe { SysTickSource::new() });
static LEDS: BoardLeds = LedBank::new(unsafe { GpioD::new() });

// ---------------------------------------------------------------------------
// Tick handlers
// ---------------------------------------------------------------------------

fn heartbeat() {
    LEDS.toggle(Led::Green);
}

fn fast_blink() {
    LEDS.toggle(Led::Orange);
}

static BURST_LEFT: AtomicU32 = AtomicU32::new(0);

/// Flashes red until its budget runs out, then unsubscribes itself.
fn burst() {
    LEDS.toggle(Led::Red);
    if BURST_LEFT.fetch_sub(1, Ordering::Relaxed) <= 1 {
        LEDS.off(Led::Red);
        TICKS.cancel_tick(Handler::new(&BURST));
    }
}

/// Re-arms `burst` and flips blue so the re-arm is visible.
fn watchdog() {
    LEDS.toggle(Led::Blue);
    arm_burst();
}

static HEARTBEAT: fn() = heartbeat;
static FAST_BLINK: fn() = fast_blink;
static BURST: fn() = burst;
static WATCHDOG: fn() = watchdog;

fn arm_burst() {
    // Drop any running burst first so it never holds two slots.
    TICKS.cancel_tick(Handler::new(&BURST));
    BURST_LEFT.store(20, Ordering::Relaxed);
    let _ = TICKS.request_tick(Handler::new(&BURST), 50);
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

#[exception]
fn SysTick() {
    TICKS.on_interrupt();
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Firmware entry point. Starts the tick, registers the handlers and
/// sleeps. Does not return.
#[entry]
fn main() -> ! {
    if board::start(&TICKS, &LEDS).is_err() {
        // No usable 1ms setting: show solid red and stop.
        LEDS.on(Led::Red);
        loop {
            cortex_m::asm::wfi();
        }
    }

    TICKS
        .request_tick(Handler::new(&HEARTBEAT), 500)
        .expect("tick table has room for heartbeat");
    TICKS
        .request_tick(Handler::new(&FAST_BLINK), 125)
        .expect("tick table has room for fast_blink");
    TICKS
        .request_tick(Handler::new(&WATCHDOG), 2000)
        .expect("tick table has room for watchdog");
    arm_burst();

    loop {
        cortex_m::asm::wfi();
    }
}
