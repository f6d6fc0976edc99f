//! # TickMux — Periodic Tick Multiplexer for ARM Cortex-M4
//!
//! Board support for an STM32F4 board: one hardware timer interrupt fanned
//! out to any number of independently-rated periodic callbacks, plus a
//! driver for the board's user LEDs.
//!
//! ## Overview
//!
//! A single 1ms base tick drives a fixed-size subscription table. Each
//! subscription is a modulo-`rate` counter: every tick its count goes up
//! by one, and when it reaches `rate` the callback runs and the count
//! starts over. A subscription with rate `r` therefore fires `r` ticks
//! after it was registered and every `r` ticks after that, phase-locked to
//! the shared clock.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 Firmware (main.rs)                      │
//! │      static TICKS · static LEDS · SysTick exception     │
//! ├────────────────────────────────────────────────────────┤
//! │               Board glue (board.rs)                     │
//! │                 start() · stop()                        │
//! ├──────────────────────────────┬─────────────────────────┤
//! │   Tick Timer (timer.rs)      │   LED Driver (led.rs)   │
//! │   ─ set_configuration()      │   ─ enable() · on()     │
//! │   ─ request_tick()           │   ─ off() · toggle()    │
//! │   ─ cancel_tick()            │   ─ get()               │
//! │   ─ on_interrupt()           │                         │
//! ├──────────────┬───────────────┤                         │
//! │ Registry     │ Dispatcher    │                         │
//! │ registry.rs  │ dispatcher.rs │                         │
//! ├──────────────┴───────────────┤                         │
//! │ Divider selection            │                         │
//! │ prescaler.rs                 │                         │
//! ├──────────────────────────────┴─────────────────────────┤
//! │          Arch Port (arch/cortex_m4.rs)                  │
//! │          SysTick tick source · GPIOD port               │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: All state is statically allocated
//! - **No `alloc`**: Pure `core` only
//! - **Fixed-size table**: `[Subscription; N]`, `N` chosen at compile time
//! - **Critical sections**: `critical_section::with()` for shared state
//!
//! ## Features
//!
//! - `defmt`: log configuration changes and rejected requests over RTT.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod sync;
pub mod prescaler;
pub mod handler;
pub mod registry;
pub mod dispatcher;
pub mod timer;
pub mod led;
pub mod arch;
pub mod board;

pub use error::TickError;
pub use handler::{Handler, Tick};
pub use led::{Led, LedBank};
pub use timer::{Configuration, TickSource, TickTimer, TimerState};
