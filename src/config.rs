//! # TickMux Configuration
//!
//! Compile-time constants governing the tick multiplexer and the board.
//! All limits are fixed at compile time — no dynamic allocation.

use crate::prescaler;

/// Maximum number of concurrent tick subscriptions.
/// This bounds the static subscription table. Each slot costs a handler
/// reference plus two `u32` counters of RAM.
pub const MAX_TICK_CLIENTS: usize = 10;

/// Base tick frequency in Hz. One base tick = 1ms.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Largest value a 16-bit period register can hold.
pub const COUNTER_MAX_16: u32 = 0xFFFF;

/// Largest value the 24-bit SysTick reload register can hold.
pub const COUNTER_MAX_24: u32 = 0x00FF_FFFF;

/// Divider ladder of the classic 16-bit peripheral timer family.
pub const PIC_DIVIDERS: &[u32] = &[1, 8, 64, 256];

/// SysTick clock sources expressed as dividers: processor clock, or the
/// external reference at HCLK/8.
pub const SYSTICK_DIVIDERS: &[u32] = &[1, 8];

// The board clock must produce a valid 1ms setting on SysTick.
const _: () = assert!(prescaler::fits(
    SYSTEM_CLOCK_HZ,
    TICK_HZ,
    SYSTICK_DIVIDERS,
    COUNTER_MAX_24
));
