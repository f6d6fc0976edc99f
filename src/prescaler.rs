//! # Clock Divider Selection
//!
//! Picks the hardware prescaler for the base tick. Given the peripheral
//! clock and the tick rate, the period register must hold
//! `clock / tick_hz / divider` counts. The smallest divider whose period
//! fits the counter width wins, which keeps timing resolution as fine as
//! the hardware allows.
//!
//! All functions are `const` so a board configuration can be rejected at
//! compile time.

use crate::error::TickError;

/// A resolved timer setting: which divider to program and how many divided
/// clock counts make up one base tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSetting {
    /// Clock division factor.
    pub divider: u32,
    /// Divided clock counts per base tick.
    pub period: u32,
}

impl TimerSetting {
    /// Value for an auto-reload register that counts `period` steps
    /// including zero. Zero for a zero period.
    #[inline]
    pub const fn reload(&self) -> u32 {
        self.period.saturating_sub(1)
    }
}

/// Select the smallest divider from `dividers` (ascending) for which the
/// tick period fits in `max_count`.
///
/// # Errors
/// `ConfigurationOverflow` when no candidate fits, when `tick_hz` is zero,
/// or when the clock is too slow to produce a single count per tick.
pub const fn select(
    peripheral_hz: u32,
    tick_hz: u32,
    dividers: &[u32],
    max_count: u32,
) -> Result<TimerSetting, TickError> {
    if tick_hz == 0 {
        return Err(TickError::ConfigurationOverflow);
    }
    let counts = peripheral_hz / tick_hz;

    let mut i = 0;
    while i < dividers.len() {
        let divider = dividers[i];
        if divider != 0 {
            let period = counts / divider;
            if period == 0 {
                // Dividers only grow from here.
                return Err(TickError::ConfigurationOverflow);
            }
            if period <= max_count {
                return Ok(TimerSetting { divider, period });
            }
        }
        i += 1;
    }

    Err(TickError::ConfigurationOverflow)
}

/// Whether [`select`] succeeds for the given inputs.
pub const fn fits(peripheral_hz: u32, tick_hz: u32, dividers: &[u32], max_count: u32) -> bool {
    select(peripheral_hz, tick_hz, dividers, max_count).is_ok()
}
