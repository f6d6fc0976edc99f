//! # Synchronization Primitives
//!
//! Interrupt-safe critical section abstractions. The subscription table is
//! shared between thread mode (`request_tick`, `cancel_tick`) and the tick
//! ISR, so every access goes through a critical section.
//!
//! On the Cortex-M4 target the implementation comes from `cortex-m`'s
//! `critical-section-single-core` feature (PRIMASK). Host tests link the
//! `std` implementation instead.

use core::cell::RefCell;

pub use ::critical_section::CriticalSection;

/// State shared between thread mode and interrupt context.
pub type Shared<T> = ::critical_section::Mutex<RefCell<T>>;

/// Wrap `value` for sharing with interrupt context. Usable in `static`
/// initializers.
#[inline]
pub const fn shared<T>(value: T) -> Shared<T> {
    ::critical_section::Mutex::new(RefCell::new(value))
}

/// Execute a closure within a critical section (interrupts disabled).
///
/// # Usage
/// ```ignore
/// sync::critical_section(|cs| {
///     // Access shared state safely
/// });
/// ```
///
/// # Performance
/// Keep critical sections as short as possible: the tick interrupt is
/// held off for the whole closure.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    ::critical_section::with(f)
}

/// Run `f` with exclusive access to the shared value.
#[inline]
pub fn with_shared<T, R>(cell: &Shared<T>, f: impl FnOnce(&mut T) -> R) -> R {
    critical_section(|cs| f(&mut cell.borrow_ref_mut(cs)))
}
