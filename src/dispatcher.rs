//! # Tick Dispatcher
//!
//! Runs once per elapsed base tick, from the tick ISR.
//!
//! ## Algorithm
//!
//! For each occupied slot, in slot order:
//! 1. Increment `count`
//! 2. If `count == rate`: the handler is due, reset `count` to 0
//!
//! Stepping and invoking are split. [`step`] advances the counters and
//! copies the due handlers into a fixed-size [`Due`] snapshot; the caller
//! does that inside a critical section. [`Due::fire`] then runs the
//! handlers with interrupts enabled, so a handler may request or cancel
//! ticks without disturbing the pass in progress. A handler cancelled by
//! an earlier handler of the same pass still runs once for that pass.
//!
//! Each subscription behaves as an independent modulo-`rate` counter on a
//! shared base clock: period `rate` ticks, first call `rate` ticks after
//! registration.

use crate::handler::Handler;
use crate::registry::TickRegistry;

/// Handlers due in one tick, in slot order. Never larger than the registry.
#[derive(Debug, Clone, Copy)]
pub struct Due<const N: usize> {
    handlers: [Option<Handler>; N],
    len: usize,
}

impl<const N: usize> Due<N> {
    pub const fn new() -> Self {
        Self {
            handlers: [None; N],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, handler: Handler) {
        // One entry per slot at most, so this never runs past N.
        if let Some(entry) = self.handlers.get_mut(self.len) {
            *entry = Some(handler);
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Due handlers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Handler> + '_ {
        self.handlers[..self.len].iter().flatten().copied()
    }

    /// Invoke every due handler synchronously, in slot order. Returns how
    /// many ran.
    pub fn fire(self) -> usize {
        for handler in self.iter() {
            handler.call();
        }
        self.len
    }
}

impl<const N: usize> Default for Due<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance every occupied slot by one base tick and collect the due
/// handlers. Does not invoke anything.
pub fn step<const N: usize>(registry: &mut TickRegistry<N>) -> Due<N> {
    let mut due = Due::new();
    for slot in registry.slots_mut().iter_mut() {
        if let Some(handler) = slot.step() {
            due.push(handler);
        }
    }
    due
}

/// Step and fire in one go, for callers that already own the registry
/// exclusively and whose handlers never touch it.
#[cfg(test)]
pub(crate) fn dispatch<const N: usize>(registry: &mut TickRegistry<N>) -> usize {
    step(registry).fire()
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
