//! # Tick Subscription Registry
//!
//! Fixed-capacity table of periodic subscriptions. Each slot binds a
//! [`Handler`] to a rate (base ticks between invocations) and a counter of
//! ticks elapsed since the last invocation.
//!
//! ## Slot Lifecycle
//!
//! ```text
//!                request()                 dispatch (every tick)
//!   ┌──────┐ ─────────────► ┌──────────┐ ◄──────────────────┐
//!   │ Free │                │ Occupied │ ───────────────────┘
//!   └──────┘ ◄───────────── └──────────┘
//!            cancel() / clear()
//! ```
//!
//! Slots are scanned in index order, so the first free slot always wins
//! and dispatch order is slot order. Nothing is deduplicated: one handler
//! may hold several slots at different rates, and `cancel` frees all of them.

use crate::error::TickError;
use crate::handler::Handler;

/// One slot of the subscription table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// Subscriber; `None` marks the slot free.
    pub handler: Option<Handler>,
    /// Base ticks between invocations. Always >= 1 while occupied.
    pub rate: u32,
    /// Ticks elapsed since the last invocation, in `[0, rate)` between passes.
    pub count: u32,
}

impl Subscription {
    /// A free slot.
    pub const EMPTY: Self = Self {
        handler: None,
        rate: 0,
        count: 0,
    };

    /// Whether a subscriber holds this slot.
    #[inline]
    pub const fn is_occupied(&self) -> bool {
        self.handler.is_some()
    }

    /// Advance this slot by one base tick. Returns the handler if it is due.
    #[inline]
    pub(crate) fn step(&mut self) -> Option<Handler> {
        let handler = self.handler?;
        self.count += 1;
        if self.count >= self.rate {
            self.count = 0;
            Some(handler)
        } else {
            None
        }
    }
}

/// Fixed-capacity subscription table with `N` slots.
#[derive(Debug)]
pub struct TickRegistry<const N: usize> {
    slots: [Subscription; N],
}

impl<const N: usize> TickRegistry<N> {
    /// An empty registry. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            slots: [Subscription::EMPTY; N],
        }
    }

    /// Subscribe `handler` to fire every `rate` base ticks.
    ///
    /// The first free slot in index order is taken and its counter starts
    /// at zero, so the first invocation comes exactly `rate` ticks later.
    ///
    /// # Returns
    /// - `Ok(slot)` — index of the slot now holding the subscription
    /// - `Err(ZeroRate)` — `rate` was zero
    /// - `Err(RegistryFull)` — all `N` slots are occupied
    ///
    /// The registry is untouched on error.
    pub fn request(&mut self, handler: Handler, rate: u32) -> Result<usize, TickError> {
        if rate == 0 {
            return Err(TickError::ZeroRate);
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| !s.is_occupied())
            .ok_or(TickError::RegistryFull)?;

        slot.rate = rate;
        slot.count = 0;
        slot.handler = Some(handler);
        Ok(index)
    }

    /// Free every slot held by `handler`. Returns how many were freed;
    /// zero is not an error.
    pub fn cancel(&mut self, handler: Handler) -> usize {
        let mut freed = 0;
        for slot in self.slots.iter_mut() {
            if slot.handler == Some(handler) {
                *slot = Subscription::EMPTY;
                freed += 1;
            }
        }
        freed
    }

    /// Free all slots, zeroing rate and count.
    pub fn clear(&mut self) {
        self.slots = [Subscription::EMPTY; N];
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Subscription::is_occupied)
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether `handler` holds at least one slot.
    #[cfg(test)]
    pub(crate) fn contains(&self, handler: Handler) -> bool {
        self.slots.iter().any(|s| s.handler == Some(handler))
    }

    /// Slot at `index`, if in range.
    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> Option<&Subscription> {
        self.slots.get(index)
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Subscription; N] {
        &mut self.slots
    }
}

impl<const N: usize> Default for TickRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
