//! # Tick Handlers
//!
//! A subscriber is any `'static` value implementing [`Tick`]. The
//! subscription table stores a [`Handler`], a reference to that value, and
//! compares handlers by address: the same static registered twice is the
//! same subscriber, two different statics are different subscribers even
//! if they run the same code.
//!
//! Plain functions work through a `static`:
//!
//! ```ignore
//! fn blink() { /* ... */ }
//! static BLINK: fn() = blink;
//! timer.request_tick(Handler::new(&BLINK), 500)?;
//! ```
//!
//! Zero-sized types may share an address with another static, so a handler
//! type must not be zero-sized if it is to be cancelled independently.

use core::fmt;
use core::ptr;

/// Callback invoked from the tick ISR.
///
/// Implementations run in interrupt context: they must not block, and
/// they should be short, since every later subscription in the same tick
/// waits for them.
pub trait Tick: Sync {
    fn on_tick(&self);
}

impl Tick for fn() {
    #[inline]
    fn on_tick(&self) {
        (self)()
    }
}

/// Identity of a subscriber. Cheap to copy; equality is by address.
#[derive(Clone, Copy)]
pub struct Handler(&'static dyn Tick);

impl Handler {
    /// Wrap a static subscriber.
    #[inline]
    pub const fn new(target: &'static dyn Tick) -> Self {
        Handler(target)
    }

    /// Invoke the subscriber.
    #[inline]
    pub fn call(&self) {
        self.0.on_tick();
    }

    /// Address used for identity comparison.
    #[inline]
    pub fn addr(&self) -> usize {
        self.0 as *const dyn Tick as *const () as usize
    }
}

impl PartialEq for Handler {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::addr_eq(self.0 as *const dyn Tick, other.0 as *const dyn Tick)
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:#x})", self.addr())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Handler {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Handler({=usize:#x})", self.addr())
    }
}
