//! # Tick Timer
//!
//! Lifecycle controller and public API of the tick multiplexer. A
//! [`TickTimer`] owns the hardware tick source, the configuration state and
//! the subscription table. It is built by a `const fn`, so firmware places
//! it in a `static` and passes the ISR a reference to it:
//!
//! ```ignore
//! static TICKS: TickTimer<SysTickSource, MAX_TICK_CLIENTS> =
//!     TickTimer::new(SysTickSource::new());
//!
//! #[exception]
//! fn SysTick() {
//!     TICKS.on_interrupt();
//! }
//! ```
//!
//! ## State Machine
//!
//! ```text
//!            set_configuration(OneMillisecond)
//!   ┌─────┐ ─────────────────────────────────► ┌──────────────────┐
//!   │ Off │   clear registry, program, arm     │ Running(setting) │
//!   └─────┘ ◄───────────────────────────────── └──────────────────┘
//!            set_configuration(Off)
//!            disarm, registry kept
//! ```
//!
//! `request_tick` is only accepted while `Running`. Reconfiguring a running
//! timer goes through the same `Running` entry path and clears the table.
//!
//! ## Concurrency
//!
//! Thread-mode calls run inside a critical section, which masks the tick
//! interrupt for their duration. `on_interrupt` holds the critical section
//! only while stepping counters; client callbacks run outside it.

use crate::config::TICK_HZ;
use crate::dispatcher::{self, Due};
use crate::error::TickError;
use crate::handler::Handler;
use crate::prescaler::{self, TimerSetting};
use crate::registry::TickRegistry;
use crate::sync::{self, Shared};

// ---------------------------------------------------------------------------
// Hardware seam
// ---------------------------------------------------------------------------

/// A periodic interrupt source with a programmable divider/period pair.
pub trait TickSource {
    /// Clock feeding the counter, in Hz, before division.
    fn peripheral_hz(&self) -> u32;

    /// Available dividers, ascending.
    fn dividers(&self) -> &'static [u32];

    /// Largest period count the counter register can hold.
    fn max_count(&self) -> u32;

    /// Stop the counter, load `setting` and restart from zero.
    fn program(&mut self, setting: TimerSetting);

    fn enable_interrupt(&mut self);

    fn disable_interrupt(&mut self);

    /// Clear the pending flag at the start of the ISR. Sources whose flag
    /// clears itself leave this empty.
    fn acknowledge(&mut self) {}
}

// ---------------------------------------------------------------------------
// Configuration state
// ---------------------------------------------------------------------------

/// Requested timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Configuration {
    /// Periodic interrupt disabled.
    Off,
    /// 1ms base tick.
    OneMillisecond,
}

/// Current timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    Off,
    Running(TimerSetting),
}

struct Inner<S, const N: usize> {
    source: S,
    state: TimerState,
    registry: TickRegistry<N>,
}

/// The tick multiplexer: one hardware timer, up to `N` periodic callbacks.
pub struct TickTimer<S, const N: usize> {
    inner: Shared<Inner<S, N>>,
}

impl<S: TickSource, const N: usize> TickTimer<S, N> {
    /// Create a stopped timer with an empty subscription table.
    pub const fn new(source: S) -> Self {
        Self {
            inner: sync::shared(Inner {
                source,
                state: TimerState::Off,
                registry: TickRegistry::new(),
            }),
        }
    }

    /// Switch the timer on or off.
    ///
    /// Entering `OneMillisecond` clears every subscription, programs the
    /// source with the smallest divider that fits and arms its interrupt.
    /// `Off` disarms the interrupt and keeps the table as is.
    ///
    /// # Returns
    /// - `Ok(state)` — the state the timer is now in
    /// - `Err(ConfigurationOverflow)` — the source cannot produce a 1ms
    ///   period; nothing was changed
    pub fn set_configuration(
        &self,
        configuration: Configuration,
    ) -> Result<TimerState, TickError> {
        sync::with_shared(&self.inner, |inner| match configuration {
            Configuration::OneMillisecond => {
                let setting = prescaler::select(
                    inner.source.peripheral_hz(),
                    TICK_HZ,
                    inner.source.dividers(),
                    inner.source.max_count(),
                )?;

                inner.registry.clear();
                inner.source.program(setting);
                inner.source.enable_interrupt();
                inner.state = TimerState::Running(setting);

                debug!(
                    "tick timer running: divider {=u32}, period {=u32}",
                    setting.divider,
                    setting.period
                );
                Ok(inner.state)
            }
            Configuration::Off => {
                inner.source.disable_interrupt();
                inner.state = TimerState::Off;
                debug!("tick timer off");
                Ok(inner.state)
            }
        })
    }

    /// Subscribe `handler` to run every `rate` base ticks, starting `rate`
    /// ticks from now.
    ///
    /// # Returns
    /// - `Ok(slot)` — subscription slot index
    /// - `Err(NotConfigured)` — the timer is `Off`
    /// - `Err(ZeroRate)` — `rate` was zero
    /// - `Err(RegistryFull)` — all `N` slots are taken
    pub fn request_tick(&self, handler: Handler, rate: u32) -> Result<usize, TickError> {
        sync::with_shared(&self.inner, |inner| {
            if inner.state == TimerState::Off {
                return Err(TickError::NotConfigured);
            }
            let result = inner.registry.request(handler, rate);
            if let Err(_e) = result {
                warn!("tick request for {} rejected: {}", handler, _e);
            }
            result
        })
    }

    /// Remove every subscription held by `handler`. Unknown handlers are
    /// ignored. Allowed in any state.
    pub fn cancel_tick(&self, handler: Handler) {
        let _freed = sync::with_shared(&self.inner, |inner| inner.registry.cancel(handler));
        trace!("cancelled {=usize} tick slot(s) of {}", _freed, handler);
    }

    /// Tick ISR body. Acknowledges the interrupt, advances every
    /// subscription by one base tick and runs the due handlers in slot
    /// order. Returns the number of handlers run.
    ///
    /// Must not be re-entered; call it only from the tick interrupt.
    pub fn on_interrupt(&self) -> usize {
        let due: Due<N> = sync::with_shared(&self.inner, |inner| {
            inner.source.acknowledge();
            match inner.state {
                TimerState::Running(_) => dispatcher::step(&mut inner.registry),
                TimerState::Off => Due::new(),
            }
        });
        due.fire()
    }

    pub fn state(&self) -> TimerState {
        sync::with_shared(&self.inner, |inner| inner.state)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), TimerState::Running(_))
    }

    /// Number of occupied subscription slots.
    pub fn active(&self) -> usize {
        sync::with_shared(&self.inner, |inner| inner.registry.len())
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Run `f` with the tick source, inside a critical section. `f` must not
    /// call back into this timer.
    #[cfg(test)]
    pub(crate) fn with_source<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        sync::with_shared(&self.inner, |inner| f(&mut inner.source))
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COUNTER_MAX_16, PIC_DIVIDERS};
    use crate::handler::Tick;
    use core::sync::atomic::{AtomicU32, Ordering};

    /// In-memory tick source recording what the controller asked for.
    struct MockSource {
        clock_hz: u32,
        max: u32,
        programmed: Option<TimerSetting>,
        program_calls: u32,
        irq_enabled: bool,
        acks: u32,
    }

    impl MockSource {
        const fn new(clock_hz: u32) -> Self {
            Self::with_max(clock_hz, COUNTER_MAX_16)
        }

        const fn with_max(clock_hz: u32, max: u32) -> Self {
            Self {
                clock_hz,
                max,
                programmed: None,
                program_calls: 0,
                irq_enabled: false,
                acks: 0,
            }
        }
    }

    impl TickSource for MockSource {
        fn peripheral_hz(&self) -> u32 {
            self.clock_hz
        }
        fn dividers(&self) -> &'static [u32] {
            PIC_DIVIDERS
        }
        fn max_count(&self) -> u32 {
            self.max
        }
        fn program(&mut self, setting: TimerSetting) {
            self.programmed = Some(setting);
            self.program_calls += 1;
        }
        fn enable_interrupt(&mut self) {
            self.irq_enabled = true;
        }
        fn disable_interrupt(&mut self) {
            self.irq_enabled = false;
        }
        fn acknowledge(&mut self) {
            self.acks += 1;
        }
    }

    struct Counter(AtomicU32);

    impl Counter {
        const fn new() -> Self {
            Counter(AtomicU32::new(0))
        }
        fn hits(&self) -> u32 {
            self.0.load(Ordering::Relaxed)
        }
    }

    impl Tick for Counter {
        fn on_tick(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn running<const N: usize>() -> TickTimer<MockSource, N> {
        let timer = TickTimer::new(MockSource::new(4_000_000));
        timer.set_configuration(Configuration::OneMillisecond).unwrap();
        timer
    }

    fn drive<const N: usize>(timer: &TickTimer<MockSource, N>, ticks: u32) {
        for _ in 0..ticks {
            timer.on_interrupt();
        }
    }

    #[test]
    fn test_configure_programs_hardware() {
        let timer: TickTimer<MockSource, 4> = TickTimer::new(MockSource::new(70_000_000));
        assert_eq!(timer.state(), TimerState::Off);

        let state = timer
            .set_configuration(Configuration::OneMillisecond)
            .unwrap();
        let setting = TimerSetting { divider: 8, period: 8750 };
        assert_eq!(state, TimerState::Running(setting));
        assert_eq!(timer.state(), TimerState::Running(setting));
        timer.with_source(|s| {
            assert_eq!(s.programmed, Some(setting));
            assert!(s.irq_enabled);
        });

        assert_eq!(timer.set_configuration(Configuration::Off), Ok(TimerState::Off));
        assert!(!timer.is_running());
        timer.with_source(|s| assert!(!s.irq_enabled));
    }

    #[test]
    fn test_configuration_overflow_changes_nothing() {
        // 4 GHz / 1 kHz / 256 = 15_625 counts, too many for a 12-bit counter.
        let timer: TickTimer<MockSource, 2> =
            TickTimer::new(MockSource::with_max(4_000_000_000, 0x0FFF));
        assert_eq!(
            timer.set_configuration(Configuration::OneMillisecond),
            Err(TickError::ConfigurationOverflow)
        );
        assert_eq!(timer.state(), TimerState::Off);
        timer.with_source(|s| {
            assert_eq!(s.program_calls, 0);
            assert!(!s.irq_enabled);
        });
    }

    #[test]
    fn test_two_slot_scenario() {
        static A: Counter = Counter::new();
        static B: Counter = Counter::new();
        static C: Counter = Counter::new();
        let (a, b, c) = (Handler::new(&A), Handler::new(&B), Handler::new(&C));

        let timer = running::<2>();
        assert_eq!(timer.request_tick(a, 3), Ok(0));
        assert_eq!(timer.request_tick(b, 5), Ok(1));
        assert_eq!(timer.request_tick(c, 1), Err(TickError::RegistryFull));

        drive(&timer, 3);
        assert_eq!(A.hits(), 1);
        assert_eq!(B.hits(), 0);

        drive(&timer, 2);
        assert_eq!(A.hits(), 1);
        assert_eq!(B.hits(), 1);

        timer.cancel_tick(a);
        drive(&timer, 3);
        assert_eq!(A.hits(), 1);
        assert_eq!(B.hits(), 1);
        // B is 3 ticks into its next period: 2 more ticks fire it.
        drive(&timer, 2);
        assert_eq!(B.hits(), 2);
        assert_eq!(C.hits(), 0);
    }

    #[test]
    fn test_request_while_off_is_rejected() {
        static A: Counter = Counter::new();
        let timer = running::<2>();
        timer.set_configuration(Configuration::Off).unwrap();
        assert_eq!(
            timer.request_tick(Handler::new(&A), 1),
            Err(TickError::NotConfigured)
        );

        let never: TickTimer<MockSource, 2> = TickTimer::new(MockSource::new(4_000_000));
        assert_eq!(
            never.request_tick(Handler::new(&A), 1),
            Err(TickError::NotConfigured)
        );
    }

    #[test]
    fn test_reconfigure_clears_full_registry() {
        static A: Counter = Counter::new();
        static B: Counter = Counter::new();
        let timer = running::<1>();
        timer.request_tick(Handler::new(&A), 2).unwrap();
        assert_eq!(
            timer.request_tick(Handler::new(&B), 2),
            Err(TickError::RegistryFull)
        );

        timer.set_configuration(Configuration::OneMillisecond).unwrap();
        assert_eq!(timer.active(), 0);
        assert_eq!(timer.request_tick(Handler::new(&B), 2), Ok(0));

        drive(&timer, 4);
        assert_eq!(A.hits(), 0);
        assert_eq!(B.hits(), 2);
    }

    #[test]
    fn test_off_keeps_subscriptions_until_next_start() {
        static A: Counter = Counter::new();
        let timer = running::<2>();
        timer.request_tick(Handler::new(&A), 1).unwrap();
        timer.set_configuration(Configuration::Off).unwrap();
        assert_eq!(timer.active(), 1);

        // A spurious interrupt while off steps nothing.
        assert_eq!(timer.on_interrupt(), 0);
        assert_eq!(A.hits(), 0);

        timer.set_configuration(Configuration::OneMillisecond).unwrap();
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn test_interrupt_acknowledged_every_tick() {
        let timer = running::<2>();
        drive(&timer, 7);
        timer.with_source(|s| assert_eq!(s.acks, 7));
    }

    #[test]
    fn test_cancel_unknown_and_twice_is_noop() {
        static A: Counter = Counter::new();
        static B: Counter = Counter::new();
        let timer = running::<2>();
        timer.request_tick(Handler::new(&A), 2).unwrap();

        timer.cancel_tick(Handler::new(&B));
        assert_eq!(timer.active(), 1);
        timer.cancel_tick(Handler::new(&A));
        timer.cancel_tick(Handler::new(&A));
        assert_eq!(timer.active(), 0);

        // Cancelling is allowed while off too.
        timer.set_configuration(Configuration::Off).unwrap();
        timer.cancel_tick(Handler::new(&A));
    }

    #[test]
    fn test_capacity_then_release() {
        static P: [Counter; 3] = [Counter::new(), Counter::new(), Counter::new()];
        let timer = running::<3>();
        for p in P.iter() {
            assert!(timer.request_tick(Handler::new(p), 10).is_ok());
        }
        assert_eq!(timer.active(), timer.capacity());
        assert_eq!(
            timer.request_tick(Handler::new(&P[0]), 1),
            Err(TickError::RegistryFull)
        );
        timer.cancel_tick(Handler::new(&P[1]));
        assert_eq!(timer.request_tick(Handler::new(&P[0]), 1), Ok(1));
    }

    // Handlers that re-enter the timer from their own callback.

    static REENTRANT: TickTimer<MockSource, 3> = TickTimer::new(MockSource::new(4_000_000));

    struct OneShot(AtomicU32);
    impl Tick for OneShot {
        fn on_tick(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
            REENTRANT.cancel_tick(Handler::new(&ONE_SHOT));
            let _ = REENTRANT.request_tick(Handler::new(&FOLLOWER), 2);
        }
    }
    static ONE_SHOT: OneShot = OneShot(AtomicU32::new(0));
    static FOLLOWER: Counter = Counter::new();

    #[test]
    fn test_handler_may_reenter_timer() {
        REENTRANT
            .set_configuration(Configuration::OneMillisecond)
            .unwrap();
        REENTRANT.request_tick(Handler::new(&ONE_SHOT), 1).unwrap();

        assert_eq!(REENTRANT.on_interrupt(), 1);
        assert_eq!(ONE_SHOT.0.load(Ordering::Relaxed), 1);
        assert_eq!(REENTRANT.active(), 1);

        for _ in 0..4 {
            REENTRANT.on_interrupt();
        }
        assert_eq!(ONE_SHOT.0.load(Ordering::Relaxed), 1);
        assert_eq!(FOLLOWER.hits(), 2);
    }

    // A handler cancelling a later slot of the same pass.

    static CANCELLING: TickTimer<MockSource, 2> = TickTimer::new(MockSource::new(4_000_000));

    struct Canceller(AtomicU32);
    impl Tick for Canceller {
        fn on_tick(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
            CANCELLING.cancel_tick(Handler::new(&VICTIM));
        }
    }
    static CANCELLER: Canceller = Canceller(AtomicU32::new(0));
    static VICTIM: Counter = Counter::new();

    #[test]
    fn test_handler_cancelled_mid_pass_runs_once() {
        CANCELLING
            .set_configuration(Configuration::OneMillisecond)
            .unwrap();
        assert_eq!(CANCELLING.request_tick(Handler::new(&CANCELLER), 1), Ok(0));
        assert_eq!(CANCELLING.request_tick(Handler::new(&VICTIM), 1), Ok(1));

        assert_eq!(CANCELLING.on_interrupt(), 2);
        assert_eq!(CANCELLER.0.load(Ordering::Relaxed), 1);
        assert_eq!(VICTIM.hits(), 1);
        assert_eq!(CANCELLING.active(), 1);

        assert_eq!(CANCELLING.on_interrupt(), 1);
        assert_eq!(CANCELLER.0.load(Ordering::Relaxed), 2);
        assert_eq!(VICTIM.hits(), 1);
    }
}
