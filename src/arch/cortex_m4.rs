//! # Cortex-M4 Port Layer
//!
//! Hardware-specific code for the ARM Cortex-M4 on an STM32F4 board:
//! the SysTick-backed tick source and the GPIOD port carrying the user
//! LEDs.
//!
//! ## SysTick as a Tick Source
//!
//! SysTick is a 24-bit down-counter with a reload register. Its clock is
//! either the processor clock (divider 1) or the external reference at
//! HCLK/8 (divider 8); the divider selector picks between them. The
//! COUNTFLAG/pending state clears itself on exception entry, so no
//! acknowledge step is needed.
//!
//! ## Interrupt Priorities
//!
//! - SysTick: Priority 0xFF (lowest) — application ISRs preempt the tick
//!   callbacks, never the other way round.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use crate::config::{COUNTER_MAX_24, SYSTEM_CLOCK_HZ, SYSTICK_DIVIDERS};
use crate::led::GpioPort;
use crate::prescaler::TimerSetting;
use crate::sync;
use crate::timer::TickSource;

// ---------------------------------------------------------------------------
// SysTick tick source
// ---------------------------------------------------------------------------

/// Tick source driving the multiplexer from SysTick.
///
/// Zero-sized; each call borrows the SysTick peripheral for its duration.
/// Only one instance may exist, and nothing else may use SysTick alongside
/// it.
pub struct SysTickSource {
    _private: (),
}

impl SysTickSource {
    /// # Safety
    /// The caller must own SysTick exclusively for the program's lifetime.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    fn syst(&mut self) -> SYST {
        // SAFETY: exclusivity promised by `new`; no other peripheral is touched.
        unsafe { cortex_m::Peripherals::steal() }.SYST
    }
}

/// SysTick clock source for a selected divider: processor clock for 1,
/// the HCLK/8 reference otherwise.
pub const fn clock_source(divider: u32) -> SystClkSource {
    if divider == 1 {
        SystClkSource::Core
    } else {
        SystClkSource::External
    }
}

impl TickSource for SysTickSource {
    fn peripheral_hz(&self) -> u32 {
        SYSTEM_CLOCK_HZ
    }

    fn dividers(&self) -> &'static [u32] {
        SYSTICK_DIVIDERS
    }

    fn max_count(&self) -> u32 {
        COUNTER_MAX_24
    }

    fn program(&mut self, setting: TimerSetting) {
        let mut syst = self.syst();
        syst.disable_counter();
        syst.set_reload(setting.reload());
        syst.clear_current();
        syst.set_clock_source(clock_source(setting.divider));
        syst.enable_counter();
    }

    fn enable_interrupt(&mut self) {
        self.syst().enable_interrupt();
    }

    fn disable_interrupt(&mut self) {
        self.syst().disable_interrupt();
    }
}

// ---------------------------------------------------------------------------
// Interrupt priority configuration
// ---------------------------------------------------------------------------

/// Set SysTick to the lowest interrupt priority.
///
/// Tick callbacks then never delay application-level ISRs. Priority 0xFF
/// is the lowest on Cortex-M4 with 4 priority bits (effective 0xF0).
pub fn set_interrupt_priorities() {
    unsafe {
        // System Handler Priority Register 3 (SHPR3): 0xE000_ED20
        // Bits [31:24] = SysTick priority
        let shpr3: *mut u32 = 0xE000_ED20 as *mut u32;
        let val = core::ptr::read_volatile(shpr3);
        let val = val | (0xFF << 24);
        core::ptr::write_volatile(shpr3, val);
    }
}

// ---------------------------------------------------------------------------
// GPIOD (user LEDs)
// ---------------------------------------------------------------------------

const RCC_AHB1ENR: *mut u32 = 0x4002_3830 as *mut u32;
const RCC_AHB1ENR_GPIODEN: u32 = 1 << 3;

const GPIOD_BASE: usize = 0x4002_0C00;
const GPIO_MODER: usize = 0x00;
const GPIO_ODR: usize = 0x14;
const GPIO_BSRR: usize = 0x18;

/// GPIO port D of the STM32F4.
pub struct GpioD {
    _private: (),
}

impl GpioD {
    /// # Safety
    /// The caller must own GPIOD exclusively for the program's lifetime.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    fn reg(offset: usize) -> *mut u32 {
        (GPIOD_BASE + offset) as *mut u32
    }
}

impl GpioPort for GpioD {
    fn power_on(&self) {
        sync::critical_section(|_cs| unsafe {
            let en = core::ptr::read_volatile(RCC_AHB1ENR);
            core::ptr::write_volatile(RCC_AHB1ENR, en | RCC_AHB1ENR_GPIODEN);
        });
    }

    fn set_output(&self, pin: u8) {
        let shift = pin as u32 * 2;
        sync::critical_section(|_cs| unsafe {
            let moder = core::ptr::read_volatile(Self::reg(GPIO_MODER));
            let moder = (moder & !(0b11 << shift)) | (0b01 << shift);
            core::ptr::write_volatile(Self::reg(GPIO_MODER), moder);
        });
    }

    fn write(&self, pin: u8, high: bool) {
        // BSRR: low half sets, high half resets; single atomic store.
        let bit = if high { 1 << pin } else { 1 << (pin as u32 + 16) };
        unsafe { core::ptr::write_volatile(Self::reg(GPIO_BSRR), bit) }
    }

    fn toggle(&self, pin: u8) {
        sync::critical_section(|_cs| {
            let high = self.output_level(pin);
            self.write(pin, !high);
        });
    }

    fn output_level(&self, pin: u8) -> bool {
        let odr = unsafe { core::ptr::read_volatile(Self::reg(GPIO_ODR)) };
        odr & (1 << pin) != 0
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
