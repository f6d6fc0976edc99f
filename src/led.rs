//! # Board LEDs
//!
//! The four user LEDs of the board, driven through a GPIO port's direction
//! and output registers. No state is kept here beyond what the hardware
//! holds: every call is a single register read or read-modify-write.
//!
//! | LED | Pin |
//! |-----|-----|
//! | `Green` (LD4) | PD12 |
//! | `Orange` (LD3) | PD13 |
//! | `Red` (LD5) | PD14 |
//! | `Blue` (LD6) | PD15 |
//!
//! Raw identifiers are mapped with [`Led::from_index`]. The `*_id` methods
//! of [`LedBank`] take raw ids and ignore unknown ones: nothing is written
//! and [`LedBank::get_id`] reports off.

/// Direction and output register access for one GPIO port.
///
/// Methods take `&self` so a port can be shared between thread mode and
/// tick callbacks. Implementations must make each call atomic with respect
/// to interrupts.
pub trait GpioPort: Sync {
    /// Turn on the port's peripheral clock, if it has one.
    fn power_on(&self) {}

    /// Configure `pin` as a push-pull output.
    fn set_output(&self, pin: u8);

    /// Drive `pin` high or low.
    fn write(&self, pin: u8, high: bool);

    /// Invert the output level of `pin`.
    fn toggle(&self, pin: u8);

    /// Current output latch level of `pin`.
    fn output_level(&self, pin: u8) -> bool;
}

/// User LEDs on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    Green,
    Orange,
    Red,
    Blue,
}

impl Led {
    pub const ALL: [Led; 4] = [Led::Green, Led::Orange, Led::Red, Led::Blue];

    /// Map a raw identifier to an LED. `None` for unknown ids.
    pub const fn from_index(id: u8) -> Option<Led> {
        match id {
            0 => Some(Led::Green),
            1 => Some(Led::Orange),
            2 => Some(Led::Red),
            3 => Some(Led::Blue),
            _ => None,
        }
    }

    /// Port pin the LED is wired to.
    #[inline]
    pub const fn pin(self) -> u8 {
        match self {
            Led::Green => 12,
            Led::Orange => 13,
            Led::Red => 14,
            Led::Blue => 15,
        }
    }
}

impl TryFrom<u8> for Led {
    type Error = ();

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Led::from_index(id).ok_or(())
    }
}

/// LED driver over one GPIO port.
pub struct LedBank<P> {
    port: P,
}

impl<P: GpioPort> LedBank<P> {
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    /// Configure the LED's pin as an output. Call once before the others.
    pub fn enable(&self, led: Led) {
        self.port.power_on();
        self.port.set_output(led.pin());
    }

    pub fn on(&self, led: Led) {
        self.port.write(led.pin(), true);
    }

    pub fn off(&self, led: Led) {
        self.port.write(led.pin(), false);
    }

    pub fn toggle(&self, led: Led) {
        self.port.toggle(led.pin());
    }

    /// Whether the LED is currently driven on.
    pub fn get(&self, led: Led) -> bool {
        self.port.output_level(led.pin())
    }

    pub fn enable_id(&self, id: u8) {
        if let Some(led) = Led::from_index(id) {
            self.enable(led);
        }
    }

    pub fn on_id(&self, id: u8) {
        if let Some(led) = Led::from_index(id) {
            self.on(led);
        }
    }

    pub fn off_id(&self, id: u8) {
        if let Some(led) = Led::from_index(id) {
            self.off(led);
        }
    }

    pub fn toggle_id(&self, id: u8) {
        if let Some(led) = Led::from_index(id) {
            self.toggle(led);
        }
    }

    /// `false` for unknown ids.
    pub fn get_id(&self, id: u8) -> bool {
        Led::from_index(id).is_some_and(|led| self.get(led))
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
