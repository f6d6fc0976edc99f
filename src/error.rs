//! # Errors
//!
//! Every failure in the tick subsystem is a local return value. Nothing
//! here panics or needs a runtime to report.

use core::fmt;

/// Reasons a tick-timer operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickError {
    /// The base period cannot be represented with any available divider.
    /// This is a board configuration error, not a runtime condition.
    ConfigurationOverflow,
    /// Every subscription slot is occupied.
    RegistryFull,
    /// The timer is `Off`; subscriptions are only accepted while running.
    NotConfigured,
    /// A rate of zero ticks was requested.
    ZeroRate,
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TickError::ConfigurationOverflow => "tick period overflows every clock divider",
            TickError::RegistryFull => "no free tick subscription slot",
            TickError::NotConfigured => "tick timer is not running",
            TickError::ZeroRate => "tick rate must be at least one",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(TickError::RegistryFull.to_string(), "no free tick subscription slot");
        assert_eq!(TickError::NotConfigured.to_string(), "tick timer is not running");
    }
}
