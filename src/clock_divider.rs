//! Clock divider math shared by the LED and I2S drivers.
//!
//! A PIO state machine executes one instruction per divided clock tick:
//!
//! ```text
//! pio_clock = system_clock / divider
//! pio_clock = symbol_frequency * cycles_per_symbol
//! ```
//!
//! so `divider = system_clock / (cycles_per_symbol * symbol_frequency)`. The
//! cycles-per-symbol value belongs to a specific program (see
//! [`ProtocolProgram::cycles_per_symbol`](crate::program::ProtocolProgram::cycles_per_symbol));
//! the two drivers never share one.
//!
//! If the divider is computed from the wrong system clock, the output drifts out of the
//! protocol's tolerance and nothing in software can notice. [`DividerSource::Fixed`]
//! lets a measured divider be configured directly.

use fixed::types::U24F8;

use crate::{Error, Result};

/// Largest divider the PIO's 16.8 fixed-point divider register can hold (exclusive).
pub const DIVIDER_MAX: f32 = 65_536.0;

/// Smallest divider the PIO accepts (one instruction per system clock).
pub const DIVIDER_MIN: f32 = 1.0;

/// Divider such that `cycles_per_symbol` PIO cycles take one symbol period.
///
/// No validation: zero inputs give an infinite or NaN result. Use [`ClockDivider`]
/// when the value will be programmed into hardware.
///
/// ```
/// use pio_envoy::clock_divider::clock_divider;
///
/// assert_eq!(clock_divider(125_000_000, 800_000, 10), 15.625);
/// assert_eq!(clock_divider(150_000_000, 800_000, 10), 18.75);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "clock rates fit in f32 closely enough")]
pub fn clock_divider(system_clock_hz: u32, symbol_frequency_hz: u32, cycles_per_symbol: u32) -> f32 {
    system_clock_hz as f32 / (cycles_per_symbol as f32 * symbol_frequency_hz as f32)
}

/// Symbol frequency produced by `divider`; the inverse of [`clock_divider`].
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "clock rates fit in f32 closely enough")]
pub fn symbol_frequency(system_clock_hz: u32, divider: f32, cycles_per_symbol: u32) -> f32 {
    system_clock_hz as f32 / (divider * cycles_per_symbol as f32)
}

/// A divider known to fit the PIO divider register.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockDivider(f32);

impl ClockDivider {
    /// Validate and compute the divider for a program.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFrequency`] if any input is zero, [`Error::DividerOutOfRange`]
    /// if the result is below [`DIVIDER_MIN`] or not below [`DIVIDER_MAX`].
    pub fn from_frequencies(
        system_clock_hz: u32,
        symbol_frequency_hz: u32,
        cycles_per_symbol: u32,
    ) -> Result<Self> {
        if system_clock_hz == 0 || symbol_frequency_hz == 0 || cycles_per_symbol == 0 {
            return Err(Error::InvalidFrequency);
        }
        Self::new(clock_divider(
            system_clock_hz,
            symbol_frequency_hz,
            cycles_per_symbol,
        ))
    }

    /// Use an explicit divider value, for example one measured on a scope.
    ///
    /// # Errors
    ///
    /// [`Error::DividerOutOfRange`] if `divider` is NaN, below [`DIVIDER_MIN`], or not
    /// below [`DIVIDER_MAX`].
    pub fn new(divider: f32) -> Result<Self> {
        if (DIVIDER_MIN..DIVIDER_MAX).contains(&divider) {
            Ok(Self(divider))
        } else {
            Err(Error::DividerOutOfRange)
        }
    }

    /// The divider as a float.
    #[must_use]
    pub const fn as_f32(self) -> f32 {
        self.0
    }

    /// The divider in the PIO's 16.8 fixed-point format (the fraction is truncated to 1/256).
    #[must_use]
    pub fn to_fixed(self) -> U24F8 {
        U24F8::from_num(self.0)
    }
}

/// Where a driver gets its clock divider from at initialization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DividerSource {
    /// Read the running system clock (`clk_sys`) when the driver starts.
    MeasuredSystemClock,
    /// Assume the system clock runs at this frequency.
    SystemClockHz(u32),
    /// Program exactly this divider, ignoring the system clock.
    Fixed(f32),
}

impl Default for DividerSource {
    fn default() -> Self {
        Self::MeasuredSystemClock
    }
}

impl DividerSource {
    /// Resolve to a validated divider. `measure` is only called for
    /// [`DividerSource::MeasuredSystemClock`].
    ///
    /// # Errors
    ///
    /// See [`ClockDivider::from_frequencies`] and [`ClockDivider::new`].
    pub fn resolve(
        self,
        measure: impl FnOnce() -> u32,
        symbol_frequency_hz: u32,
        cycles_per_symbol: u32,
    ) -> Result<ClockDivider> {
        match self {
            Self::MeasuredSystemClock => {
                ClockDivider::from_frequencies(measure(), symbol_frequency_hz, cycles_per_symbol)
            }
            Self::SystemClockHz(system_clock_hz) => ClockDivider::from_frequencies(
                system_clock_hz,
                symbol_frequency_hz,
                cycles_per_symbol,
            ),
            Self::Fixed(divider) => ClockDivider::new(divider),
        }
    }
}
