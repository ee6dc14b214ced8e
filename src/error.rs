//! Crate-wide error type.
//!
//! Every variant is a configuration error: it is returned from a constructor or a
//! `TryFrom` conversion before the state machine is started. Once a driver exists,
//! its reads and writes cannot fail, only wait.

use derive_more::{Display, Error};

/// Errors returned while configuring a PIO protocol driver.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum Error {
    /// The requested audio sample rate is not one of [`SampleRate`](crate::i2s_in::SampleRate)'s values.
    #[display("unsupported sample rate: {_0} Hz")]
    UnsupportedSampleRate(#[error(not(source))] u32),

    /// The requested sample width is not 16, 24, or 32 bits.
    #[display("unsupported sample bit width: {_0}")]
    UnsupportedBitWidth(#[error(not(source))] u8),

    /// The I2S pins are not the consecutive group clock, word select, data.
    #[display(
        "I2S pins must be consecutive (clock, word select, data), got GPIO{clock}, GPIO{word_select}, GPIO{data}"
    )]
    NonContiguousPins {
        /// Bit clock GPIO number.
        clock: u8,
        /// Word select GPIO number.
        word_select: u8,
        /// Data GPIO number.
        data: u8,
    },

    /// The state machine was already claimed, or no state machine is free.
    #[display("no free PIO state machine")]
    ChannelUnavailable,

    /// A clock frequency or cycle count of zero was supplied.
    #[display("clock frequencies and cycles per symbol must be positive")]
    InvalidFrequency,

    /// The computed or supplied divider does not fit the PIO's 16.8 divider register.
    #[display("clock divider outside the PIO range 1.0..65536.0")]
    DividerOutOfRange,

    /// The PIO block has no room left for the program's instructions.
    #[display("not enough PIO instruction memory for the program")]
    ProgramSpace,
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
