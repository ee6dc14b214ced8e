//! Cycle-exact protocol drivers for the PIO state machines of Pico 1 and 2.
//!
//! Two drivers share one design problem: express a bit-level protocol as a short PIO
//! program with a known cost in PIO cycles per symbol, pick the clock divider that maps
//! the system clock onto that symbol rate, and move 32-bit words between the state
//! machine's FIFO and application buffers.
//!
//! - [`led_strip`] drives NeoPixel-style (WS2812) LEDs at 800 kHz, 10 PIO cycles per bit.
//! - [`i2s_in`] clocks an I2S microphone and decodes 16/24/32-bit stereo samples,
//!   2 PIO cycles per bit.
//! - [`clock_divider`] computes and validates the divider for both.
//! - [`sample`] post-processes captured samples (downmix, normalize, peak, RMS, PCM bytes).
//!
//! # Glossary
//!
//! - **PIO ([Programmable I/O](https://medium.com/data-science/nine-pico-pio-wats-with-rust-part-1-9d062067dc25)):** Pico 1 has 2. Pico 2 has 3.
//!   Each PIO has 4 state machines that share 32 instruction slots.
//! - **State machine (channel):** runs one PIO program on its own, independent of the CPU.
//!   Claimed exclusively by one driver for the life of the firmware.
//! - **Side-set:** output pins driven alongside every instruction, used here for the
//!   LED data line and the I2S bit clock and word select lines.
//! - **Symbol:** one protocol bit (one LED data bit, one I2S bit clock period).
//! - **Frame:** one left + right sample pair.
#![cfg_attr(not(feature = "host"), no_std)]
#![cfg_attr(not(feature = "host"), no_main)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

// Compile-time checks: exactly one architecture must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "arm", feature = "riscv")), not(feature = "host")))]
compile_error!("Must enable exactly one architecture feature: 'arm' or 'riscv'");

#[cfg(all(feature = "arm", feature = "riscv"))]
compile_error!("Cannot enable both 'arm' and 'riscv' features simultaneously");

// Compile-time check: pico1 only supports ARM
#[cfg(all(feature = "pico1", feature = "riscv"))]
compile_error!("Pico 1 (RP2040) only supports ARM architecture, not RISC-V");

pub mod channel;
pub mod clock_divider;
mod error;
pub mod fifo;
pub mod i2s_in;
pub mod led_strip;
// These modules require embassy_rp and are excluded when testing on host
#[cfg(not(feature = "host"))]
pub mod pio_bus;
#[cfg(not(feature = "host"))]
#[doc(hidden)]
pub mod pio_irqs;
pub mod program;
pub mod sample;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
