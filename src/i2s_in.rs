//! A device abstraction for I2S microphones (INMP441 and similar) captured by one PIO
//! state machine.
//!
//! The state machine is the I2S controller: it drives the bit clock and word select
//! lines as side-set pins and samples the data line once per bit clock period.
//!
//! ```text
//! BCLK  _‾_‾_‾_‾ ... _‾_‾_‾_‾_‾ ... _‾_‾_‾
//! WS    ____________________‾‾‾‾‾‾ ... ‾‾‾‾‾‾‾‾‾‾‾__
//! DATA   L(msb) ...  L(lsb) R(msb) ...   R(lsb) L(msb)
//! ```
//!
//! Word select changes with the last bit of each word, one bit before the next word's
//! most significant bit, as I2S requires. Each bit costs 2 PIO cycles (clock low, clock
//! high), so the divider is `system_clock / (2 × bit_width × 2 × sample_rate)`.
//!
//! # Pins
//!
//! The PIO addresses side-set and input pins as base + count ranges, so the three pins
//! must be consecutive GPIOs in the order bit clock, word select, data (for example
//! GPIO10, GPIO11, GPIO12). [`I2sPins::new`] checks this before anything is claimed.
//!
//! # Reading
//!
//! The joined RX FIFO holds 8 words, i.e. 4 frames. [`I2sIn::read_stereo`] and friends
//! spin until a frame arrives and never time out; to bound the wait, poll
//! [`I2sIn::read_stereo_nonblocking`] or await [`I2sIn::wait_stereo`] under
//! `embassy_time::with_timeout`.
//!
//! Dropping a [`I2sIn::wait_stereo`] future between the left and right words keeps the
//! left word inside the [`I2sIn`]; the next read of any kind finishes that frame, so
//! left and right never swap. A cancelled [`I2sIn::wait_samples`] keeps the frames
//! already written to its buffer.
//!
//! # Example
//!
//! ```rust,ignore
//! # #![no_std]
//! # #![no_main]
//! # use panic_probe as _;
//! # use core::convert::Infallible;
//! use pio_envoy::{Result, pio_split};
//! use pio_envoy::i2s_in::{I2sIn, I2sInConfig, SampleRate};
//! use pio_envoy::sample::{SampleBitWidth, StereoSample, rms_amplitude};
//!
//! # #[embassy_executor::main]
//! # async fn main(_spawner: embassy_executor::Spawner) -> ! {
//! #     let err = example().await.unwrap_err();
//! #     core::panic!("{err}");
//! # }
//! async fn example() -> Result<Infallible> {
//!     let p = embassy_rp::init(Default::default());
//!     let (_sm0, sm1, _sm2, _sm3) = pio_split!(PIO0, p.PIO0);
//!
//!     let config = I2sInConfig::new(SampleRate::Hz16000, SampleBitWidth::Bits32);
//!     let mut mic = I2sIn::new(sm1, p.PIN_10, p.PIN_11, p.PIN_12, config)?;
//!
//!     let mut buffer = [StereoSample::default(); 256];
//!     loop {
//!         mic.read_samples(&mut buffer);
//!         let (left_rms, _right_rms) = rms_amplitude(&buffer);
//!         defmt::info!("level {}", left_rms);
//!     }
//! }
//! ```

use pio::{Assembler, InSource, JmpCondition, SetDestination, SideSet};

use crate::clock_divider::DividerSource;
use crate::fifo::RxFifo;
use crate::program::{PinRole, ProtocolProgram};
use crate::sample::{SampleBitWidth, StereoSample};
use crate::{Error, Result};

// ============================================================================
// Protocol Constants
// ============================================================================

/// PIO cycles per I2S bit: one with the bit clock low, one with it high.
pub const I2S_CYCLES_PER_BIT: u32 = 2;

/// RX FIFO depth with TX joined into RX.
pub const RX_FIFO_DEPTH: u8 = 8;

/// FIFO words per stereo frame.
pub const WORDS_PER_FRAME: u8 = 2;

/// Default sample rate.
pub const SAMPLE_RATE_DEFAULT: SampleRate = SampleRate::Hz16000;

/// Default sample width.
pub const SAMPLE_BIT_WIDTH_DEFAULT: SampleBitWidth = SampleBitWidth::Bits32;

// Side-set values: bit 0 is the bit clock, bit 1 is word select.
const CLOCK_LOW_LEFT: u8 = 0b00;
const CLOCK_HIGH_LEFT: u8 = 0b01;
const CLOCK_LOW_RIGHT: u8 = 0b10;
const CLOCK_HIGH_RIGHT: u8 = 0b11;

// ============================================================================
// Sample Rate
// ============================================================================

/// Supported sample rates.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum SampleRate {
    /// 8 kHz.
    Hz8000,
    /// 16 kHz.
    Hz16000,
    /// 32 kHz.
    Hz32000,
    /// 44.1 kHz.
    Hz44100,
    /// 48 kHz.
    Hz48000,
    /// 88.2 kHz.
    Hz88200,
    /// 96 kHz.
    Hz96000,
}

impl SampleRate {
    /// Frames per second.
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz8000 => 8_000,
            Self::Hz16000 => 16_000,
            Self::Hz32000 => 32_000,
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
            Self::Hz88200 => 88_200,
            Self::Hz96000 => 96_000,
        }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = Error;

    fn try_from(hz: u32) -> Result<Self> {
        match hz {
            8_000 => Ok(Self::Hz8000),
            16_000 => Ok(Self::Hz16000),
            32_000 => Ok(Self::Hz32000),
            44_100 => Ok(Self::Hz44100),
            48_000 => Ok(Self::Hz48000),
            88_200 => Ok(Self::Hz88200),
            96_000 => Ok(Self::Hz96000),
            _ => Err(Error::UnsupportedSampleRate(hz)),
        }
    }
}

/// Bit clock edges per second the divider is computed for: `sample_rate × bit_width × 2`.
#[must_use]
pub const fn bit_clock_hz(sample_rate: SampleRate, bit_width: SampleBitWidth) -> u32 {
    sample_rate
        .hz()
        .saturating_mul(bit_width.bits())
        .saturating_mul(2)
}

// ============================================================================
// Program
// ============================================================================

/// Build the I2S receive program for `bit_width`-bit words.
///
/// The microphone changes data on the falling clock edge and every `in` runs on a
/// rising edge. Word select changes on the falling edge that starts the last bit of a
/// word, one bit before the next word's most significant bit.
///
/// ```text
/// .side_set 2                          ; bit 0 = BCLK, bit 1 = WS
///     set x, W-3          side 0b00
/// .wrap_target
/// left:
///     in pins, 1          side 0b01
///     jmp x-- left        side 0b00
///     in pins, 1          side 0b01
///     set x, W-3          side 0b10    ; WS rises with the last left bit
///     in pins, 1          side 0b11
///     nop                 side 0b10
/// right:
///     in pins, 1          side 0b11
///     jmp x-- right       side 0b10
///     in pins, 1          side 0b11
///     set x, W-3          side 0b00    ; WS falls with the last right bit
///     in pins, 1          side 0b01
///     nop                 side 0b00
/// .wrap
/// ```
///
/// Autopush at `W` bits turns each channel into one FIFO word.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "bit widths are at most 32")]
pub fn program(bit_width: SampleBitWidth) -> ProtocolProgram {
    // The loop reads W-2 bits; the tail reads the last two.
    let loop_count = (bit_width.bits() as u8).saturating_sub(3);
    let side_set = SideSet::new(false, 2, false);
    let mut assembler: Assembler<32> = Assembler::new_with_side_set(side_set);

    let mut wrap_target = assembler.label();
    let mut wrap_source = assembler.label();
    let mut left = assembler.label();
    let mut right = assembler.label();

    assembler.set_with_side_set(SetDestination::X, loop_count, CLOCK_LOW_LEFT);
    assembler.bind(&mut wrap_target);
    assembler.bind(&mut left);
    assembler.in_with_side_set(InSource::PINS, 1, CLOCK_HIGH_LEFT);
    assembler.jmp_with_side_set(JmpCondition::XDecNonZero, &mut left, CLOCK_LOW_LEFT);
    assembler.in_with_side_set(InSource::PINS, 1, CLOCK_HIGH_LEFT);
    assembler.set_with_side_set(SetDestination::X, loop_count, CLOCK_LOW_RIGHT);
    assembler.in_with_side_set(InSource::PINS, 1, CLOCK_HIGH_RIGHT);
    assembler.nop_with_delay_and_side_set(0, CLOCK_LOW_RIGHT);
    assembler.bind(&mut right);
    assembler.in_with_side_set(InSource::PINS, 1, CLOCK_HIGH_RIGHT);
    assembler.jmp_with_side_set(JmpCondition::XDecNonZero, &mut right, CLOCK_LOW_RIGHT);
    assembler.in_with_side_set(InSource::PINS, 1, CLOCK_HIGH_RIGHT);
    assembler.set_with_side_set(SetDestination::X, loop_count, CLOCK_LOW_LEFT);
    assembler.in_with_side_set(InSource::PINS, 1, CLOCK_HIGH_LEFT);
    assembler.nop_with_delay_and_side_set(0, CLOCK_LOW_LEFT);
    assembler.bind(&mut wrap_source);

    ProtocolProgram::new(
        assembler.assemble_with_wrap(wrap_source, wrap_target),
        I2S_CYCLES_PER_BIT,
        2,
        &[PinRole::BitClock, PinRole::WordSelect],
    )
}

// ============================================================================
// Pins and Configuration
// ============================================================================

/// GPIO numbers of the I2S lines, checked to be consecutive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct I2sPins {
    clock: u8,
}

impl I2sPins {
    /// Check that `word_select == clock + 1` and `data == word_select + 1`.
    ///
    /// # Errors
    ///
    /// [`Error::NonContiguousPins`] otherwise.
    pub fn new(clock: u8, word_select: u8, data: u8) -> Result<Self> {
        let contiguous = clock.checked_add(1) == Some(word_select)
            && word_select.checked_add(1) == Some(data);
        if contiguous {
            Ok(Self { clock })
        } else {
            Err(Error::NonContiguousPins {
                clock,
                word_select,
                data,
            })
        }
    }

    /// Bit clock GPIO (side-set base).
    #[must_use]
    pub const fn clock(self) -> u8 {
        self.clock
    }

    /// Word select GPIO.
    #[must_use]
    pub const fn word_select(self) -> u8 {
        self.clock.wrapping_add(1)
    }

    /// Data GPIO (input base).
    #[must_use]
    pub const fn data(self) -> u8 {
        self.clock.wrapping_add(2)
    }
}

/// Startup configuration for an [`I2sIn`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct I2sInConfig {
    /// Frames per second.
    pub sample_rate: SampleRate,
    /// Bits per channel word; also the autopush threshold.
    pub bit_width: SampleBitWidth,
    /// Where the clock divider comes from.
    pub divider: DividerSource,
}

impl I2sInConfig {
    /// Divider from the measured system clock.
    #[must_use]
    pub const fn new(sample_rate: SampleRate, bit_width: SampleBitWidth) -> Self {
        Self {
            sample_rate,
            bit_width,
            divider: DividerSource::MeasuredSystemClock,
        }
    }

    /// Override where the divider comes from.
    #[must_use]
    pub const fn with_divider(self, divider: DividerSource) -> Self {
        Self { divider, ..self }
    }

    /// Bit clock rate this configuration asks for.
    #[must_use]
    pub const fn bit_clock_hz(&self) -> u32 {
        bit_clock_hz(self.sample_rate, self.bit_width)
    }
}

impl Default for I2sInConfig {
    fn default() -> Self {
        Self::new(SAMPLE_RATE_DEFAULT, SAMPLE_BIT_WIDTH_DEFAULT)
    }
}

// ============================================================================
// I2S Input Device
// ============================================================================

/// Stereo capture from an [`RxFifo`] fed by [`program()`].
///
/// See the [module documentation](mod@crate::i2s_in) for a hardware example.
pub struct I2sIn<F: RxFifo> {
    fifo: F,
    sample_rate: SampleRate,
    bit_width: SampleBitWidth,
    // Left word of a frame whose right word has not arrived yet.
    pending_left: Option<u32>,
}

impl<F: RxFifo> I2sIn<F> {
    /// Decode frames from `fifo`, whose words are left-aligned `bit_width`-bit samples.
    #[must_use]
    pub const fn with_fifo(fifo: F, sample_rate: SampleRate, bit_width: SampleBitWidth) -> Self {
        Self {
            fifo,
            sample_rate,
            bit_width,
            pending_left: None,
        }
    }

    /// Configured sample rate.
    #[must_use]
    pub const fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Configured sample width.
    #[must_use]
    pub const fn bit_width(&self) -> SampleBitWidth {
        self.bit_width
    }

    /// The underlying FIFO.
    pub fn into_fifo(self) -> F {
        self.fifo
    }

    /// Words not yet read: those in the RX FIFO plus a left word held from an
    /// interrupted [`wait_stereo`](Self::wait_stereo), `0..=9`.
    pub fn fifo_level(&mut self) -> u8 {
        self.fifo
            .level()
            .saturating_add(u8::from(self.pending_left.is_some()))
    }

    /// True when a whole frame (two words) is queued.
    pub fn is_readable(&mut self) -> bool {
        self.fifo_level() >= WORDS_PER_FRAME
    }

    /// Spin until a frame is available, consume it, and decode it.
    pub fn read_stereo(&mut self) -> StereoSample {
        let left = match self.pending_left.take() {
            Some(word) => word,
            None => self.pull_blocking(),
        };
        let right = self.pull_blocking();
        StereoSample::from_raw(left, right, self.bit_width)
    }

    /// Decode the next frame, or return `None` without consuming anything if less
    /// than a whole frame is queued.
    pub fn read_stereo_nonblocking(&mut self) -> Option<StereoSample> {
        if !self.is_readable() {
            return None;
        }
        let left = match self.pending_left.take() {
            Some(word) => word,
            None => self.fifo.try_pull()?,
        };
        let Some(right) = self.fifo.try_pull() else {
            self.pending_left = Some(left);
            return None;
        };
        Some(StereoSample::from_raw(left, right, self.bit_width))
    }

    /// Read a frame and return only its left sample.
    ///
    /// This does not average; see [`sample_to_mono`](crate::sample::sample_to_mono) for that.
    pub fn read_mono(&mut self) -> i32 {
        self.read_stereo().left
    }

    /// Fill all of `buffer`, spinning for each frame.
    pub fn read_samples(&mut self, buffer: &mut [StereoSample]) {
        for slot in buffer.iter_mut() {
            *slot = self.read_stereo();
        }
    }

    /// Fill `buffer` from already-queued frames, stopping at the first missing one.
    /// Returns the number of slots filled.
    pub fn read_samples_available(&mut self, buffer: &mut [StereoSample]) -> usize {
        let mut filled = 0_usize;
        for slot in buffer.iter_mut() {
            let Some(sample) = self.read_stereo_nonblocking() else {
                break;
            };
            *slot = sample;
            filled = filled.saturating_add(1);
        }
        filled
    }

    /// Await the next frame without spinning.
    ///
    /// Cancel safe: a left word pulled before the future is dropped stays held for
    /// the next read.
    pub async fn wait_stereo(&mut self) -> StereoSample {
        let left = match self.pending_left {
            Some(word) => word,
            None => {
                let word = self.fifo.wait_pull().await;
                self.pending_left = Some(word);
                word
            }
        };
        let right = self.fifo.wait_pull().await;
        self.pending_left = None;
        StereoSample::from_raw(left, right, self.bit_width)
    }

    /// Await frames until `buffer` is full.
    ///
    /// Cancel safe in the same way as [`wait_stereo`](Self::wait_stereo).
    pub async fn wait_samples(&mut self, buffer: &mut [StereoSample]) {
        for slot in buffer.iter_mut() {
            *slot = self.wait_stereo().await;
        }
    }

    fn pull_blocking(&mut self) -> u32 {
        loop {
            if let Some(word) = self.fifo.try_pull() {
                return word;
            }
            core::hint::spin_loop();
        }
    }
}

// ============================================================================
// Hardware Constructor
// ============================================================================

#[cfg(not(feature = "host"))]
mod hardware {
    use defmt::info;
    use embassy_rp::Peri;
    use embassy_rp::clocks::clk_sys_freq;
    use embassy_rp::gpio::Pin as _;
    use embassy_rp::pio::{Config, Direction, FifoJoin, Instance, PioPin, ShiftConfig, ShiftDirection};

    use super::{I2sIn, I2sInConfig, I2sPins};
    use crate::fifo::PioRxFifo;
    use crate::pio_bus::PioStateMachine;
    use crate::{Error, Result};

    impl<PIO: Instance + 'static, const SM: usize> I2sIn<PioRxFifo<PIO, SM>> {
        /// Check the pin group, claim `state_machine`, load the receive program for
        /// `config.bit_width`, and start clocking the microphone.
        ///
        /// # Errors
        ///
        /// [`Error::NonContiguousPins`] (checked first, before any claim), divider errors,
        /// [`Error::ChannelUnavailable`], or [`Error::ProgramSpace`].
        ///
        /// See the [module documentation](mod@crate::i2s_in) for example usage.
        #[allow(clippy::cast_possible_truncation, reason = "bit widths are at most 32")]
        pub fn new(
            state_machine: PioStateMachine<PIO, SM>,
            clock: Peri<'static, impl PioPin>,
            word_select: Peri<'static, impl PioPin>,
            data: Peri<'static, impl PioPin>,
            config: I2sInConfig,
        ) -> Result<Self> {
            let pins = I2sPins::new(clock.pin(), word_select.pin(), data.pin())?;
            let i2s_program = super::program(config.bit_width);
            let divider = config.divider.resolve(
                clk_sys_freq,
                config.bit_clock_hz(),
                i2s_program.cycles_per_symbol(),
            )?;

            let (bus, mut sm) = state_machine.into_parts();
            let claim = bus.claim_channel(SM)?;

            bus.with_common(|common| {
                let loaded = common
                    .try_load_program(i2s_program.program())
                    .map_err(|_| Error::ProgramSpace)?;
                let clock_pin = common.make_pio_pin(clock);
                let word_select_pin = common.make_pio_pin(word_select);
                let data_pin = common.make_pio_pin(data);

                let mut cfg = Config::default();
                cfg.use_program(&loaded, &[&clock_pin, &word_select_pin]);
                cfg.set_in_pins(&[&data_pin]);
                cfg.clock_divider = divider.to_fixed();
                cfg.fifo_join = FifoJoin::RxOnly;
                cfg.shift_in = ShiftConfig {
                    auto_fill: true,
                    threshold: config.bit_width.bits() as u8,
                    direction: ShiftDirection::Left,
                };
                sm.set_pin_dirs(Direction::Out, &[&clock_pin, &word_select_pin]);
                sm.set_pin_dirs(Direction::In, &[&data_pin]);
                sm.set_config(&cfg);
                sm.set_enable(true);
                Ok::<(), Error>(())
            })?;

            info!(
                "I2sIn: sm {} on GPIO{}..={}, {} Hz x {} bits, divider {}",
                SM,
                pins.clock(),
                pins.data(),
                config.sample_rate.hz(),
                config.bit_width.bits(),
                divider.as_f32()
            );
            Ok(Self::with_fifo(
                PioRxFifo::new(sm, config.bit_width.bits(), claim),
                config.sample_rate,
                config.bit_width,
            ))
        }
    }
}
