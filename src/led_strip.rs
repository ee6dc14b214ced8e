//! A device abstraction for NeoPixel-style (WS2812) LED strips driven by one PIO state machine.
//!
//! The data line is self-clocked at 800 kHz. Every bit takes 10 PIO cycles and is told
//! apart only by how long the line stays high:
//!
//! ```text
//!         |<------ 10 cycles ------>|
//! one:    __|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_____      low 2, high 8
//! zero:   __|‾‾‾‾‾‾|_______________      low 2, high 3, low 5
//! ```
//!
//! Pixels are sent green, red, blue, most significant bit first, 24 bits each. Each
//! LED keeps the first 24 bits it sees and forwards the rest, so writing `len`
//! colors in a row addresses the whole chain.
//!
//! # Example
//!
//! ```rust,ignore
//! # #![no_std]
//! # #![no_main]
//! # use panic_probe as _;
//! # use core::convert::Infallible;
//! use pio_envoy::{Result, pio_split};
//! use pio_envoy::led_strip::{LedStrip, LedStripConfig, colors};
//!
//! # #[embassy_executor::main]
//! # async fn main(_spawner: embassy_executor::Spawner) -> ! {
//! #     let err = example().await.unwrap_err();
//! #     core::panic!("{err}");
//! # }
//! async fn example() -> Result<Infallible> {
//!     let p = embassy_rp::init(Default::default());
//!     let (sm0, _sm1, _sm2, _sm3) = pio_split!(PIO0, p.PIO0);
//!
//!     let mut led_strip = LedStrip::new(sm0, p.PIN_16, LedStripConfig::new(8))?;
//!     led_strip.fill(0x00_20_00); // dim green on all 8 LEDs
//!     led_strip.set_pixel(colors::RED); // first LED red on the next frame
//!     core::future::pending().await // run forever
//! }
//! ```

/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;

use core::convert::Infallible;

use pio::{Assembler, JmpCondition, OutDestination, SideSet};
use smart_leds::{RGB8, SmartLedsWrite};

use crate::clock_divider::DividerSource;
use crate::fifo::TxFifo;
use crate::program::{PinRole, ProtocolProgram};

/// RGB color representation re-exported from the `smart_leds` crate.
pub type Rgb = RGB8;

// ============================================================================
// Protocol Constants
// ============================================================================

/// WS2812 bit rate. Parts accept ±150 kHz.
pub const LED_BIT_FREQUENCY_HZ: u32 = 800_000;

/// Cycles in the high lead-in shared by both symbols.
pub const T1: u8 = 3;
/// Cycles that decide the bit: high for a one, low for a zero.
pub const T2: u8 = 5;
/// Cycles in the low tail shared by both symbols.
pub const T3: u8 = 2;

/// PIO cycles per LED bit.
pub const LED_CYCLES_PER_BIT: u32 = (T1 + T2 + T3) as u32;

/// Bits per pixel on the wire.
pub const BITS_PER_PIXEL: u32 = 24;

/// Default number of LEDs on a strip.
pub const LED_STRIP_LEN_DEFAULT: usize = 1;

// ============================================================================
// Program
// ============================================================================

/// Build the WS2812 program.
///
/// ```text
/// .side_set 1
/// .wrap_target
/// bitloop:
///     out x, 1        side 0 [T3 - 1]  ; low tail of the previous bit
///     jmp !x do_zero  side 1 [T1 - 1]  ; lead-in high
///     jmp bitloop     side 1 [T2 - 1]  ; one: stay high
/// do_zero:
///     nop             side 0 [T2 - 1]  ; zero: go low
/// .wrap
/// ```
#[must_use]
pub fn program() -> ProtocolProgram {
    let side_set = SideSet::new(false, 1, false);
    let mut assembler: Assembler<32> = Assembler::new_with_side_set(side_set);

    let mut wrap_target = assembler.label();
    let mut wrap_source = assembler.label();
    let mut do_zero = assembler.label();
    assembler.bind(&mut wrap_target);
    assembler.out_with_delay_and_side_set(OutDestination::X, 1, T3 - 1, 0);
    assembler.jmp_with_delay_and_side_set(JmpCondition::XIsZero, &mut do_zero, T1 - 1, 1);
    assembler.jmp_with_delay_and_side_set(JmpCondition::Always, &mut wrap_target, T2 - 1, 1);
    assembler.bind(&mut do_zero);
    assembler.nop_with_delay_and_side_set(T2 - 1, 0);
    assembler.bind(&mut wrap_source);

    ProtocolProgram::new(
        assembler.assemble_with_wrap(wrap_source, wrap_target),
        LED_CYCLES_PER_BIT,
        1,
        &[PinRole::LedData],
    )
}

// ============================================================================
// Pixel Encoding
// ============================================================================

/// Pack three channels as `0xRRGGBB`.
#[must_use]
pub const fn pack_rgb(red: u8, green: u8, blue: u8) -> u32 {
    u32::from_be_bytes([0, red, green, blue])
}

/// Convert `0xRRGGBB` to the transmit word: GRB order in bits 23..0, then shifted
/// left 8 so the state machine shifts out the top 24 bits. Bits above 23 are ignored.
///
/// ```
/// use pio_envoy::led_strip::color_to_word;
///
/// assert_eq!(color_to_word(0xFF_00_00), 0x00_FF_00_00); // red lands in the second byte
/// assert_eq!(color_to_word(0x00_FF_00), 0xFF_00_00_00); // green goes first
/// ```
#[must_use]
pub const fn color_to_word(rgb: u32) -> u32 {
    let red = (rgb >> 16) & 0xFF;
    let green = (rgb >> 8) & 0xFF;
    let blue = rgb & 0xFF;
    ((green << 16) | (red << 8) | blue) << 8
}

/// [`color_to_word`] for an [`Rgb`] value.
#[must_use]
pub const fn rgb_to_word(color: Rgb) -> u32 {
    color_to_word(pack_rgb(color.r, color.g, color.b))
}

// ============================================================================
// Configuration
// ============================================================================

/// Startup configuration for a [`LedStrip`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedStripConfig {
    /// Number of LEDs in the chain.
    pub len: usize,
    /// Where the clock divider comes from.
    pub divider: DividerSource,
}

impl LedStripConfig {
    /// `len` LEDs, divider from the measured system clock.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            divider: DividerSource::MeasuredSystemClock,
        }
    }

    /// Override where the divider comes from.
    #[must_use]
    pub const fn with_divider(self, divider: DividerSource) -> Self {
        Self { divider, ..self }
    }
}

impl Default for LedStripConfig {
    fn default() -> Self {
        Self::new(LED_STRIP_LEN_DEFAULT)
    }
}

// ============================================================================
// LED Strip Device
// ============================================================================

/// A chain of WS2812 LEDs fed through a [`TxFifo`].
///
/// The blocking methods spin while the FIFO is full; the `async` ones await room
/// instead. Writes never fail.
///
/// See the [module documentation](mod@crate::led_strip) for a hardware example.
pub struct LedStrip<F: TxFifo> {
    fifo: F,
    len: usize,
}

impl<F: TxFifo> LedStrip<F> {
    /// Drive `len` LEDs through `fifo`. The state machine behind `fifo` must already run
    /// [`program()`].
    #[must_use]
    pub const fn with_fifo(fifo: F, len: usize) -> Self {
        Self { fifo, len }
    }

    /// Number of LEDs in the chain.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length chain.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying FIFO.
    pub fn into_fifo(self) -> F {
        self.fifo
    }

    /// Send one `0xRRGGBB` color to the next LED, spinning while the FIFO is full.
    pub fn set_color(&mut self, rgb: u32) {
        let word = color_to_word(rgb);
        while !self.fifo.try_push(word) {
            core::hint::spin_loop();
        }
    }

    /// Send one color given as separate channels.
    pub fn set_rgb(&mut self, red: u8, green: u8, blue: u8) {
        self.set_color(pack_rgb(red, green, blue));
    }

    /// Send one [`Rgb`] color.
    pub fn set_pixel(&mut self, color: Rgb) {
        self.set_rgb(color.r, color.g, color.b);
    }

    /// Send `rgb` to every LED.
    pub fn fill(&mut self, rgb: u32) {
        for _ in 0..self.len {
            self.set_color(rgb);
        }
    }

    /// Turn every LED off.
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Send each color in order.
    pub fn write_pixels(&mut self, pixels: impl IntoIterator<Item = Rgb>) {
        for color in pixels {
            self.set_pixel(color);
        }
    }

    /// Send one color, awaiting FIFO room instead of spinning.
    pub async fn write_color(&mut self, rgb: u32) {
        self.fifo.wait_push(color_to_word(rgb)).await;
    }

    /// Send each color in order, awaiting FIFO room.
    pub async fn write_frame(&mut self, pixels: &[Rgb]) {
        for &color in pixels {
            self.fifo.wait_push(rgb_to_word(color)).await;
        }
    }
}

impl<F: TxFifo> SmartLedsWrite for LedStrip<F> {
    type Error = Infallible;
    type Color = Rgb;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.write_pixels(iterator.into_iter().map(Into::into));
        Ok(())
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
    use embassy_rp::pio::{Config, Direction, FifoJoin, Instance, PioPin, ShiftConfig, ShiftDirection};

    use super::{BITS_PER_PIXEL, LED_BIT_FREQUENCY_HZ, LedStrip, LedStripConfig};
    use crate::Result;
    use crate::fifo::PioTxFifo;
    use crate::pio_bus::PioStateMachine;

    impl<PIO: Instance + 'static, const SM: usize> LedStrip<PioTxFifo<PIO, SM>> {
        /// Claim `state_machine`, load the WS2812 program (once per PIO), and start
        /// driving `pin`.
        ///
        /// # Errors
        ///
        /// Divider errors from [`DividerSource::resolve`](crate::clock_divider::DividerSource::resolve),
        /// [`Error::ChannelUnavailable`](crate::Error::ChannelUnavailable) if the state
        /// machine is taken, [`Error::ProgramSpace`](crate::Error::ProgramSpace) if the PIO is full.
        ///
        /// See the [module documentation](mod@crate::led_strip) for example usage.
        pub fn new(
            state_machine: PioStateMachine<PIO, SM>,
            pin: Peri<'static, impl PioPin>,
            config: LedStripConfig,
        ) -> Result<Self> {
            let (bus, mut sm) = state_machine.into_parts();
            let led_program = super::program();
            let divider = config.divider.resolve(
                clk_sys_freq,
                LED_BIT_FREQUENCY_HZ,
                led_program.cycles_per_symbol(),
            )?;
            let claim = bus.claim_channel(SM)?;
            let loaded = bus.led_program(&led_program)?;

            bus.with_common(|common| {
                let out_pin = common.make_pio_pin(pin);
                let mut cfg = Config::default();
                cfg.use_program(loaded, &[&out_pin]);
                cfg.clock_divider = divider.to_fixed();
                cfg.fifo_join = FifoJoin::TxOnly;
                cfg.shift_out = ShiftConfig {
                    auto_fill: true,
                    threshold: BITS_PER_PIXEL as u8,
                    direction: ShiftDirection::Left,
                };
                sm.set_pin_dirs(Direction::Out, &[&out_pin]);
                sm.set_config(&cfg);
                sm.set_enable(true);
            });

            info!(
                "LedStrip: sm {} running {} LEDs, divider {}",
                SM,
                config.len,
                divider.as_f32()
            );
            Ok(Self::with_fifo(PioTxFifo::new(sm, claim), config.len))
        }
    }
}
