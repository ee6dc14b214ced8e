#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_time::Timer;
use pio_envoy::{
    Result,
    led_strip::{LedStrip, LedStripConfig, colors, pack_rgb},
    pio_split,
};
use {defmt::info, defmt_rtt as _, panic_probe as _};

#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "the boot ROM finds the image definition by section")]
#[unsafe(link_section = ".start_block")]
#[used]
static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

// Nice trick: Two "mains" let's us use Results.
#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());
    let (sm0, _sm1, _sm2, _sm3) = pio_split!(PIO0, p.PIO0);

    // 8 LEDs on GPIO 0
    let mut led_strip = LedStrip::new(sm0, p.PIN_0, LedStripConfig::new(8))?;

    // Cycle the whole strip through a few status colors, then chase one white LED.
    let palette = [colors::DARK_GREEN, colors::ORANGE, colors::DARK_RED, colors::MIDNIGHT_BLUE];
    let mut step: usize = 0;
    loop {
        let color = palette[step % palette.len()];
        info!("status step {}", step);
        for _ in 0..led_strip.len() {
            led_strip.write_color(pack_rgb(color.r, color.g, color.b)).await;
        }
        Timer::after_millis(500).await;

        let lit = step % led_strip.len();
        for index in 0..led_strip.len() {
            led_strip.set_pixel(if index == lit { colors::WHITE } else { colors::BLACK });
        }
        Timer::after_millis(100).await;
        step = step.wrapping_add(1);
    }
}
