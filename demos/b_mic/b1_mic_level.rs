#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use pio_envoy::{
    Result,
    i2s_in::{I2sIn, I2sInConfig, SampleRate},
    led_strip::{LedStrip, LedStripConfig, Rgb},
    pio_split,
    sample::{SampleBitWidth, StereoSample, rms_amplitude},
};
use {defmt::info, defmt_rtt as _, panic_probe as _};

#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "the boot ROM finds the image definition by section")]
#[unsafe(link_section = ".start_block")]
#[used]
static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

const LED_COUNT: usize = 8;
// 1/16 s of audio at 16 kHz
const BLOCK_LEN: usize = 1_000;

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());
    // The strip and the microphone share one PIO: two programs, two state machines.
    let (sm0, sm1, _sm2, _sm3) = pio_split!(PIO0, p.PIO0);

    let mut led_strip = LedStrip::new(sm0, p.PIN_0, LedStripConfig::new(LED_COUNT))?;
    let bit_width = SampleBitWidth::Bits24;
    // INMP441: SCK on GPIO 10, WS on GPIO 11, SD on GPIO 12.
    let mut mic = I2sIn::new(
        sm1,
        p.PIN_10,
        p.PIN_11,
        p.PIN_12,
        I2sInConfig::new(SampleRate::Hz16000, bit_width),
    )?;

    let mut block = [StereoSample::default(); BLOCK_LEN];
    loop {
        mic.wait_samples(&mut block).await;
        let (left_rms, _right_rms) = rms_amplitude(&block);
        let level = level_from_rms(left_rms, bit_width);
        info!("rms {} -> {} LEDs", left_rms, level);

        let frame: [Rgb; LED_COUNT] = core::array::from_fn(|index| {
            if index < level { meter_color(index) } else { Rgb::default() }
        });
        led_strip.write_frame(&frame).await;
    }
}

/// Map RMS onto 0..=LED_COUNT lit LEDs on a rough log scale (6 dB per LED).
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "meter display"
)]
fn level_from_rms(rms: f32, bit_width: SampleBitWidth) -> usize {
    let full_scale = bit_width.max_magnitude() as f32;
    if rms <= 0.0 {
        return 0;
    }
    let doublings_below_full_scale = libm::log2f(full_scale / rms);
    let lit = LED_COUNT as f32 - doublings_below_full_scale;
    lit.clamp(0.0, LED_COUNT as f32) as usize
}

fn meter_color(index: usize) -> Rgb {
    match index {
        0..=4 => Rgb::new(0, 32, 0),
        5..=6 => Rgb::new(32, 24, 0),
        _ => Rgb::new(40, 0, 0),
    }
}
