#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_time::{Duration, with_timeout};
use pio_envoy::{
    Result,
    i2s_in::{I2sIn, I2sInConfig, SampleRate},
    pio_split,
    sample::{SampleBitWidth, StereoSample, encode_pcm_le, peak_amplitude},
};
use {
    defmt::{info, warn},
    defmt_rtt as _, panic_probe as _,
};

#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "the boot ROM finds the image definition by section")]
#[unsafe(link_section = ".start_block")]
#[used]
static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

const FRAMES: usize = 256;
const BIT_WIDTH: SampleBitWidth = SampleBitWidth::Bits16;

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());
    let (sm0, _sm1, _sm2, _sm3) = pio_split!(PIO1, p.PIO1);

    let sample_rate = SampleRate::try_from(48_000)?;
    let mut mic = I2sIn::new(
        sm0,
        p.PIN_10,
        p.PIN_11,
        p.PIN_12,
        I2sInConfig::new(sample_rate, BIT_WIDTH),
    )?;

    let mut frames = [StereoSample::default(); FRAMES];
    let mut pcm = [0_u8; FRAMES * 2 * 2];
    loop {
        // A missing or miswired microphone shows up as a stalled FIFO.
        let Ok(()) = with_timeout(Duration::from_millis(100), mic.wait_samples(&mut frames)).await
        else {
            warn!("no frames from microphone, FIFO level {}", mic.fifo_level());
            continue;
        };

        let peak = frames
            .iter()
            .map(|&frame| peak_amplitude(frame).0)
            .max()
            .unwrap_or(0);
        let written = encode_pcm_le(&frames, BIT_WIDTH, &mut pcm);
        let head = pcm.get(..8).unwrap_or(&[]);
        info!("{} PCM bytes, peak {}, first {=[u8]:x}", written, peak, head);
    }
}
