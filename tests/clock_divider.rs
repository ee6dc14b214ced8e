#![allow(missing_docs)]
use pio_envoy::Error;
use pio_envoy::clock_divider::{ClockDivider, DIVIDER_MAX, DividerSource, clock_divider, symbol_frequency};
use pio_envoy::i2s_in::{self, I2sInConfig, SampleRate};
use pio_envoy::led_strip::{LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT};
use pio_envoy::sample::SampleBitWidth;

#[test]
fn led_divider_at_125_mhz() {
    let divider = clock_divider(125_000_000, LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT);

    assert!((divider - 15.625).abs() < 1e-4);
}

#[test]
fn led_divider_at_150_mhz() {
    let divider = clock_divider(150_000_000, LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT);

    assert!((divider - 18.75).abs() < 1e-4);
}

#[test]
fn audio_divider_at_16_khz_32_bit() {
    let config = I2sInConfig::new(SampleRate::Hz16000, SampleBitWidth::Bits32);
    assert_eq!(config.bit_clock_hz(), 1_024_000);

    let divider = clock_divider(125_000_000, config.bit_clock_hz(), i2s_in::I2S_CYCLES_PER_BIT);

    assert!((divider - 61.035_156).abs() < 1e-3);
}

#[test]
fn symbol_frequency_inverts_divider() {
    let divider = clock_divider(125_000_000, LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT);

    let frequency = symbol_frequency(125_000_000, divider, LED_CYCLES_PER_BIT);

    assert!((frequency - 800_000.0).abs() < 1.0);
}

#[test]
fn led_bit_rate_within_tolerance_across_system_clocks() {
    for system_clock_hz in [125_000_000, 133_000_000, 150_000_000, 200_000_000] {
        let divider =
            ClockDivider::from_frequencies(system_clock_hz, LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT)
                .unwrap();
        let realized = symbol_frequency(system_clock_hz, divider.to_fixed().to_num(), LED_CYCLES_PER_BIT);

        assert!(
            (realized - 800_000.0).abs() < 150_000.0,
            "{system_clock_hz} Hz gives {realized} Hz"
        );
    }
}

#[test]
fn fixed_point_divider_truncates_to_eighth_bits() {
    let divider = ClockDivider::new(15.625).unwrap();

    assert_eq!(divider.to_fixed().to_bits(), (15 << 8) | 160);
}

#[test]
fn zero_frequency_is_rejected() {
    assert_eq!(
        ClockDivider::from_frequencies(125_000_000, 0, LED_CYCLES_PER_BIT),
        Err(Error::InvalidFrequency)
    );
    assert_eq!(
        ClockDivider::from_frequencies(0, LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT),
        Err(Error::InvalidFrequency)
    );
    assert_eq!(
        ClockDivider::from_frequencies(125_000_000, LED_BIT_FREQUENCY_HZ, 0),
        Err(Error::InvalidFrequency)
    );
}

#[test]
fn out_of_range_divider_is_rejected() {
    assert_eq!(ClockDivider::new(0.5), Err(Error::DividerOutOfRange));
    assert_eq!(ClockDivider::new(DIVIDER_MAX), Err(Error::DividerOutOfRange));
    assert_eq!(ClockDivider::new(f32::NAN), Err(Error::DividerOutOfRange));
    // 1 kHz symbols at 10 cycles each from 1 GHz needs a divider of 100_000.
    assert_eq!(
        ClockDivider::from_frequencies(1_000_000_000, 1_000, 10),
        Err(Error::DividerOutOfRange)
    );
}

#[test]
fn measured_source_calls_measure() {
    let divider = DividerSource::MeasuredSystemClock
        .resolve(|| 150_000_000, LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT)
        .unwrap();

    assert!((divider.as_f32() - 18.75).abs() < 1e-4);
}

#[test]
fn assumed_and_fixed_sources_ignore_measure() {
    let assumed = DividerSource::SystemClockHz(125_000_000)
        .resolve(|| panic!("measured"), LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT)
        .unwrap();
    let fixed = DividerSource::Fixed(20.0)
        .resolve(|| panic!("measured"), LED_BIT_FREQUENCY_HZ, LED_CYCLES_PER_BIT)
        .unwrap();

    assert!((assumed.as_f32() - 15.625).abs() < 1e-4);
    assert!((fixed.as_f32() - 20.0).abs() < f32::EPSILON);
}

#[test]
fn default_source_is_measured() {
    assert_eq!(DividerSource::default(), DividerSource::MeasuredSystemClock);
}
