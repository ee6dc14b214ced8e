#![allow(missing_docs)]
use pio_envoy::Error;
use pio_envoy::sample::{
    SampleBitWidth, StereoSample, encode_pcm_le, peak_amplitude, raw_to_sample, rms_amplitude,
    sample_to_float, sample_to_mono, sample_to_raw,
};

#[test]
fn raw_24_bit_extremes() {
    assert_eq!(raw_to_sample(0x7FFF_FF00, SampleBitWidth::Bits24), 8_388_607);
    assert_eq!(raw_to_sample(0x8000_0000, SampleBitWidth::Bits24), -8_388_608);
}

#[test]
fn raw_16_bit_sign_extends() {
    assert_eq!(raw_to_sample(0xFFFF_0000, SampleBitWidth::Bits16), -1);
    assert_eq!(raw_to_sample(0x8000_0000, SampleBitWidth::Bits16), -32_768);
}

#[test]
fn raw_ignores_bits_below_width() {
    assert_eq!(raw_to_sample(0x0001_FFFF, SampleBitWidth::Bits16), 1);
}

#[test]
fn sample_to_raw_left_aligns() {
    assert_eq!(sample_to_raw(-1, SampleBitWidth::Bits16), 0xFFFF_0000);
    assert_eq!(sample_to_raw(8_388_607, SampleBitWidth::Bits24), 0x7FFF_FF00);
    assert_eq!(
        raw_to_sample(sample_to_raw(-123_456, SampleBitWidth::Bits24), SampleBitWidth::Bits24),
        -123_456
    );
}

#[test]
fn raw_round_trips_at_every_width_and_boundary() {
    for bit_width in [SampleBitWidth::Bits16, SampleBitWidth::Bits24, SampleBitWidth::Bits32] {
        let min = bit_width.min_value();
        let max = bit_width.max_magnitude();
        for sample in [min, min.saturating_add(1), -1, 0, 1, max] {
            assert_eq!(
                raw_to_sample(sample_to_raw(sample, bit_width), bit_width),
                sample,
                "{sample} at {} bits",
                bit_width.bits()
            );
        }
    }
}

#[test]
fn mono_is_truncating_average() {
    assert_eq!(sample_to_mono(StereoSample::new(100, 200)), 150);
    assert_eq!(sample_to_mono(StereoSample::new(1, 2)), 1);
    assert_eq!(sample_to_mono(StereoSample::new(-1, -2)), -1);
}

#[test]
fn mono_does_not_overflow() {
    assert_eq!(sample_to_mono(StereoSample::new(i32::MAX, i32::MAX)), i32::MAX);
    assert_eq!(sample_to_mono(StereoSample::new(i32::MIN, i32::MIN)), i32::MIN);
}

#[test]
fn float_normalizes_to_unit_range() {
    assert!((sample_to_float(8_388_607, SampleBitWidth::Bits24) - 1.0).abs() < 1e-6);
    assert!((sample_to_float(0, SampleBitWidth::Bits16)).abs() < f32::EPSILON);
    assert!((sample_to_float(-16_384, SampleBitWidth::Bits16) + 0.5).abs() < 1e-4);
}

#[test]
fn float_16_bit_max_is_one() {
    assert!((sample_to_float(32_767, SampleBitWidth::Bits16) - 1.0).abs() < 1e-6);
}

#[test]
fn float_most_negative_is_slightly_below_minus_one() {
    let value = sample_to_float(-32_768, SampleBitWidth::Bits16);

    assert!(value < -1.0);
    assert!(value > -1.001);
}

#[test]
fn peak_is_per_channel_absolute_value() {
    assert_eq!(peak_amplitude(StereoSample::new(-500, 300)), (500, 300));
    assert_eq!(
        peak_amplitude(StereoSample::new(i32::MIN, 0)),
        (2_147_483_648, 0)
    );
}

#[test]
fn rms_of_constant_is_magnitude() {
    let samples = [StereoSample::new(3, -4); 3];

    let (left, right) = rms_amplitude(&samples);

    assert!((left - 3.0).abs() < 1e-6);
    assert!((right - 4.0).abs() < 1e-6);
}

#[test]
fn rms_of_square_wave() {
    let samples = [
        StereoSample::new(1_000, 0),
        StereoSample::new(-1_000, 0),
        StereoSample::new(1_000, 0),
        StereoSample::new(-1_000, 0),
    ];

    let (left, right) = rms_amplitude(&samples);

    assert!((left - 1_000.0).abs() < 1e-3);
    assert!(right.abs() < f32::EPSILON);
}

#[test]
fn rms_of_square_wave_on_both_channels() {
    let samples = [
        StereoSample::new(500, -500),
        StereoSample::new(-500, 500),
        StereoSample::new(500, -500),
        StereoSample::new(-500, 500),
    ];

    let (left, right) = rms_amplitude(&samples);

    assert!((left - 500.0).abs() < 1e-3);
    assert!((right - 500.0).abs() < 1e-3);
}

#[test]
fn rms_of_empty_buffer_is_zero() {
    assert_eq!(rms_amplitude(&[]), (0.0, 0.0));
}

#[test]
fn pcm_16_bit_is_interleaved_little_endian() {
    let samples = [StereoSample::new(0x1234, -2)];
    let mut out = [0_u8; 8];

    let written = encode_pcm_le(&samples, SampleBitWidth::Bits16, &mut out);

    assert_eq!(written, 4);
    assert_eq!(out[..4], [0x34, 0x12, 0xFE, 0xFF]);
}

#[test]
fn pcm_24_bit_uses_three_bytes() {
    let samples = [StereoSample::new(-1, 0x01_02_03)];
    let mut out = [0_u8; 6];

    let written = encode_pcm_le(&samples, SampleBitWidth::Bits24, &mut out);

    assert_eq!(written, 6);
    assert_eq!(out, [0xFF, 0xFF, 0xFF, 0x03, 0x02, 0x01]);
}

#[test]
fn pcm_writes_whole_frames_only() {
    let samples = [StereoSample::new(1, 2), StereoSample::new(3, 4)];
    let mut out = [0xAA_u8; 11];

    let written = encode_pcm_le(&samples, SampleBitWidth::Bits32, &mut out);

    assert_eq!(written, 8);
    assert_eq!(out[8..], [0xAA; 3]);
}

#[test]
fn bit_width_properties() {
    assert_eq!(SampleBitWidth::Bits16.max_magnitude(), 32_767);
    assert_eq!(SampleBitWidth::Bits24.min_value(), -8_388_608);
    assert_eq!(SampleBitWidth::Bits32.bytes(), 4);
    assert_eq!(SampleBitWidth::try_from(24), Ok(SampleBitWidth::Bits24));
    assert_eq!(SampleBitWidth::try_from(20), Err(Error::UnsupportedBitWidth(20)));
}
