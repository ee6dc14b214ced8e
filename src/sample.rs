//! Stereo samples and the pure post-processing applied to them after capture.
//!
//! Nothing here touches hardware. [`I2sIn`](crate::i2s_in::I2sIn) produces
//! [`StereoSample`]s; these functions meter, normalize, and pack them.

use crate::{Error, Result};

/// Declared width of one audio sample. Must equal the receive program's autopush threshold.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum SampleBitWidth {
    /// 16-bit samples.
    Bits16,
    /// 24-bit samples.
    Bits24,
    /// 32-bit samples.
    Bits32,
}

impl SampleBitWidth {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits16 => 16,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }

    /// Bytes per sample in packed PCM.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits24 => 3,
            Self::Bits32 => 4,
        }
    }

    /// Largest positive value, `2^(bits-1) - 1`.
    #[must_use]
    pub const fn max_magnitude(self) -> i32 {
        i32::MAX.wrapping_shr(self.align_shift())
    }

    /// Smallest value, `-2^(bits-1)`.
    #[must_use]
    pub const fn min_value(self) -> i32 {
        i32::MIN.wrapping_shr(self.align_shift())
    }

    /// Unused low bits of a left-aligned 32-bit word, `32 - bits`.
    const fn align_shift(self) -> u32 {
        u32::BITS.saturating_sub(self.bits())
    }
}

impl TryFrom<u8> for SampleBitWidth {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            16 => Ok(Self::Bits16),
            24 => Ok(Self::Bits24),
            32 => Ok(Self::Bits32),
            _ => Err(Error::UnsupportedBitWidth(bits)),
        }
    }
}

/// One left/right sample pair, each sign-extended to `i32`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub struct StereoSample {
    /// Left channel (word select low).
    pub left: i32,
    /// Right channel (word select high).
    pub right: i32,
}

impl StereoSample {
    /// A sample pair.
    #[must_use]
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Decode a pair of left-aligned raw words.
    #[must_use]
    pub const fn from_raw(left_raw: u32, right_raw: u32, bit_width: SampleBitWidth) -> Self {
        Self {
            left: raw_to_sample(left_raw, bit_width),
            right: raw_to_sample(right_raw, bit_width),
        }
    }
}

/// Convert a left-aligned raw word to a signed sample.
///
/// The sample occupies the top `bit_width` bits. An arithmetic right shift by
/// `32 - bit_width` moves it down and sign-extends from bit `bit_width - 1` in one step.
#[must_use]
#[allow(clippy::cast_possible_wrap, reason = "reinterpreting the raw bits as signed")]
pub const fn raw_to_sample(raw: u32, bit_width: SampleBitWidth) -> i32 {
    (raw as i32).wrapping_shr(bit_width.align_shift())
}

/// Inverse of [`raw_to_sample`]: left-align `sample` in a 32-bit word.
///
/// Bits of `sample` above `bit_width` are discarded.
#[must_use]
#[allow(clippy::cast_sign_loss, reason = "reinterpreting the signed bits as raw")]
pub const fn sample_to_raw(sample: i32, bit_width: SampleBitWidth) -> u32 {
    sample.wrapping_shl(bit_width.align_shift()) as u32
}

/// Truncating average of both channels.
///
/// Unlike [`I2sIn::read_mono`](crate::i2s_in::I2sIn::read_mono), which returns only the
/// left channel, this mixes left and right.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "the mean of two i32 values fits in i32")]
pub fn sample_to_mono(sample: StereoSample) -> i32 {
    (i64::from(sample.left).saturating_add(i64::from(sample.right)) / 2) as i32
}

/// Normalize `value` by the largest positive value of `bit_width`.
///
/// The most negative value maps slightly below -1.0; it is not clamped.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "result is within f32 range")]
pub fn sample_to_float(value: i32, bit_width: SampleBitWidth) -> f32 {
    (f64::from(value) / f64::from(bit_width.max_magnitude())) as f32
}

/// Per-channel absolute value, `(left, right)`.
#[must_use]
pub const fn peak_amplitude(sample: StereoSample) -> (u32, u32) {
    (sample.left.unsigned_abs(), sample.right.unsigned_abs())
}

/// Per-channel root-mean-square, `(left, right)`. An empty buffer gives `(0.0, 0.0)`.
///
/// Used for level meters and voice-activity thresholds.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "metering does not need exact counts or f64 precision"
)]
pub fn rms_amplitude(samples: &[StereoSample]) -> (f32, f32) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let (left_sum, right_sum) =
        samples
            .iter()
            .fold((0.0_f64, 0.0_f64), |(left_sum, right_sum), sample| {
                let left = f64::from(sample.left);
                let right = f64::from(sample.right);
                (left_sum + left * left, right_sum + right * right)
            });
    let count = samples.len() as f64;
    (
        libm::sqrt(left_sum / count) as f32,
        libm::sqrt(right_sum / count) as f32,
    )
}

/// Pack samples as interleaved little-endian PCM, `bit_width.bytes()` per channel.
///
/// Only whole frames are written. Returns the number of bytes written.
#[must_use]
pub fn encode_pcm_le(samples: &[StereoSample], bit_width: SampleBitWidth, out: &mut [u8]) -> usize {
    let sample_bytes = bit_width.bytes();
    let frame_bytes = sample_bytes.saturating_mul(2);
    let mut written = 0_usize;
    for (chunk, sample) in out.chunks_exact_mut(frame_bytes).zip(samples) {
        let (left_bytes, right_bytes) = chunk.split_at_mut(sample_bytes);
        let left = sample.left.to_le_bytes();
        let right = sample.right.to_le_bytes();
        left_bytes.copy_from_slice(left.get(..sample_bytes).unwrap_or(&left));
        right_bytes.copy_from_slice(right.get(..sample_bytes).unwrap_or(&right));
        written = written.saturating_add(frame_bytes);
    }
    written
}
