//! Bridges the codec's internal 32-bit sample representation to whatever
//! integer or float type a caller wants their decoded PCM in.
//!
//! Follows the shape of the `io::Sample` trait (`from_i32` dispatching on
//! bit depth, one `impl` per concrete numeric type), narrowed here to the
//! two word widths NEAC actually carries (16 and 24 bit) and built on
//! `num_traits::NumCast` instead of a hand-rolled `impl` per output type.

use num_traits::NumCast;

use crate::errors;
use crate::utils;
use crate::Result;

/// The PCM word width declared in a stream's header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleWidth {
    Sixteen,
    TwentyFour,
}

impl SampleWidth {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            16 => Ok(SampleWidth::Sixteen),
            24 => Ok(SampleWidth::TwentyFour),
            _ => errors::invalid_parameter_error("unsupported bits per sample, only 16 and 24 are supported"),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            SampleWidth::Sixteen => 16,
            SampleWidth::TwentyFour => 24,
        }
    }

    /// Confirms `sample` fits the declared word width, as handed to
    /// `Encoder::write_sample`, by way of the same narrowing helpers the
    /// WAV-side codecs used for their own bit-depth checks.
    pub fn validate(self, sample: i32) -> Result<i32> {
        match self {
            SampleWidth::Sixteen => utils::narrow_to_i16(sample).map(|v| v as i32),
            SampleWidth::TwentyFour => utils::narrow_to_i24(sample),
        }
    }
}

/// Narrows a decoded internal sample to any numeric type the caller wants
/// their PCM buffer in (`i16`, `i32`, `f32`, ...), the way `Sample::from_i32`
/// dispatched per type, generalized over `NumCast` instead of one `impl`
/// per concrete output type. Used by `Decoder::read_sample_as`.
pub fn cast_sample<T: NumCast>(sample: i32) -> Result<T> {
    match NumCast::from(sample) {
        Some(v) => Ok(v),
        None => errors::invalid_parameter_error("decoded sample does not fit the requested output type"),
    }
}
