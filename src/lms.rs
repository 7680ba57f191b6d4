//! Adaptive Sign-Sign LMS filter.
//!
//! Follows `original_source/libneac/lms.c`/`lms.h`: `lms_create(taps,
//! pcm_bits)` argument order, `SHIFT_FACTOR_PCM16 = 9` /
//! `SHIFT_FACTOR_PCM24 = 8`, and the pure Sign-Sign update
//! `w[i] += sign(residual) * sign(h[i])` for all PCM widths (the
//! `residual >> table[i]` variant seen in one source variant is not
//! implemented).

use crate::errors;
use crate::Result;

pub const MAX_TAPS: u8 = 32;

#[inline(always)]
fn sign(x: i32) -> i32 {
    (x > 0) as i32 - (x < 0) as i32
}

/// Adaptive Sign-Sign LMS filter, one instance per channel.
pub struct Lms {
    shift: u32,
    weights: Vec<i32>,
    history: Vec<i32>,
}

impl Lms {
    /// Creates a filter for `taps` coefficients operating on PCM of
    /// `pcm_bits` bits per sample (16 or 24). `taps` greater than
    /// [`MAX_TAPS`] is clamped, with a warning, rather than rejected.
    pub fn new(taps: u8, pcm_bits: u8) -> Self {
        let taps = if taps > MAX_TAPS {
            tracing::warn!(
                requested = taps,
                clamped = MAX_TAPS,
                "LMS filter taps exceed maximum, clamping"
            );
            MAX_TAPS
        } else {
            taps
        };
        let shift = match pcm_bits {
            16 => 9,
            24 => 8,
            other => {
                tracing::warn!(pcm_bits = other, "unrecognized PCM width, defaulting LMS shift to 9");
                9
            }
        };
        Lms {
            shift,
            weights: vec![0i32; taps as usize],
            history: vec![0i32; taps as usize],
        }
    }

    pub fn taps(&self) -> usize {
        self.weights.len()
    }

    /// Predicts the next residual from the current filter state.
    #[inline(always)]
    pub fn predict(&self) -> i32 {
        let mut sum: i64 = 0;
        for i in 0..self.weights.len() {
            sum += ((self.weights[i] as i64) * (self.history[i] as i64)) >> self.shift;
        }
        sum as i32
    }

    /// Updates the filter with the reconstructed `sample` (the
    /// post-polynomial residual the decoder will derive) and the
    /// post-LMS `residual`, exactly matching the trajectory the decoder
    /// replays: the LMS adapts over the residual stream, not raw PCM.
    #[inline(always)]
    pub fn update(&mut self, sample: i32, residual: i32) {
        if self.weights.is_empty() {
            return;
        }
        let sgn_r = sign(residual);
        for i in 0..self.weights.len() {
            self.weights[i] += sgn_r * sign(self.history[i]);
        }
        for i in (1..self.history.len()).rev() {
            self.history[i] = self.history[i - 1];
        }
        self.history[0] = sample;
    }

    pub fn reset(&mut self) {
        for w in self.weights.iter_mut() {
            *w = 0;
        }
        for h in self.history.iter_mut() {
            *h = 0;
        }
    }

    #[cfg(test)]
    pub(crate) fn weights_for_test(&self) -> &[i32] {
        &self.weights
    }

    #[cfg(test)]
    pub(crate) fn history_for_test(&self) -> &[i32] {
        &self.history
    }
}

/// Validates a taps value as supplied by a decoded stream header; unlike
/// the encode-side constructor, a corrupt decode-time taps value is a hard
/// error rather than something to silently clamp.
pub fn validate_decoded_taps(taps: u8) -> Result<u8> {
    if taps > MAX_TAPS {
        errors::invalid_parameter_error("filter taps in stream header exceed 32")
    } else {
        Ok(taps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_taps_is_a_no_op() {
        let mut f = Lms::new(0, 16);
        assert_eq!(f.predict(), 0);
        f.update(12345, 1);
        assert_eq!(f.predict(), 0);
    }

    #[test]
    fn clamps_excessive_taps() {
        let f = Lms::new(200, 16);
        assert_eq!(f.taps(), MAX_TAPS as usize);
    }

    #[test]
    fn shift_constants_match_pcm_width() {
        // Same weight/history state, different shift: 24-bit prediction
        // should be exactly double the 16-bit one (one fewer shift).
        let mut f16 = Lms::new(1, 16);
        let mut f24 = Lms::new(1, 24);
        f16.weights[0] = 1000;
        f16.history[0] = 1000;
        f24.weights[0] = 1000;
        f24.history[0] = 1000;
        assert_eq!(f24.predict(), f16.predict() * 2);
    }

    #[test]
    fn update_uses_sign_sign_rule() {
        let mut f = Lms::new(2, 16);
        f.update(10, 3); // sign(3) = 1; history all zero so sign(h)=0, weights unchanged
        assert_eq!(f.predict(), 0);
        f.update(-5, -7); // sign(-7) = -1; history[0] = 10 (sign +1) -> weights[0] -= 1
        // weights[0] is now -1, history is now [-5, 10]
        // predict = (weights[0]*history[0] + weights[1]*history[1]) >> 9
        let expected = ((-1i64 * -5) + (0i64 * 10)) >> 9;
        assert_eq!(f.predict() as i64, expected);
    }

    #[test]
    fn history_shifts_like_a_queue() {
        let mut f = Lms::new(3, 16);
        f.update(1, 1);
        f.update(2, 1);
        f.update(3, 1);
        // history should now read [3, 2, 1] (most recent first).
        assert_eq!(f.history, vec![3, 2, 1]);
    }
}
