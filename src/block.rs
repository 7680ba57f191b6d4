//! Drives the polynomial predictor, LMS filter, mid/side transform, and
//! Rice coder together over one block.
//!
//! Shaped after `flac::frame::Block` (a flat per-channel sample
//! container, one struct per decoded frame), generalized here to also own
//! the predictor/filter state that must persist *across* blocks — unlike
//! a FLAC subframe, which is stateless from one frame to the next.

use crate::bitstream::{BitReader, BitWriter};
use crate::io::{ReadBuffer, WriteBuffer};
use crate::lms::Lms;
use crate::predictor::PolynomialPredictor;
use crate::rice;
use crate::stereo;
use crate::Result;

struct ChannelState {
    poly: PolynomialPredictor,
    lms: Lms,
}

/// Owns one independent predictor/filter pair per channel and drives them,
/// plus the mid/side transform and the Rice coder, across one block at a
/// time. Channels never share or cross-reference state.
pub struct BlockCodec {
    channels: Vec<ChannelState>,
    block_size: usize,
    num_channels: usize,
    use_mid_side: bool,
}

impl BlockCodec {
    pub fn new(num_channels: usize, block_size: usize, taps: u8, pcm_bits: u8, use_mid_side: bool) -> Self {
        let channels = (0..num_channels)
            .map(|_| ChannelState {
                poly: PolynomialPredictor::new(),
                lms: Lms::new(taps, pcm_bits),
            })
            .collect();
        BlockCodec {
            channels,
            block_size,
            num_channels,
            use_mid_side,
        }
    }

    /// Encodes one block (`num_channels` sub-blocks, each `block_size`
    /// samples, trailing pad included) to the bit stream. `block` is
    /// transformed to M/S in place when mid/side is enabled.
    pub fn encode_block<W: WriteBuffer>(
        &mut self,
        writer: &mut BitWriter<W>,
        block: &mut [Vec<i32>],
    ) -> Result<()> {
        debug_assert_eq!(block.len(), self.num_channels);

        if self.use_mid_side && self.num_channels == 2 {
            for i in 0..self.block_size {
                let (m, s) = stereo::encode(block[0][i], block[1][i]);
                block[0][i] = m;
                block[1][i] = s;
            }
        }

        let mut residuals = vec![0i32; self.block_size];
        for c in 0..self.num_channels {
            let ch = &mut self.channels[c];
            for i in 0..self.block_size {
                let x = block[c][i];

                let poly_pred = ch.poly.predict();
                let r1 = x.wrapping_sub(poly_pred);
                ch.poly.update(x);

                let lms_pred = ch.lms.predict();
                let r2 = r1.wrapping_sub(lms_pred);
                ch.lms.update(r1, r2);

                residuals[i] = r2;
            }
            rice::encode_subblock(writer, &residuals)?;
        }
        Ok(())
    }

    /// Decodes one block from the bit stream, reversing `encode_block`
    /// exactly: the LMS filter is updated with the same `(r1, r2)` pair
    /// the encoder used, so the predictor trajectories stay bit-for-bit
    /// identical.
    pub fn decode_block<R: ReadBuffer>(&mut self, reader: &mut BitReader<R>) -> Result<Vec<Vec<i32>>> {
        let mut block = vec![vec![0i32; self.block_size]; self.num_channels];
        let mut residuals = vec![0i32; self.block_size];

        for c in 0..self.num_channels {
            rice::decode_subblock(reader, self.block_size, &mut residuals)?;
            let ch = &mut self.channels[c];
            for i in 0..self.block_size {
                let r2 = residuals[i];

                let lms_pred = ch.lms.predict();
                let r1 = r2.wrapping_add(lms_pred);
                ch.lms.update(r1, r2);

                let poly_pred = ch.poly.predict();
                let x = r1.wrapping_add(poly_pred);
                ch.poly.update(x);

                block[c][i] = x;
            }
        }

        if self.use_mid_side && self.num_channels == 2 {
            for i in 0..self.block_size {
                let (l, r) = stereo::decode(block[0][i], block[1][i]);
                block[0][i] = l;
                block[1][i] = r;
            }
        }

        Ok(block)
    }

    pub fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.poly.reset();
            ch.lms.reset();
        }
    }
}
