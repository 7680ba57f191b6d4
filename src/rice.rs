//! Partitioned Rice entropy coder.
//!
//! The zig-zag mapping and the unary-quotient/binary-remainder split
//! follow `flac::decoder::rice_to_signed`/`decode_rice_partition` (decode
//! side already present in exactly this bit-level shape), generalized
//! from FLAC's 4-bit partition order and escape-parameter scheme to this
//! format's 2-bit `pp` field and single `BLANK_PARTITION` sentinel (`31`).
//! The encoder-side cost-based `k` selection and exhaustive `pp` search
//! have no FLAC-decoder counterpart and are new, written in the same
//! buffer-oriented, allocate-at-open style as the rest of this crate
//! (work buffers bounded to 16 partitions).

use crate::bitstream::{BitReader, BitWriter};
use crate::errors;
use crate::io::{ReadBuffer, WriteBuffer};
use crate::Result;

/// Sentinel rice parameter meaning "every residual in this partition is
/// zero"; written with no per-sample payload.
pub const BLANK_PARTITION: u32 = 31;

const MAX_RICE_PARAM: u32 = 30;
const MIN_PP: u8 = 1;
const MAX_PP: u8 = 4;

/// Maps a signed residual to a non-negative integer: `0,-1,1,-2,2,... ->
/// 0,1,2,3,4,...`.
#[inline(always)]
pub fn zigzag(v: i32) -> u32 {
    ((v as u32) << 1) ^ ((v >> 31) as u32)
}

/// Inverse of [`zigzag`].
#[inline(always)]
pub fn unzigzag(u: u32) -> i32 {
    ((u >> 1) as i32) ^ -((u & 1) as i32)
}

/// Per-partition rice parameter chosen by the encoder's search: either a
/// rice parameter in `[0, 30]` or the `BLANK_PARTITION` sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PartitionParam(u32);

impl PartitionParam {
    fn is_blank(self) -> bool {
        self.0 == BLANK_PARTITION
    }
}

/// The chosen partitioning for one sub-block: `pp` plus one parameter per
/// partition.
struct Plan {
    pp: u8,
    params: Vec<PartitionParam>,
}

/// Bit-width of `n`, i.e. the smallest `k` with `n < 2^k` (0 for `n == 0`).
#[inline(always)]
fn bit_width(n: u64) -> u32 {
    64 - n.leading_zeros()
}

fn choose_k(abs_sum: u64, partition_len: usize) -> u32 {
    let mean = (abs_sum + partition_len as u64 / 2) / partition_len as u64;
    bit_width(mean).min(MAX_RICE_PARAM)
}

/// Cost, in bits, of the quotient+remainder payload for rice parameter `k`
/// over zig-zag values `us` (`Σ (u_i >> k) + k·len`; the constant
/// one-bit-per-sample unary
/// terminator is omitted because it sums to the same total across every
/// candidate partitioning and does not affect the argmin).
fn payload_cost(us: &[u32], k: u32) -> u64 {
    let quotient_bits: u64 = us.iter().map(|&u| (u >> k) as u64).sum();
    quotient_bits + (k as u64) * (us.len() as u64)
}

fn plan_for_pp(zigzagged: &[u32], pp: u8) -> Option<(u64, Vec<PartitionParam>)> {
    let num_partitions = 1usize << pp;
    if zigzagged.len() % num_partitions != 0 {
        return None;
    }
    let partition_len = zigzagged.len() / num_partitions;
    if partition_len == 0 {
        return None;
    }
    let mut cost: u64 = 2; // pp field
    let mut params = Vec::with_capacity(num_partitions);
    for chunk in zigzagged.chunks(partition_len) {
        let abs_sum: u64 = chunk.iter().map(|&u| (u as u64 + 1) / 2).sum();
        if abs_sum == 0 {
            params.push(PartitionParam(BLANK_PARTITION));
            cost += 5;
        } else {
            let k = choose_k(abs_sum, partition_len);
            params.push(PartitionParam(k));
            cost += payload_cost(chunk, k) + 5;
        }
    }
    Some((cost, params))
}

/// Runs an exhaustive `pp in {1..4}` search and returns the cheapest
/// partitioning, tie-breaking toward the smaller `pp`.
fn search(residuals: &[i32]) -> Plan {
    let zigzagged: Vec<u32> = residuals.iter().map(|&r| zigzag(r)).collect();
    let mut best: Option<(u8, u64, Vec<PartitionParam>)> = None;
    for pp in MIN_PP..=MAX_PP {
        if let Some((cost, params)) = plan_for_pp(&zigzagged, pp) {
            let better = match &best {
                None => true,
                Some((_, best_cost, _)) => cost < *best_cost,
            };
            if better {
                best = Some((pp, cost, params));
            }
        }
    }
    match best {
        Some((pp, _, params)) => Plan { pp, params },
        // No pp in 1..=4 divides the sub-block evenly (shouldn't happen for
        // the block sizes this codec supports); fall back to a single
        // all-inclusive partition coded as pp = 1 with two halves sharing
        // one parameter each computed independently — degenerate but
        // still correct, since `plan_for_pp` only fails on non-dividing
        // lengths and pp=1 requires just an even length.
        None => {
            let k = if zigzagged.iter().all(|&u| u == 0) {
                BLANK_PARTITION
            } else {
                let abs_sum: u64 = zigzagged.iter().map(|&u| (u as u64 + 1) / 2).sum();
                choose_k(abs_sum, zigzagged.len().max(1))
            };
            Plan {
                pp: MIN_PP,
                params: vec![PartitionParam(k); 2],
            }
        }
    }
}

/// Encodes one sub-block's worth of residuals (always `block_size` long,
/// including any trailing pad) to the bit stream.
pub fn encode_subblock<W: WriteBuffer>(
    writer: &mut BitWriter<W>,
    residuals: &[i32],
) -> Result<()> {
    let plan = search(residuals);
    writer.write_uint((plan.pp - 1) as u32, 2)?;
    let num_partitions = plan.params.len();
    let partition_len = residuals.len() / num_partitions;
    for (i, param) in plan.params.iter().enumerate() {
        writer.write_uint(param.0, 5)?;
        if param.is_blank() {
            continue;
        }
        let k = param.0;
        let start = i * partition_len;
        for &r in &residuals[start..start + partition_len] {
            let u = zigzag(r);
            writer.write_unary(u >> k)?;
            if k > 0 {
                let remainder = u & ((1u32 << k) - 1);
                writer.write_uint(remainder, k)?;
            }
        }
    }
    Ok(())
}

/// Decodes one sub-block's worth of residuals (exactly `block_size` long)
/// from the bit stream.
pub fn decode_subblock<R: ReadBuffer>(
    reader: &mut BitReader<R>,
    block_size: usize,
    out: &mut [i32],
) -> Result<()> {
    debug_assert_eq!(out.len(), block_size);
    let pp = (reader.read_uint(2)? + 1) as u8;
    let num_partitions = 1usize << pp;
    if block_size % num_partitions != 0 {
        return errors::malformed_error("sub-block size not divisible by partition count");
    }
    let partition_len = block_size / num_partitions;
    let mut offset = 0;
    for _ in 0..num_partitions {
        let k = reader.read_uint(5)?;
        if k == BLANK_PARTITION {
            for s in &mut out[offset..offset + partition_len] {
                *s = 0;
            }
        } else if k <= MAX_RICE_PARAM {
            for s in &mut out[offset..offset + partition_len] {
                let q = reader.read_unary()?;
                let r = if k == 0 { 0 } else { reader.read_uint(k)? };
                let u = (q << k) | r;
                *s = unzigzag(u);
            }
        } else {
            return errors::invalid_parameter_error("rice parameter out of range in stream");
        }
        offset += partition_len;
    }
    Ok(())
}
