//! Stream container: header framing plus the streaming encode/decode
//! façade.
//!
//! Shaped after `flac::decoder`'s pattern of reading header fields with
//! `ReadBuffer` and then handing the rest of the stream to a
//! block-oriented decoder — this format additionally switches from
//! byte-level to bit-level I/O partway through the stream, which a
//! single-format-version FLAC reader never has to do.

use std::io::{Read, Write};

use num_traits::NumCast;

use crate::bitstream::{BitReader, BitWriter};
use crate::block::BlockCodec;
use crate::errors;
use crate::io::{ReadBuffer, WriteBuffer};
use crate::lms;
use crate::sample::{self, SampleWidth};
use crate::tag::Tag;
use crate::Result;

const MAGIC: &[u8; 4] = b"NEAC";
const FORMAT_VERSION: u8 = 1;

/// PCM format descriptors carried in the stream header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u8,
    pub channels: u8,
    /// Total number of interleaved samples the stream will carry (i.e.
    /// frame count times `channels`).
    pub total_samples: u32,
}

/// Encode-time codec parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub block_size: u16,
    pub filter_taps: u8,
    pub use_mid_side: bool,
}

fn ceil_div(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

fn compute_num_blocks(format: &PcmFormat, block_size: u16) -> u32 {
    let frames = format.total_samples / format.channels.max(1) as u32;
    ceil_div(frames, block_size as u32)
}

/// Streaming encoder: accepts one interleaved sample at a time and writes
/// a complete NEAC stream to `sink`.
pub struct Encoder<W> {
    writer: BitWriter<W>,
    format: PcmFormat,
    sample_width: SampleWidth,
    block_codec: BlockCodec,
    block_size: usize,
    num_channels: usize,
    current_block: Vec<Vec<i32>>,
    cursor_channel: usize,
    cursor_offset: usize,
}

impl<W: Write> Encoder<W> {
    pub fn create(mut sink: W, format: PcmFormat, options: EncodeOptions, tag: Option<Tag>) -> Result<Self> {
        let sample_width = SampleWidth::from_bits(format.bits_per_sample)?;
        if format.channels == 0 || format.channels > 2 {
            return errors::invalid_parameter_error("channels must be 1 or 2");
        }
        if options.block_size == 0 {
            return errors::invalid_parameter_error("block size must be nonzero");
        }

        sink.write_all(MAGIC)?;
        sink.write_u8(FORMAT_VERSION)?;
        sink.write_le_u32(format.sample_rate)?;
        sink.write_u8(format.bits_per_sample)?;
        sink.write_u8(format.channels)?;
        sink.write_le_u32(format.total_samples)?;
        sink.write_u8(options.filter_taps)?;
        sink.write_le_u16(options.block_size)?;
        sink.write_u8(options.use_mid_side as u8)?;
        let num_blocks = compute_num_blocks(&format, options.block_size);
        sink.write_le_u32(num_blocks)?;
        Tag::write(tag.as_ref(), &mut sink)?;

        let num_channels = format.channels as usize;
        let block_size = options.block_size as usize;
        let use_mid_side = options.use_mid_side && num_channels == 2;
        let block_codec = BlockCodec::new(
            num_channels,
            block_size,
            options.filter_taps,
            format.bits_per_sample,
            use_mid_side,
        );

        Ok(Encoder {
            writer: BitWriter::new(sink),
            format,
            sample_width,
            block_codec,
            block_size,
            num_channels,
            current_block: vec![vec![0i32; block_size]; num_channels],
            cursor_channel: 0,
            cursor_offset: 0,
        })
    }

    pub fn format(&self) -> &PcmFormat {
        &self.format
    }

    /// Accepts one interleaved sample, filling channel `c` at the current
    /// sub-block offset before advancing `c` then the offset. Flushes and
    /// encodes a block once it is full.
    pub fn write_sample(&mut self, sample: i32) -> Result<()> {
        let sample = self.sample_width.validate(sample)?;
        self.current_block[self.cursor_channel][self.cursor_offset] = sample;
        self.cursor_channel += 1;
        if self.cursor_channel == self.num_channels {
            self.cursor_channel = 0;
            self.cursor_offset += 1;
            if self.cursor_offset == self.block_size {
                self.flush_block()?;
            }
        }
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        self.block_codec.encode_block(&mut self.writer, &mut self.current_block)?;
        for channel in self.current_block.iter_mut() {
            for sample in channel.iter_mut() {
                *sample = 0;
            }
        }
        self.cursor_offset = 0;
        Ok(())
    }

    /// Encodes any partially filled final block (the decoder truncates
    /// extraneous pad via `total_samples`) and flushes the bit buffer.
    pub fn end_write(mut self) -> Result<()> {
        if self.cursor_offset != 0 || self.cursor_channel != 0 {
            self.flush_block()?;
        }
        self.writer.close()?;
        Ok(())
    }
}

/// Streaming decoder: lazily decodes one block at a time and delivers
/// samples in interleaved order.
pub struct Decoder<R> {
    reader: BitReader<R>,
    format: PcmFormat,
    tag: Option<Tag>,
    block_codec: BlockCodec,
    block_size: usize,
    num_channels: usize,
    current_block: Option<Vec<Vec<i32>>>,
    cursor_channel: usize,
    cursor_offset: usize,
    samples_delivered: u32,
}

impl<R: Read> Decoder<R> {
    pub fn open(mut source: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        source.read_into(&mut magic)?;
        if &magic != MAGIC {
            return errors::malformed_error("missing NEAC magic bytes");
        }
        let version = source.read_u8()?;
        if version != FORMAT_VERSION {
            return errors::malformed_error("unsupported format version");
        }
        let sample_rate = source.read_le_u32()?;
        let bits_per_sample = source.read_u8()?;
        let channels = source.read_u8()?;
        if channels == 0 || channels > 2 {
            return errors::invalid_parameter_error("channels must be 1 or 2");
        }
        let total_samples = source.read_le_u32()?;
        let filter_taps = lms::validate_decoded_taps(source.read_u8()?)?;
        let block_size = source.read_le_u16()?;
        if block_size == 0 {
            return errors::malformed_error("block size must be nonzero");
        }
        let use_mid_side = source.read_u8()? != 0;
        let num_blocks = source.read_le_u32()?;

        let format = PcmFormat {
            sample_rate,
            bits_per_sample,
            channels,
            total_samples,
        };
        let expected_num_blocks = compute_num_blocks(&format, block_size);
        if num_blocks != expected_num_blocks {
            return errors::malformed_error("num_blocks header field inconsistent with total samples");
        }

        let tag = Tag::read(&mut source)?;

        let num_channels = channels as usize;
        let use_mid_side = use_mid_side && num_channels == 2;
        let block_codec = BlockCodec::new(num_channels, block_size as usize, filter_taps, bits_per_sample, use_mid_side);

        Ok(Decoder {
            reader: BitReader::new(source),
            format,
            tag,
            block_codec,
            block_size: block_size as usize,
            num_channels,
            current_block: None,
            cursor_channel: 0,
            cursor_offset: 0,
            samples_delivered: 0,
        })
    }

    pub fn format(&self) -> &PcmFormat {
        &self.format
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    /// Returns the next interleaved sample. Reads beyond `total_samples`
    /// return `0` without advancing any internal state.
    pub fn read_sample(&mut self) -> Result<i32> {
        if self.samples_delivered >= self.format.total_samples {
            return Ok(0);
        }
        if self.current_block.is_none() || self.cursor_offset >= self.block_size {
            let block = self.block_codec.decode_block(&mut self.reader)?;
            self.current_block = Some(block);
            self.cursor_offset = 0;
            self.cursor_channel = 0;
        }
        let sample = self.current_block.as_ref().unwrap()[self.cursor_channel][self.cursor_offset];
        self.cursor_channel += 1;
        if self.cursor_channel == self.num_channels {
            self.cursor_channel = 0;
            self.cursor_offset += 1;
        }
        self.samples_delivered += 1;
        Ok(sample)
    }

    /// Returns the next interleaved sample narrowed or widened into `T`
    /// (`i16`, `i32`, `f32`, ...), for callers that want their decoded
    /// buffer in a type other than the codec's internal `i32`.
    pub fn read_sample_as<T: NumCast>(&mut self) -> Result<T> {
        let sample = self.read_sample()?;
        sample::cast_sample(sample)
    }

    pub fn close(self) -> Result<()> {
        Ok(())
    }
}
