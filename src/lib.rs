//! NEAC is a lossless PCM audio codec: mid/side stereo decorrelation, a
//! fixed polynomial predictor cascaded with an adaptive Sign-Sign LMS
//! filter, and partitioned Rice entropy coding over a self-describing
//! block stream.
//!
//! This crate is the compression core only: WAV parsing, CLI argument
//! handling, and playback are left to callers. [`Encoder`] and [`Decoder`]
//! are the entry points; both work against any `Read`/`Write` byte sink,
//! sample by sample, with bounded memory.

pub mod bitstream;
pub mod block;
pub mod container;
pub mod errors;
pub mod io;
pub mod lms;
pub mod predictor;
pub mod rice;
pub mod sample;
pub mod stereo;
pub mod tag;
mod utils;

pub use container::{Decoder, EncodeOptions, Encoder, PcmFormat};
pub use errors::Error;
pub use tag::{Tag, TagId};

/// The result type returned by all fallible NEAC operations.
pub type Result<T> = std::result::Result<T, Error>;
