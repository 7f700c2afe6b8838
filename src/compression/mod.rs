
//! Stream the image data through the zlib engine of `miniz_oxide`,
//! one chunk-sized fragment at a time.
//!
//! Both directions work the same way: `push` a fragment of input,
//! then `pull` output into a growable buffer until the input is consumed.
//! A full output buffer only interrupts the engine, it is not an error.


// private modules make non-breaking changes easier
mod inflate;
mod deflate;

pub use self::inflate::Inflator;
pub use self::deflate::Deflator;

use miniz_oxide::MZError;
use crate::bits::Bitstream;
use crate::error::{CompressionError, Error, Result};


/// How hard the deflate engine tries to find repetitions.
/// Ranges from `0`, which stores the data uncompressed, to `10`, which is the slowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {

    /// Store the data without compression.
    pub const NONE: Level = Level(0);

    /// Compress quickly.
    pub const FAST: Level = Level(1);

    /// The level used by most png encoders.
    pub const DEFAULT: Level = Level(6);

    /// The highest level of the zlib reference implementation.
    pub const BEST: Level = Level(9);

    /// Slower than zlib allows, with slightly smaller output.
    pub const ULTRA: Level = Level(10);

    /// Returns `None` for levels above 10.
    pub fn new(level: u8) -> Option<Self> {
        if level <= Level::ULTRA.0 { Some(Level(level)) } else { None }
    }

    /// The numeric level.
    pub fn value(self) -> u8 { self.0 }
}

impl Default for Level {
    fn default() -> Self { Level::DEFAULT }
}


/// The kind of the first deflate block in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {

    /// Uncompressed bytes.
    Stored,

    /// Compressed with the huffman codes defined by deflate.
    FixedCodes,

    /// Compressed with huffman codes stored in the block.
    DynamicCodes,
}

/// What the first bytes of a zlib stream declare.
/// Decoding does not depend on these values,
/// they merely describe how the file was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {

    /// The largest distance of a repetition, in bytes.
    pub window_size: usize,

    /// A hint about the compression level, from `0` (fastest) to `3` (smallest).
    pub level_hint: u8,

    /// Whether the data consists of a single deflate block.
    pub single_block: bool,

    /// How the first deflate block is encoded.
    pub first_block: BlockKind,
}

/// The zlib header and the header of the first deflate block.
pub(crate) const STREAM_HEADER_BYTES: usize = 3;

impl StreamHeader {

    /// Decode the zlib header and the beginning of the first deflate block.
    /// Requires at least three bytes.
    pub fn inspect(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < STREAM_HEADER_BYTES {
            return Err(CompressionError::InvalidData.into());
        }

        let stream = Bitstream::new(&bytes[.. STREAM_HEADER_BYTES]);

        let method: u8 = stream.read(0, 4);
        let window_log: u8 = stream.read(4, 4);
        let has_dictionary = stream.read::<u8>(13, 1) == 1;
        let level_hint: u8 = stream.read(14, 2);

        let flags_check: u16 = stream.read::<u16>(0, 8) * 256 + stream.read::<u16>(8, 8);

        // the two header bytes, read as big-endian number, must be divisible by 31
        if method != 8 || window_log > 7 || flags_check % 31 != 0 {
            return Err(CompressionError::InvalidData.into());
        }

        if has_dictionary {
            return Err(CompressionError::MissingDictionary.into());
        }

        let single_block = stream.read::<u8>(16, 1) == 1;
        let first_block = match stream.read::<u8>(17, 2) {
            0 => BlockKind::Stored,
            1 => BlockKind::FixedCodes,
            2 => BlockKind::DynamicCodes,
            _ => return Err(CompressionError::InvalidData.into()),
        };

        Ok(StreamHeader {
            window_size: 1 << (window_log + 8),
            level_hint, single_block, first_block,
        })
    }
}


/// Interpret an engine error that is neither a soft stop nor a bug.
fn engine_error(error: MZError) -> Option<Error> {
    match error {
        MZError::Data => Some(CompressionError::InvalidData.into()),
        MZError::Mem => Some(CompressionError::OutOfMemory.into()),
        _ => None,
    }
}
