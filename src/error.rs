
//! Error type definitions.

use std::convert::TryFrom;
use std::error;
use std::fmt;

use crate::chunk::ChunkType;
use crate::math::Vec2;
use crate::meta::format::Format;


/// A result that may contain a png error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a png error.
pub type UnitResult = Result<()>;


/// An error that may happen while reading or writing a png file.
/// Every variant is fatal to the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {

    /// The byte source did not contain a well-formed chunk stream.
    Lexing(LexingError),

    /// The byte destination rejected some bytes.
    Formatting(FormattingError),

    /// A chunk payload did not describe a valid value.
    Parsing(ParsingError),

    /// The compressed image data could not be processed.
    Compression(CompressionError),

    /// The chunks of the file did not appear in a valid order,
    /// or the image data stream did not line up with the data chunks.
    Decoding(DecodingError),
}

/// Failures while splitting a byte source into chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexingError {

    /// The source ended before the eight signature bytes.
    TruncatedSignature,

    /// The first eight bytes were not the png signature.
    InvalidSignature([u8; 8]),

    /// The source ended inside the length and type of a chunk.
    TruncatedChunkHeader,

    /// The chunk type code is neither known nor an admissible ancillary code.
    InvalidChunkTypeCode(u32),

    /// The source ended inside the payload or checksum of a chunk.
    /// Contains the number of bytes that were required after the chunk header.
    TruncatedChunkBody {
        /// Payload length plus four checksum bytes.
        expected: usize
    },

    /// The stored checksum does not match the chunk contents.
    InvalidChunkChecksum {
        /// The checksum stored in the file.
        declared: u32,

        /// The checksum of the type code and payload that were read.
        computed: u32,
    },
}

/// Failures while emitting chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingError {

    /// The destination refused to accept bytes.
    InvalidDestination,

    /// The payload cannot be described by a chunk length field.
    ChunkTooLarge(usize),

    /// A critical chunk was among the ancillary chunks of an image.
    /// The encoder produces all critical chunks itself.
    CriticalAncillaryChunk(ChunkType),
}

/// Failures while interpreting the payload of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {

    /// The payload length is not the one required by the chunk type.
    MismatchedChunkSize {
        /// The chunk whose payload was parsed.
        chunk: ChunkType,

        /// The number of bytes the payload must have.
        expected: usize,

        /// The number of bytes the payload had.
        found: usize,
    },

    /// The bit depth and color type pair of the header is not allowed.
    InvalidHeaderColorCode {
        /// Bits per sample.
        depth: u8,

        /// The color type code.
        color_type: u8,
    },

    /// The compression method of the header is not zero.
    InvalidHeaderCompressionCode(u8),

    /// The filter method of the header is not zero.
    InvalidHeaderFilterCode(u8),

    /// The interlace method of the header is neither zero nor one.
    InvalidHeaderInterlacingCode(u8),

    /// One of the image dimensions is zero.
    InvalidHeaderSize(Vec2<u32>),

    /// A palette was found for a format without color.
    UnexpectedPalette(Format),

    /// The palette byte count is not a multiple of three.
    InvalidPaletteSampleCount(usize),

    /// The palette has no entries or more entries than the bit depth can address.
    InvalidPaletteEntryCount {
        /// Number of entries in the palette.
        count: usize,

        /// Largest number of entries allowed by the format.
        max: usize,
    },

    /// An indexed format was used without a palette.
    MissingPalette(Format),
}

/// Failures of the zlib engine. A full output buffer is not among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionError {

    /// The stream requires a preset dictionary, which png does not provide.
    MissingDictionary,

    /// The compressed bytes are malformed.
    InvalidData,

    /// The engine could not allocate its working memory.
    OutOfMemory,
}

/// Failures of chunk ordering and image data framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodingError {

    /// A required chunk did not appear before another chunk.
    MissingChunk {
        /// The chunk that was required.
        chunk: ChunkType,

        /// The chunk that appeared before the required chunk.
        before: ChunkType,
    },

    /// A chunk that may appear only once appeared twice.
    DuplicateChunk(ChunkType),

    /// A chunk appeared after a chunk it must precede.
    UnexpectedChunk {
        /// The misplaced chunk.
        chunk: ChunkType,

        /// The chunk it must not follow.
        after: ChunkType,
    },

    /// The compressed stream did not end before the image data chunks ended.
    IncompleteImageData,

    /// The image data chunks continued after the compressed stream ended.
    ExtraneousImageData,
}


macro_rules! implement_from_category {
    ($category: ident, $variant: ident) => {
        impl From<$category> for Error {
            fn from(error: $category) -> Self {
                Error::$variant(error)
            }
        }
    };
}

implement_from_category!(LexingError, Lexing);
implement_from_category!(FormattingError, Formatting);
implement_from_category!(ParsingError, Parsing);
implement_from_category!(CompressionError, Compression);
implement_from_category!(DecodingError, Decoding);


impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexing(error) => write!(formatter, "invalid chunk stream: {}", error),
            Error::Formatting(error) => write!(formatter, "cannot write chunk stream: {}", error),
            Error::Parsing(error) => write!(formatter, "invalid chunk contents: {}", error),
            Error::Compression(error) => write!(formatter, "invalid image data: {}", error),
            Error::Decoding(error) => write!(formatter, "invalid chunk sequence: {}", error),
        }
    }
}

impl fmt::Display for LexingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexingError::TruncatedSignature => write!(formatter, "file ended inside the signature"),
            LexingError::InvalidSignature(bytes) => write!(formatter, "not a png signature: {:02x?}", bytes),
            LexingError::TruncatedChunkHeader => write!(formatter, "file ended inside a chunk header"),

            LexingError::InvalidChunkTypeCode(code) => write!(
                formatter, "chunk type {} is not allowed", crate::chunk::printable_name(code.to_be_bytes())
            ),

            LexingError::TruncatedChunkBody { expected } => write!(
                formatter, "file ended before the {} bytes of a chunk body", expected
            ),

            LexingError::InvalidChunkChecksum { declared, computed } => write!(
                formatter, "chunk checksum is {:#010x} but the contents sum to {:#010x}", declared, computed
            ),
        }
    }
}

impl fmt::Display for FormattingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormattingError::InvalidDestination => write!(formatter, "destination rejected the bytes"),
            FormattingError::ChunkTooLarge(size) => write!(formatter, "chunk payload of {} bytes is too large", size),
            FormattingError::CriticalAncillaryChunk(chunk) => write!(formatter, "{} chunk is not ancillary", chunk),
        }
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingError::MismatchedChunkSize { chunk, expected, found } => write!(
                formatter, "{} chunk has {} bytes instead of {}", chunk, found, expected
            ),

            ParsingError::InvalidHeaderColorCode { depth, color_type } => write!(
                formatter, "bit depth {} is not allowed with color type {}", depth, color_type
            ),

            ParsingError::InvalidHeaderCompressionCode(code) => write!(formatter, "compression method {} (expected 0)", code),
            ParsingError::InvalidHeaderFilterCode(code) => write!(formatter, "filter method {} (expected 0)", code),
            ParsingError::InvalidHeaderInterlacingCode(code) => write!(formatter, "interlace method {} (expected 0 or 1)", code),
            ParsingError::InvalidHeaderSize(size) => write!(formatter, "image size {}x{} is empty", size.0, size.1),
            ParsingError::UnexpectedPalette(format) => write!(formatter, "palette for format {:?} without color", format),
            ParsingError::InvalidPaletteSampleCount(count) => write!(formatter, "palette of {} bytes is not made of rgb triples", count),

            ParsingError::InvalidPaletteEntryCount { count, max } => write!(
                formatter, "palette has {} entries (expected 1 to {})", count, max
            ),

            ParsingError::MissingPalette(format) => write!(formatter, "format {:?} requires a palette", format),
        }
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionError::MissingDictionary => write!(formatter, "zlib stream requires a preset dictionary"),
            CompressionError::InvalidData => write!(formatter, "zlib stream is malformed"),
            CompressionError::OutOfMemory => write!(formatter, "zlib engine is out of memory"),
        }
    }
}

impl fmt::Display for DecodingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodingError::MissingChunk { chunk, before } => write!(formatter, "{} chunk must appear before {}", chunk, before),
            DecodingError::DuplicateChunk(chunk) => write!(formatter, "{} chunk must appear only once", chunk),
            DecodingError::UnexpectedChunk { chunk, after } => write!(formatter, "{} chunk must not appear after {}", chunk, after),
            DecodingError::IncompleteImageData => write!(formatter, "image data ended inside the compressed stream"),
            DecodingError::ExtraneousImageData => write!(formatter, "image data continues after the compressed stream"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Lexing(error) => Some(error),
            Error::Formatting(error) => Some(error),
            Error::Parsing(error) => Some(error),
            Error::Compression(error) => Some(error),
            Error::Decoding(error) => Some(error),
        }
    }
}

impl error::Error for LexingError {}
impl error::Error for FormattingError {}
impl error::Error for ParsingError {}
impl error::Error for CompressionError {}
impl error::Error for DecodingError {}


/// Convert a payload length to the length field of a chunk.
/// Chunk lengths are limited to 2^31 - 1 bytes.
pub(crate) fn usize_to_chunk_length(value: usize) -> Result<u32> {
    u32::try_from(value).ok()
        .filter(|&length| length <= crate::chunk::MAX_LENGTH)
        .ok_or(Error::Formatting(FormattingError::ChunkTooLarge(value)))
}

/// Panics on overflow, which only happens on 16-bit targets.
#[inline]
pub(crate) fn u32_to_usize(value: u32) -> usize {
    usize::try_from(value).expect("(u32 as usize) overflowed")
}
