
//! Chunk types and the records that the chunk stream consists of.
//! Every chunk is a big-endian length, a four-byte type code,
//! the payload, and a CRC-32 over type code and payload.

pub mod reader;
pub mod writer;

use std::fmt;
use bit_field::BitField;
use crate::error::{LexingError, Result};


/// The eight bytes that every png file starts with.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// The largest payload length that a chunk may declare.
pub const MAX_LENGTH: u32 = (1 << 31) - 1;

/// A type code that is allowed to appear in a png file.
/// Either one of the well-known codes, or a code
/// that declares itself as ancillary and keeps its reserved bit clear.
/// The code is stored in file byte order, so `IHDR` is `0x49484452`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkType {
    code: u32,
}

/// A single chunk, after the checksum has been verified and removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {

    /// What the payload contains.
    pub chunk_type: ChunkType,

    /// The bytes between the type code and the checksum.
    pub payload: Vec<u8>,
}

macro_rules! define_well_known_chunk_types {
    ( $( $(#[$documentation: meta])* $name: ident = $code: expr ),* $(,)? ) => {
        impl ChunkType {
            $(
                $(#[$documentation])*
                pub const $name: ChunkType = ChunkType::from_bytes_unchecked(*$code);
            )*

            /// All chunk types that are legal regardless of their property bits.
            pub const WELL_KNOWN: &'static [ChunkType] = &[ $( ChunkType::$name ),* ];
        }
    };
}

#[allow(non_upper_case_globals)]
mod well_known {
    use super::ChunkType;

    define_well_known_chunk_types! {
        /// Image header: size, format and interlacing.
        IHDR = b"IHDR",

        /// Color palette.
        PLTE = b"PLTE",

        /// A fragment of the compressed image data.
        IDAT = b"IDAT",

        /// Marks the end of the file.
        IEND = b"IEND",

        /// Primary chromaticities and white point.
        cHRM = b"cHRM",

        /// Image gamma.
        gAMA = b"gAMA",

        /// Embedded ICC color profile.
        iCCP = b"iCCP",

        /// Significant bits per sample.
        sBIT = b"sBIT",

        /// Standard RGB color space with rendering intent.
        sRGB = b"sRGB",

        /// Background color.
        bKGD = b"bKGD",

        /// Palette histogram.
        hIST = b"hIST",

        /// Transparency.
        tRNS = b"tRNS",

        /// Physical pixel dimensions.
        pHYs = b"pHYs",

        /// Suggested palette.
        sPLT = b"sPLT",

        /// Last modification time.
        tIME = b"tIME",

        /// International textual data.
        iTXt = b"iTXt",

        /// Latin-1 textual data.
        tEXt = b"tEXt",

        /// Compressed Latin-1 textual data.
        zTXt = b"zTXt",

        /// Marks the Apple variant of png, which precedes the header.
        CgBI = b"CgBI",
    }
}


impl ChunkType {

    /// Validate a type code, given in file byte order.
    pub fn new(code: u32) -> Result<Self> {
        let chunk_type = ChunkType { code };

        if ChunkType::WELL_KNOWN.contains(&chunk_type) || chunk_type.is_admissible_ancillary() {
            Ok(chunk_type)
        }
        else {
            Err(LexingError::InvalidChunkTypeCode(code).into())
        }
    }

    /// Validate the four bytes of a type code.
    pub fn from_bytes(bytes: [u8; 4]) -> Result<Self> {
        ChunkType::new(u32::from_be_bytes(bytes))
    }

    /// Only for codes that are known to be valid.
    pub(crate) const fn from_bytes_unchecked(bytes: [u8; 4]) -> Self {
        ChunkType { code: u32::from_be_bytes(bytes) }
    }

    /// An unknown code may only be used for ancillary chunks,
    /// which a decoder is allowed to skip, and only with the reserved bit clear.
    fn is_admissible_ancillary(self) -> bool {
        self.code & 0x2000_2000 == 0x2000_0000
    }

    /// The type code in file byte order.
    pub fn code(self) -> u32 { self.code }

    /// The four bytes of the type code, as they appear in the file.
    pub fn to_bytes(self) -> [u8; 4] { self.code.to_be_bytes() }

    /// The four characters of the code. Bytes that are not printable are escaped.
    pub fn name(self) -> String {
        printable_name(self.to_bytes())
    }

    /// Whether this chunk is required to decode the image.
    /// Unknown critical chunks are rejected by `ChunkType::new`.
    pub fn is_critical(self) -> bool { !self.is_ancillary() }

    /// Whether a decoder may ignore this chunk. Bit 5 of the first byte.
    pub fn is_ancillary(self) -> bool { self.code.get_bit(29) }

    /// Whether this chunk is not registered publicly. Bit 5 of the second byte.
    pub fn is_private(self) -> bool { self.code.get_bit(21) }

    /// Must be clear in all current png versions. Bit 5 of the third byte.
    pub fn is_reserved(self) -> bool { self.code.get_bit(13) }

    /// Whether an editor may copy this chunk without understanding it. Bit 5 of the last byte.
    pub fn is_safe_to_copy(self) -> bool { self.code.get_bit(5) }
}

pub(crate) fn printable_name(bytes: [u8; 4]) -> String {
    bytes.iter().flat_map(|&byte| std::ascii::escape_default(byte)).map(char::from).collect()
}

impl fmt::Display for ChunkType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.name())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "ChunkType({})", self.name())
    }
}

impl Chunk {

    /// Create a chunk from a type and its payload.
    pub fn new(chunk_type: ChunkType, payload: impl Into<Vec<u8>>) -> Self {
        Chunk { chunk_type, payload: payload.into() }
    }
}
