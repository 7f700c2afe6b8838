
//! The contents of the `IHDR` chunk.

use std::convert::TryFrom;

use crate::chunk::ChunkType;
use crate::error::{ParsingError, Result};
use crate::io::{put_u32, take_u32};
use crate::math::Vec2;
use crate::meta::format::Format;


/// Size, pixel format and interlacing of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {

    /// Width and height in pixels. Neither is zero.
    pub size: Vec2<u32>,

    /// How the samples of each pixel are stored.
    pub format: Format,

    /// Whether the scanlines are ordered in seven passes (Adam7).
    pub interlaced: bool,
}

impl Header {

    /// Number of bytes in the header chunk.
    pub const BYTE_SIZE: usize = 13;

    /// Create a header, checking that the image is not empty.
    pub fn new(size: impl Into<Vec2<u32>>, format: Format, interlaced: bool) -> Result<Self> {
        let size = size.into();

        if size.0 == 0 || size.1 == 0 {
            return Err(ParsingError::InvalidHeaderSize(size).into());
        }

        Ok(Header { size, format, interlaced })
    }

    /// Decode and validate the payload of a header chunk.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() != Header::BYTE_SIZE {
            return Err(ParsingError::MismatchedChunkSize {
                chunk: ChunkType::IHDR,
                expected: Header::BYTE_SIZE,
                found: payload.len()
            }.into());
        }

        let format = Format::from_color_code(payload[8], payload[9])?;

        match payload[10] {
            0 => {},
            code => return Err(ParsingError::InvalidHeaderCompressionCode(code).into()),
        }

        match payload[11] {
            0 => {},
            code => return Err(ParsingError::InvalidHeaderFilterCode(code).into()),
        }

        let interlaced = match payload[12] {
            0 => false,
            1 => true,
            code => return Err(ParsingError::InvalidHeaderInterlacingCode(code).into()),
        };

        // cannot fail, the length was checked above
        let mut size_bytes = &payload[.. 8];
        let width = take_u32(&mut size_bytes).unwrap_or(0);
        let height = take_u32(&mut size_bytes).unwrap_or(0);

        Header::new((width, height), format, interlaced)
    }

    /// The payload of the header chunk.
    pub fn serialize(&self) -> Vec<u8> {
        let (depth, color_type) = self.format.color_code();

        let mut bytes = Vec::with_capacity(Header::BYTE_SIZE);
        put_u32(&mut bytes, self.size.width());
        put_u32(&mut bytes, self.size.height());
        bytes.extend_from_slice(&[ depth, color_type, 0, 0, self.interlaced as u8 ]);

        debug_assert_eq!(bytes.len(), Header::BYTE_SIZE, "header size bug");
        bytes
    }

    /// Number of bytes in one scanline of the full image, excluding the filter type byte.
    pub fn scanline_bytes(&self) -> u64 {
        (u64::from(self.size.width()) * self.format.bits_per_pixel() as u64 + 7) / 8
    }

    /// Number of decompressed bytes in a non-interlaced image, including one filter byte per scanline.
    /// Interlaced images are slightly larger, as each pass has its own scanlines.
    pub fn uninterlaced_data_size(&self) -> u64 {
        u64::from(self.size.height()) * (1 + self.scanline_bytes())
    }

    /// Pixel count, if it fits into `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        let size = self.size.map(u64::from);
        usize::try_from(size.area()).ok()
    }
}
