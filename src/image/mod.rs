
//! Read and write whole png images.
//! The pixels are the decompressed image data stream:
//! one filter type byte per scanline, followed by the filtered samples.
//! Reconstructing the actual samples is up to the caller.

pub mod read;
pub mod write;

pub(crate) mod order;

use smallvec::SmallVec;
use crate::chunk::Chunk;
use crate::error::Result;
use crate::math::Vec2;
use crate::meta::header::Header;
use crate::meta::Layout;

pub use self::read::{ReadOptions, Decoder};
pub use self::write::{WriteOptions, Encoder};


/// The ancillary chunks of an image, in file order.
pub type AncillaryChunks = SmallVec<[Chunk; 6]>;

/// A decoded png image, or an image prepared for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {

    /// The contents of the header chunk.
    pub header: Header,

    /// Pixel format, palette, and png variant.
    /// When writing, the format and interlacing of the layout are used.
    pub layout: Layout,

    /// The decompressed image data, still filtered.
    pub data: Vec<u8>,

    /// Every ancillary chunk, in the order of the file.
    /// Chunks whose placement is restricted are moved to their allowed position when writing.
    pub ancillary: AncillaryChunks,
}

impl Image {

    /// Create an image without ancillary chunks.
    /// Fails if one of the dimensions is zero.
    pub fn new(size: impl Into<Vec2<u32>>, layout: Layout, data: Vec<u8>) -> Result<Self> {
        Ok(Image {
            header: layout.header(size)?,
            ancillary: AncillaryChunks::new(),
            layout, data,
        })
    }

    /// Add an ancillary chunk.
    pub fn with_chunk(mut self, chunk: Chunk) -> Self {
        self.ancillary.push(chunk);
        self
    }

    /// Width and height in pixels.
    pub fn size(&self) -> Vec2<u32> {
        self.header.size
    }

    /// Read an image with the default options from a buffered byte source.
    pub fn read_from_buffered(read: impl std::io::Read) -> Result<Self> {
        ReadOptions::default().from_buffered(read)
    }

    /// Write this image with the default options into a buffered byte destination.
    pub fn write_to_buffered(&self, write: impl std::io::Write) -> crate::error::UnitResult {
        WriteOptions::default().to_buffered(self, write)
    }
}
