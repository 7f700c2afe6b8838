
//! Write a png image into a byte destination.
//!
//! The image data is compressed in fragments,
//! and every time enough compressed bytes are available, an image data chunk is emitted.

use std::io::{BufWriter, Write};

use crate::chunk::{Chunk, ChunkType};
use crate::chunk::writer::ChunkWriter;
use crate::compression::{Deflator, Level};
use crate::error::{FormattingError, Result, UnitResult};
use crate::io::{Destination, OutputBuffer};
use crate::meta::Standard;
use super::Image;
use super::order::BEFORE_PALETTE;


/// The flags that the apple variant stores in its marker chunk.
const APPLE_MARKER_PAYLOAD: [u8; 4] = [0x50, 0x00, 0x20, 0x06];

/// Produce compressed bytes in steps of this size, unless the chunks are smaller.
const OUTPUT_STEP: usize = 1 << 16;


/// How the image data is compressed and divided into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteOptions {

    /// How hard the deflate engine tries to compress the image data.
    pub level: Level,

    /// The largest payload of a single image data chunk.
    /// Values below one are treated as one.
    pub chunk_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { level: Level::DEFAULT, chunk_size: 1 << 15 }
    }
}

impl WriteOptions {

    /// Compress quickly, and emit few large chunks.
    pub fn fast() -> Self {
        WriteOptions { level: Level::FAST, chunk_size: 1 << 20 }
    }

    /// Buffer the writer and then write the png image into it.
    /// Use `to_buffered` instead, if your writer is an in-memory writer.
    #[must_use]
    pub fn to_unbuffered(self, image: &Image, unbuffered: impl Write) -> UnitResult {
        let mut buffered = BufWriter::new(unbuffered);
        self.to_buffered(image, &mut buffered)?;
        buffered.flush().map_err(|_| FormattingError::InvalidDestination)?;
        Ok(())
    }

    /// Write the png image into a buffered writer.
    /// Use `to_unbuffered` instead, if this is not an in-memory writer.
    #[must_use]
    pub fn to_buffered(self, image: &Image, buffered: impl Write) -> UnitResult {
        Encoder::new(buffered, self).encode(image)?;
        Ok(())
    }
}


/// Encodes a single png file into a byte destination.
#[derive(Debug)]
pub struct Encoder<D> {
    chunks: ChunkWriter<D>,
    options: WriteOptions,
}

impl<D: Destination> Encoder<D> {

    /// Prepare to encode a file at the current position of the destination.
    pub fn new(destination: D, options: WriteOptions) -> Self {
        Encoder { chunks: ChunkWriter::new(destination), options }
    }

    /// Write the whole file and return the destination.
    /// The format and interlacing flag of the header are taken from the layout of the image.
    /// Ancillary chunks that must precede the palette are written before it,
    /// all other ancillary chunks are written after it, in their original order.
    pub fn encode(mut self, image: &Image) -> Result<D> {
        let header = image.layout.header(image.header.size)?;

        if let Some(chunk) = image.ancillary.iter().find(|chunk| chunk.chunk_type.is_critical()) {
            return Err(FormattingError::CriticalAncillaryChunk(chunk.chunk_type).into());
        }

        let (before_palette, after_palette): (Vec<&Chunk>, Vec<&Chunk>) = image.ancillary.iter()
            .partition(|chunk| BEFORE_PALETTE.contains(&chunk.chunk_type));

        self.chunks.write_signature()?;

        if image.layout.standard == Standard::Ios {
            self.chunks.write_chunk(ChunkType::CgBI, &APPLE_MARKER_PAYLOAD)?;
        }

        self.chunks.write_chunk(ChunkType::IHDR, &header.serialize())?;

        for chunk in before_palette {
            self.chunks.write(chunk)?;
        }

        if let Some(palette) = image.layout.palette() {
            self.chunks.write_chunk(ChunkType::PLTE, &palette.serialize())?;
        }

        for chunk in after_palette {
            self.chunks.write(chunk)?;
        }

        let deflator = match image.layout.standard {
            Standard::Common => Deflator::new(self.options.level),
            Standard::Ios => Deflator::raw(self.options.level),
        };

        self.write_data(deflator, &image.data)?;
        self.chunks.write_chunk(ChunkType::IEND, &[])?;

        Ok(self.chunks.into_inner())
    }

    /// Number of bytes written into the destination so far.
    pub fn byte_position(&self) -> usize {
        self.chunks.byte_position()
    }

    fn write_data(&mut self, mut deflator: Deflator, data: &[u8]) -> UnitResult {
        let chunk_size = self.options.chunk_size.max(1);
        let mut pending = OutputBuffer::new();

        for fragment in data.chunks(chunk_size) {
            deflator.push(fragment);

            loop {
                let capacity = self.next_capacity(&pending, chunk_size);
                let remaining = deflator.pull(&mut pending, capacity)?;

                if pending.len() == chunk_size {
                    self.chunks.write_chunk(ChunkType::IDAT, pending.as_slice())?;
                    pending.clear();
                }
                else if pending.len() < capacity && remaining == 0 {
                    break;
                }
            }
        }

        loop {
            let capacity = self.next_capacity(&pending, chunk_size);
            let unfinished = deflator.finish(&mut pending, capacity)?;

            if pending.len() == chunk_size || (!unfinished && !pending.is_empty()) {
                self.chunks.write_chunk(ChunkType::IDAT, pending.as_slice())?;
                pending.clear();
            }

            if !unfinished {
                return Ok(());
            }
        }
    }

    fn next_capacity(&self, pending: &OutputBuffer, chunk_size: usize) -> usize {
        pending.len() + OUTPUT_STEP.min(chunk_size - pending.len())
    }
}
