
//! Read a png image from a byte source.
//!
//! The decoder lexes every chunk, checks the chunk order,
//! and streams the payloads of the image data chunks through the inflate engine.
//! The scanlines are not reconstructed.

use std::convert::TryFrom;
use std::io::{BufReader, Read};
use smallvec::SmallVec;

use crate::chunk::{Chunk, ChunkType};
use crate::chunk::reader::ChunkReader;
use crate::compression::{Inflator, StreamHeader, STREAM_HEADER_BYTES};
use crate::error::{CompressionError, DecodingError, Result, UnitResult};
use crate::io::{OutputBuffer, Source};
use crate::meta::{Layout, Standard};
use crate::meta::header::Header;
use crate::meta::palette::Palette;
use super::{AncillaryChunks, Image};
use super::order::ChunkOrder;


/// The decompressed buffer starts with the expected size,
/// but never larger than this, because the header may lie.
const INITIAL_CAPACITY_LIMIT: usize = 1 << 22;


/// How strict the decoder is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReadOptions {

    /// Reject ancillary chunks that appear where the png format does not allow them,
    /// for example a gamma chunk after the palette.
    /// When disabled, ancillary chunks are accepted anywhere between header and end.
    pub pedantic: bool,
}

impl ReadOptions {

    /// Enforce the placement of all known chunks.
    pub fn pedantic() -> Self {
        ReadOptions { pedantic: true }
    }

    /// Buffer the reader and then read the png image from it.
    /// Use `from_buffered` instead, if your reader is an in-memory reader.
    #[must_use]
    pub fn from_unbuffered(self, unbuffered: impl Read) -> Result<Image> {
        self.from_buffered(BufReader::new(unbuffered))
    }

    /// Read the png image from a buffered reader.
    /// Use `from_unbuffered` instead, if this is not an in-memory reader.
    #[must_use]
    pub fn from_buffered(self, buffered: impl Read) -> Result<Image> {
        Decoder::new(buffered, self).decode()
    }
}


/// Decodes a single png file from a byte source.
#[derive(Debug)]
pub struct Decoder<S> {
    chunks: ChunkReader<S>,
    order: ChunkOrder,
}

impl<S: Source> Decoder<S> {

    /// Prepare to decode the file at the current position of the source.
    pub fn new(source: S, options: ReadOptions) -> Self {
        Decoder {
            chunks: ChunkReader::new(source),
            order: ChunkOrder::new(options.pedantic),
        }
    }

    /// Number of bytes consumed from the source so far.
    pub fn byte_position(&self) -> usize {
        self.chunks.byte_position()
    }

    /// Read all chunks up to and including the end chunk.
    /// Bytes after the end chunk are not read.
    pub fn decode(mut self) -> Result<Image> {
        self.chunks.read_signature()?;

        let mut standard = Standard::Common;
        let mut chunk = self.next_chunk()?;

        if chunk.chunk_type == ChunkType::CgBI {
            standard = Standard::Ios;
            chunk = self.next_chunk()?;
        }

        // the chunk order guarantees that this is the header
        let header = Header::parse(&chunk.payload)?;

        if header.format.is_indexed() {
            self.order.require_palette();
        }

        let mut palette = None;
        let mut ancillary = AncillaryChunks::new();
        let mut data = DataStream::new(&header, standard);

        loop {
            let chunk = self.next_chunk()?;

            if self.order.data_ended() {
                data.end()?;
            }

            match chunk.chunk_type {
                ChunkType::IEND => break,
                ChunkType::IDAT => data.push(&chunk.payload)?,
                ChunkType::PLTE => palette = Some(Palette::parse(&chunk.payload, header.format)?),

                // unknown critical chunks were already rejected by the chunk reader
                _ => ancillary.push(chunk),
            }
        }

        Ok(Image {
            layout: Layout::new(&header, palette, standard)?,
            data: data.into_bytes(),
            header, ancillary,
        })
    }

    fn next_chunk(&mut self) -> Result<Chunk> {
        let chunk = self.chunks.read_chunk()?;
        self.order.visit(chunk.chunk_type)?;
        Ok(chunk)
    }
}


/// Decompresses the payloads of consecutive image data chunks.
/// The compressed stream must end exactly with the last of these chunks.
#[derive(Debug)]
struct DataStream {
    inflator: Inflator,

    /// The apple variant stores raw deflate blocks without zlib header.
    has_zlib_header: bool,

    /// The first bytes of the stream, which may be spread over multiple chunks.
    prefix: SmallVec<[u8; STREAM_HEADER_BYTES]>,

    bytes: OutputBuffer,
    capacity: usize,
}

impl DataStream {
    fn new(header: &Header, standard: Standard) -> Self {
        let expected_size = usize::try_from(header.uninterlaced_data_size()).unwrap_or(usize::MAX);

        let (inflator, has_zlib_header) = match standard {
            Standard::Common => (Inflator::new(), true),
            Standard::Ios => (Inflator::raw(), false),
        };

        DataStream {
            inflator, has_zlib_header,
            prefix: SmallVec::new(),
            bytes: OutputBuffer::new(),

            // one more byte than expected, so that a correct image never fills the buffer
            capacity: expected_size.saturating_add(1).min(INITIAL_CAPACITY_LIMIT),
        }
    }

    fn push(&mut self, fragment: &[u8]) -> UnitResult {
        if self.inflator.is_finished() {
            return if fragment.is_empty() { Ok(()) }
            else { Err(DecodingError::ExtraneousImageData.into()) };
        }

        if self.has_zlib_header && self.prefix.len() < STREAM_HEADER_BYTES {
            let missing = (STREAM_HEADER_BYTES - self.prefix.len()).min(fragment.len());
            self.prefix.extend_from_slice(&fragment[.. missing]);

            if self.prefix.len() == STREAM_HEADER_BYTES {
                StreamHeader::inspect(&self.prefix)?;
            }
        }

        self.inflator.push(fragment);

        loop {
            let previous = (self.inflator.remaining(), self.bytes.len());
            let remaining = self.inflator.pull(&mut self.bytes, self.capacity)?;

            if self.inflator.is_finished() {
                return if remaining == 0 { Ok(()) }
                else { Err(DecodingError::ExtraneousImageData.into()) };
            }

            if self.bytes.len() == self.capacity {
                self.capacity = self.capacity.saturating_mul(2);
            }
            else if remaining == 0 {
                return Ok(());
            }
            else if (remaining, self.bytes.len()) == previous {
                // the engine neither consumed nor produced anything
                return Err(CompressionError::InvalidData.into());
            }
        }
    }

    fn end(&self) -> UnitResult {
        if self.inflator.is_finished() { Ok(()) }
        else { Err(DecodingError::IncompleteImageData.into()) }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_vec()
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::chunk::writer::ChunkWriter;
    use crate::error::Error;
    use crate::meta::format::Format;

    fn file(chunks: &[(ChunkType, &[u8])]) -> Vec<u8> {
        let mut writer = ChunkWriter::new(Vec::new());
        writer.write_signature().unwrap();

        for &(chunk_type, payload) in chunks {
            writer.write_chunk(chunk_type, payload).unwrap();
        }

        writer.into_inner()
    }

    fn gray_header() -> Vec<u8> {
        Header::new((4, 2), Format::Gray8, false).unwrap().serialize()
    }

    fn scanlines() -> Vec<u8> {
        vec![ 0, 1, 2, 3, 4,  0, 5, 6, 7, 8 ]
    }

    fn decode(bytes: &[u8]) -> Result<Image> {
        ReadOptions::default().from_buffered(bytes)
    }

    #[test]
    fn stream_split_over_chunks(){
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines(), 6);

        for split in 0 ..= compressed.len() {
            let (first, second) = compressed.split_at(split);

            let bytes = file(&[
                (ChunkType::IHDR, gray_header().as_slice()),
                (ChunkType::IDAT, first),
                (ChunkType::IDAT, second),
                (ChunkType::IEND, &[][..]),
            ]);

            let image = decode(&bytes).unwrap();
            assert_eq!(image.data, scanlines(), "split at {}", split);
            assert_eq!(image.layout.standard, Standard::Common);
        }
    }

    #[test]
    fn stream_ends_early(){
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines(), 6);

        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, &compressed[.. compressed.len() - 1]),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap_err(), Error::Decoding(DecodingError::IncompleteImageData));

        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, &compressed[.. 2]),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap_err(), Error::Decoding(DecodingError::IncompleteImageData));
    }

    #[test]
    fn data_after_stream_end(){
        let mut compressed = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines(), 6);

        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, compressed.as_slice()),
            (ChunkType::IDAT, &[0][..]),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap_err(), Error::Decoding(DecodingError::ExtraneousImageData));

        compressed.push(0);
        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, compressed.as_slice()),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap_err(), Error::Decoding(DecodingError::ExtraneousImageData));
    }

    #[test]
    fn empty_data_chunk_after_stream_end(){
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines(), 6);

        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, compressed.as_slice()),
            (ChunkType::IDAT, &[][..]),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap().data, scanlines());
    }

    #[test]
    fn preset_dictionary_in_split_stream_header(){
        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, &[0x78][..]),
            (ChunkType::IDAT, &[0xBB, 0x63, 0, 0, 0, 0][..]),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap_err(), Error::Compression(CompressionError::MissingDictionary));
    }

    #[test]
    fn buffer_grows_beyond_declared_size(){
        // the header declares fewer bytes than the stream contains
        let mut data = scanlines();
        data.extend_from_slice(&[0; 5000]);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&data, 6);

        let bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, compressed.as_slice()),
            (ChunkType::IEND, &[][..]),
        ]);

        assert_eq!(decode(&bytes).unwrap().data, data);
    }

    #[test]
    fn tiny_fragments_reuse_the_buffer(){
        let header = Header::new((100, 100), Format::Gray8, false).unwrap();
        let data: Vec<u8> = (0 .. 100 * 101_u32).map(|index| (index * 7 % 251) as u8).collect();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&data, 6);

        let mut stream = DataStream::new(&header, Standard::Common);
        for fragment in compressed.chunks(1) {
            stream.push(fragment).unwrap();
        }

        stream.end().unwrap();

        // every pull offers the whole capacity, but the storage is initialized only once
        assert_eq!(stream.bytes.initialized(), data.len() + 1);
        assert_eq!(stream.into_bytes(), data);
    }

    #[test]
    fn apple_variant_uses_raw_deflate(){
        let compressed = miniz_oxide::deflate::compress_to_vec(&scanlines(), 6);

        let bytes = file(&[
            (ChunkType::CgBI, &[0x50, 0x00, 0x20, 0x06][..]),
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, compressed.as_slice()),
            (ChunkType::IEND, &[][..]),
        ]);

        let image = decode(&bytes).unwrap();
        assert_eq!(image.layout.standard, Standard::Ios);
        assert_eq!(image.data, scanlines());
    }

    #[test]
    fn stops_after_end_chunk(){
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&scanlines(), 6);

        let mut bytes = file(&[
            (ChunkType::IHDR, gray_header().as_slice()),
            (ChunkType::IDAT, compressed.as_slice()),
            (ChunkType::IEND, &[][..]),
        ]);

        let file_size = bytes.len();
        bytes.extend_from_slice(b"trailing garbage");

        let mut remaining = bytes.as_slice();
        let image = Decoder::new(&mut remaining, ReadOptions::pedantic()).decode().unwrap();

        assert_eq!(image.data, scanlines());
        assert_eq!(remaining, b"trailing garbage");
        assert_eq!(bytes.len() - remaining.len(), file_size);
    }
}
