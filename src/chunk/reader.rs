
//! Split a byte source into verified chunks.

use crate::chunk::{Chunk, ChunkType, MAX_LENGTH, SIGNATURE};
use crate::crc;
use crate::error::{u32_to_usize, LexingError, Result, UnitResult};
use crate::io::{take_u32, Source, Tracking};


/// Reads the signature and then one chunk at a time.
/// Does not look at the payloads, and does not check the order of the chunks.
#[derive(Debug)]
pub struct ChunkReader<S> {
    source: Tracking<S>,
}

impl<S: Source> ChunkReader<S> {

    /// Start reading at the first byte of the file.
    pub fn new(source: S) -> Self {
        ChunkReader { source: Tracking::new(source) }
    }

    /// Number of bytes consumed from the source so far.
    pub fn byte_position(&self) -> usize {
        self.source.byte_position()
    }

    /// Stop reading and return the source.
    pub fn into_inner(self) -> S {
        self.source.into_inner()
    }

    /// Consume the eight signature bytes and check them.
    pub fn read_signature(&mut self) -> UnitResult {
        let bytes = self.source.read(SIGNATURE.len()).ok_or(LexingError::TruncatedSignature)?;

        let mut signature = [0_u8; 8];
        signature.copy_from_slice(&bytes);

        if signature == SIGNATURE { Ok(()) }
        else { Err(LexingError::InvalidSignature(signature).into()) }
    }

    /// Consume the next chunk. The checksum is verified before the payload is returned.
    pub fn read_chunk(&mut self) -> Result<Chunk> {
        let header = self.source.read(8).ok_or(LexingError::TruncatedChunkHeader)?;
        let mut header = header.as_slice();

        let length = take_u32(&mut header).ok_or(LexingError::TruncatedChunkHeader)?;
        let code = take_u32(&mut header).ok_or(LexingError::TruncatedChunkHeader)?;
        let chunk_type = ChunkType::new(code)?;

        let expected = u32_to_usize(length).saturating_add(4);

        // no source can contain such a chunk, as the writer refuses to produce it
        if length > MAX_LENGTH {
            return Err(LexingError::TruncatedChunkBody { expected }.into());
        }

        let mut payload = self.source.read(expected).ok_or(LexingError::TruncatedChunkBody { expected })?;

        let checksum_bytes = payload.split_off(expected - 4);
        let declared = take_u32(&mut checksum_bytes.as_slice()).ok_or(LexingError::TruncatedChunkBody { expected })?;

        let computed = crc::update(crc::compute(&chunk_type.to_bytes()), &payload);
        if declared != computed {
            return Err(LexingError::InvalidChunkChecksum { declared, computed }.into());
        }

        Ok(Chunk { chunk_type, payload })
    }

    /// Iterate all chunks up to and including `IEND`.
    /// The iterator ends after the first error.
    /// Does not read the signature.
    pub fn chunks(self) -> Chunks<S> {
        Chunks { reader: self, done: false }
    }
}


/// Yields the chunks of a file until the end chunk.
/// Created by `ChunkReader::chunks`.
#[derive(Debug)]
pub struct Chunks<S> {
    reader: ChunkReader<S>,
    done: bool,
}

impl<S: Source> Iterator for Chunks<S> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done { return None; }

        let chunk = self.reader.read_chunk();
        self.done = match &chunk {
            Ok(chunk) => chunk.chunk_type == ChunkType::IEND,
            Err(_) => true,
        };

        Some(chunk)
    }
}

impl<S> Chunks<S> {

    /// Stop iterating and return the reader.
    pub fn into_reader(self) -> ChunkReader<S> {
        self.reader
    }
}
