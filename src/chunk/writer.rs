
//! Format chunks into a byte destination.

use crate::chunk::{Chunk, ChunkType, SIGNATURE};
use crate::crc;
use crate::error::{usize_to_chunk_length, FormattingError, UnitResult};
use crate::io::{put_u32, Destination, Tracking};


/// Writes the signature and then one chunk at a time.
/// Does not check the order of the chunks.
#[derive(Debug)]
pub struct ChunkWriter<D> {
    destination: Tracking<D>,
}

impl<D: Destination> ChunkWriter<D> {

    /// Start writing at the first byte of the file.
    pub fn new(destination: D) -> Self {
        ChunkWriter { destination: Tracking::new(destination) }
    }

    /// Number of bytes accepted by the destination so far.
    pub fn byte_position(&self) -> usize {
        self.destination.byte_position()
    }

    /// Stop writing and return the destination.
    pub fn into_inner(self) -> D {
        self.destination.into_inner()
    }

    /// Write the eight signature bytes.
    pub fn write_signature(&mut self) -> UnitResult {
        self.destination.write(&SIGNATURE).ok_or(FormattingError::InvalidDestination)?;
        Ok(())
    }

    /// Write length, type code, payload and checksum.
    /// If the destination fails, the chunk must be considered not written,
    /// even though some of its bytes may have been accepted.
    pub fn write_chunk(&mut self, chunk_type: ChunkType, payload: &[u8]) -> UnitResult {
        let length = usize_to_chunk_length(payload.len())?;
        let type_bytes = chunk_type.to_bytes();

        let mut header = Vec::with_capacity(8);
        put_u32(&mut header, length);
        header.extend_from_slice(&type_bytes);

        let mut checksum = Vec::with_capacity(4);
        put_u32(&mut checksum, crc::update(crc::compute(&type_bytes), payload));

        self.destination.write(&header)
            .and_then(|()| self.destination.write(payload))
            .and_then(|()| self.destination.write(&checksum))
            .ok_or(FormattingError::InvalidDestination)?;

        Ok(())
    }

    /// Write a chunk record.
    pub fn write(&mut self, chunk: &Chunk) -> UnitResult {
        self.write_chunk(chunk.chunk_type, &chunk.payload)
    }
}
