
use miniz_oxide::inflate::stream::{inflate, InflateState};
use miniz_oxide::{DataFormat, MZError, MZFlush, MZStatus};

use crate::error::{CompressionError, Result};
use crate::io::OutputBuffer;
use super::engine_error;


/// Decompresses a zlib stream that arrives in fragments.
///
/// Push a fragment, then pull until `pull` reports that no input remains,
/// growing the output capacity whenever the output buffer was filled.
/// The engine state is released when this value is dropped.
pub struct Inflator {
    state: Box<InflateState>,

    /// The most recently pushed bytes, including the part the engine has already consumed.
    input: Vec<u8>,

    /// How many bytes of `input` the engine has consumed.
    consumed: usize,

    finished: bool,
}

impl Inflator {

    /// Prepare to decompress a zlib stream, including header and checksum.
    pub fn new() -> Self {
        Inflator::with_format(DataFormat::Zlib)
    }

    /// Prepare to decompress deflate blocks without zlib header and checksum,
    /// as found in the image data of the Apple variant of png.
    pub fn raw() -> Self {
        Inflator::with_format(DataFormat::Raw)
    }

    fn with_format(format: DataFormat) -> Self {
        Inflator {
            state: InflateState::new_boxed(format),
            input: Vec::new(),
            consumed: 0,
            finished: false,
        }
    }

    /// Provide the next fragment of compressed bytes.
    /// Should only be called after `pull` returned zero.
    /// Unconsumed bytes of the previous fragment are kept in front of the new fragment.
    pub fn push(&mut self, fragment: &[u8]) {
        if self.remaining() == 0 {
            self.input.clear();
        }
        else {
            self.input.drain(.. self.consumed);
        }

        self.consumed = 0;
        self.input.extend_from_slice(fragment);
    }

    /// Decompress into `into` until it holds `capacity` bytes in total,
    /// the pushed input is consumed, or the stream has ended.
    /// Returns the number of pushed bytes that the engine has not consumed yet.
    /// If `into` is full when this returns, more output may be pending,
    /// even if no input remains.
    pub fn pull(&mut self, into: &mut OutputBuffer, capacity: usize) -> Result<usize> {
        let input = &self.input[self.consumed ..];
        let state = &mut self.state;

        let result = into.fill_spare(capacity, |spare| {
            let result = inflate(state, input, spare, MZFlush::None);
            (result.bytes_written, result)
        });

        self.consumed += result.bytes_consumed;

        match result.status {
            Ok(MZStatus::Ok) => {},
            Ok(MZStatus::StreamEnd) => self.finished = true,

            // the output is full, or the input is exhausted
            Err(MZError::Buf) => {},

            Ok(MZStatus::NeedDict) => return Err(CompressionError::MissingDictionary.into()),

            Err(error) => return Err(engine_error(error).unwrap_or_else(|| {
                panic!("inflate engine used incorrectly ({:?})", error)
            })),
        }

        Ok(self.remaining())
    }

    /// Number of pushed bytes that the engine has not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.consumed
    }

    /// Whether the engine has seen the end of the zlib stream, including its checksum.
    /// Any bytes remaining after that do not belong to the stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Default for Inflator {
    fn default() -> Self {
        Inflator::new()
    }
}

impl std::fmt::Debug for Inflator {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Inflator")
            .field("remaining", &self.remaining())
            .field("finished", &self.finished)
            .finish()
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    fn sample_bytes() -> Vec<u8> {
        (0 .. 100_000_u32).map(|index| ((index / 7) ^ (index % 251)) as u8).collect()
    }

    /// Push each fragment and pull until it is consumed, growing the output as needed.
    fn inflate_fragments(fragments: &[&[u8]], initial_capacity: usize) -> Result<(Vec<u8>, bool)> {
        let mut inflator = Inflator::new();
        let mut output = OutputBuffer::new();
        let mut capacity = initial_capacity;

        for fragment in fragments {
            inflator.push(fragment);

            loop {
                let remaining = inflator.pull(&mut output, capacity)?;

                if output.len() == capacity { capacity *= 2; }
                else if remaining == 0 || inflator.is_finished() { break; }
            }
        }

        Ok((output.into_vec(), inflator.is_finished()))
    }

    #[test]
    fn fragments_equal_whole(){
        let original = sample_bytes();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&original, 6);

        let (whole, finished) = inflate_fragments(&[&compressed], original.len() + 1).unwrap();
        assert_eq!(whole, original);
        assert!(finished);

        for &split in &[1, 2, 17, compressed.len() / 2, compressed.len() - 1] {
            let (first, second) = compressed.split_at(split);
            let (fragmented, finished) = inflate_fragments(&[first, second], 1024).unwrap();
            assert_eq!(fragmented, original, "split at {}", split);
            assert!(finished);
        }
    }

    #[test]
    fn many_tiny_fragments(){
        let original = sample_bytes();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&original, 1);
        let fragments: Vec<&[u8]> = compressed.chunks(13).collect();

        let (output, finished) = inflate_fragments(&fragments, 100).unwrap();
        assert_eq!(output, original);
        assert!(finished);
    }

    #[test]
    fn output_full_is_not_an_error(){
        let original = sample_bytes();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&original, 6);

        let mut inflator = Inflator::new();
        inflator.push(&compressed);

        let mut output = OutputBuffer::new();
        inflator.pull(&mut output, 10).unwrap();
        assert_eq!(output.len(), 10);
        assert!(!inflator.is_finished());

        // no room at all
        inflator.pull(&mut output, 10).unwrap();
        assert_eq!(output.len(), 10);
        assert_eq!(output.as_slice(), &original[.. 10]);
    }

    #[test]
    fn early_push_keeps_unconsumed_bytes(){
        // incompressible, so that half of the input exceeds the window of the engine
        let original: Vec<u8> = (0 .. 100_000).map(|_| rand::random::<u8>()).collect();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&original, 6);
        let (first, second) = compressed.split_at(compressed.len() / 2);

        let mut inflator = Inflator::new();
        let mut output = OutputBuffer::new();

        inflator.push(first);
        inflator.pull(&mut output, 16).unwrap();
        assert!(inflator.remaining() > 0);

        inflator.push(second);
        assert!(inflator.remaining() > second.len());

        let mut capacity = 16;
        while !inflator.is_finished() {
            capacity *= 2;
            inflator.pull(&mut output, capacity).unwrap();
        }

        assert_eq!(output.into_vec(), original);
    }

    #[test]
    fn trailing_bytes_are_not_consumed(){
        let mut compressed = miniz_oxide::deflate::compress_to_vec_zlib(b"hello", 6);
        compressed.extend_from_slice(&[1, 2, 3]);

        let mut inflator = Inflator::new();
        inflator.push(&compressed);

        let mut output = OutputBuffer::new();
        let remaining = inflator.pull(&mut output, 64).unwrap();

        assert!(inflator.is_finished());
        assert_eq!(remaining, 3);
        assert_eq!(output.as_slice(), b"hello");
    }

    #[test]
    fn raw_stream_without_zlib_header(){
        let original = sample_bytes();
        let compressed = miniz_oxide::deflate::compress_to_vec(&original, 6);

        let mut inflator = Inflator::raw();
        inflator.push(&compressed);

        let mut output = OutputBuffer::new();
        let remaining = inflator.pull(&mut output, original.len() + 1).unwrap();

        assert_eq!(remaining, 0);
        assert!(inflator.is_finished());
        assert_eq!(output.into_vec(), original);
    }

    #[test]
    fn corrupt_data(){
        let mut compressed = miniz_oxide::deflate::compress_to_vec_zlib(&sample_bytes(), 6);
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF; // breaks the adler checksum

        let result = inflate_fragments(&[&compressed], 200_000);
        assert_eq!(result, Err(Error::Compression(CompressionError::InvalidData)));
    }
}
