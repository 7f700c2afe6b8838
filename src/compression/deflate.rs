
use miniz_oxide::deflate::core::{create_comp_flags_from_zip_params, CompressorOxide};
use miniz_oxide::deflate::stream::deflate;
use miniz_oxide::{MZError, MZFlush, MZStatus};

use crate::error::Result;
use crate::io::OutputBuffer;
use super::{engine_error, Level};

/// The largest window. Positive values add the zlib header and adler checksum.
const WINDOW_BITS: i32 = 15;

/// The default strategy of zlib.
const DEFAULT_STRATEGY: i32 = 0;


/// Compresses bytes that arrive in fragments into a zlib stream.
///
/// Push a fragment, pull until no input remains,
/// and after the last fragment call `finish` until it returns `false`.
/// The engine state is released when this value is dropped.
pub struct Deflator {
    compressor: Box<CompressorOxide>,

    /// The most recently pushed bytes, including the part the engine has already consumed.
    input: Vec<u8>,

    /// How many bytes of `input` the engine has consumed.
    consumed: usize,
}

impl Deflator {

    /// Prepare to produce a zlib stream, including header and checksum.
    pub fn new(level: Level) -> Self {
        Deflator::with_window_bits(level, WINDOW_BITS)
    }

    /// Prepare to produce deflate blocks without zlib header and checksum,
    /// as the Apple variant of png stores them.
    pub fn raw(level: Level) -> Self {
        Deflator::with_window_bits(level, -WINDOW_BITS)
    }

    fn with_window_bits(level: Level, window_bits: i32) -> Self {
        let flags = create_comp_flags_from_zip_params(i32::from(level.value()), window_bits, DEFAULT_STRATEGY);

        Deflator {
            compressor: Box::new(CompressorOxide::new(flags)),
            input: Vec::new(),
            consumed: 0,
        }
    }

    /// Provide the next fragment of uncompressed bytes.
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

    /// Compress into `into` until it holds `capacity` bytes in total or the pushed input is consumed.
    /// The engine may keep some output back until more input arrives or the stream is finished.
    /// Returns the number of pushed bytes that the engine has not consumed yet.
    pub fn pull(&mut self, into: &mut OutputBuffer, capacity: usize) -> Result<usize> {
        self.step(into, capacity, MZFlush::None)?;
        Ok(self.remaining())
    }

    /// Compress the remaining input and terminate the stream,
    /// writing into `into` until it holds `capacity` bytes in total.
    /// Returns `true` while more output is pending, in which case
    /// `finish` must be called again with more capacity.
    /// Returns `false` once the stream is complete, including its checksum.
    pub fn finish(&mut self, into: &mut OutputBuffer, capacity: usize) -> Result<bool> {
        let status = self.step(into, capacity, MZFlush::Finish)?;
        Ok(status != Some(MZStatus::StreamEnd))
    }

    /// Number of pushed bytes that the engine has not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.consumed
    }

    /// Returns `None` if the engine stopped because the output or the input was exhausted.
    fn step(&mut self, into: &mut OutputBuffer, capacity: usize, flush: MZFlush) -> Result<Option<MZStatus>> {
        let input = &self.input[self.consumed ..];
        let compressor = &mut self.compressor;

        let result = into.fill_spare(capacity, |spare| {
            let result = deflate(compressor, input, spare, flush);
            (result.bytes_written, result)
        });

        self.consumed += result.bytes_consumed;

        match result.status {
            Ok(status) => Ok(Some(status)),
            Err(MZError::Buf) => Ok(None),

            Err(error) => Err(engine_error(error).unwrap_or_else(|| {
                panic!("deflate engine used incorrectly ({:?})", error)
            })),
        }
    }
}

impl std::fmt::Debug for Deflator {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Deflator")
            .field("remaining", &self.remaining())
            .finish()
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::Inflator;

    fn sample_bytes() -> Vec<u8> {
        (0 .. 70_000_u32).map(|index| ((index / 3) % 97) as u8).collect()
    }

    fn deflate_fragments(fragments: &[&[u8]], level: Level, capacity_step: usize) -> Vec<u8> {
        let mut deflator = Deflator::new(level);
        let mut output = OutputBuffer::new();

        for fragment in fragments {
            deflator.push(fragment);

            loop {
                let capacity = output.len() + capacity_step;
                if deflator.pull(&mut output, capacity).unwrap() == 0 { break; }
            }
        }

        loop {
            let capacity = output.len() + capacity_step;
            if !deflator.finish(&mut output, capacity).unwrap() { break; }
        }

        output.into_vec()
    }

    #[test]
    fn decompresses_with_other_implementation(){
        let original = sample_bytes();
        let fragments: Vec<&[u8]> = original.chunks(4096).collect();

        for &level in &[Level::NONE, Level::FAST, Level::DEFAULT, Level::ULTRA] {
            let compressed = deflate_fragments(&fragments, level, 100);

            let decompressed = zune_inflate::DeflateDecoder::new(&compressed).decode_zlib()
                .expect("other implementation rejected the stream");

            assert_eq!(decompressed, original, "level {:?}", level);
        }
    }

    #[test]
    fn compresses_repetitions(){
        let original = sample_bytes();
        let compressed = deflate_fragments(&[&original], Level::BEST, 1 << 16);
        assert!(compressed.len() < original.len() / 10, "{} bytes", compressed.len());
    }

    #[test]
    fn empty_stream(){
        let compressed = deflate_fragments(&[], Level::DEFAULT, 1);
        assert_eq!(miniz_oxide::inflate::decompress_to_vec_zlib(&compressed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn finish_reports_completion_once(){
        let mut deflator = Deflator::new(Level::DEFAULT);
        deflator.push(b"chunk");
        deflator.pull(&mut OutputBuffer::new(), 0).unwrap();

        let mut output = OutputBuffer::new();
        assert!(!deflator.finish(&mut output, 1024).unwrap());

        let length = output.len();
        assert!(!deflator.finish(&mut output, 2048).unwrap());
        assert_eq!(output.len(), length);
    }

    #[test]
    fn raw_stream(){
        let original = sample_bytes();

        let mut deflator = Deflator::raw(Level::FAST);
        deflator.push(&original);

        let mut compressed = OutputBuffer::new();

        loop {
            let capacity = compressed.len() + 4096;
            if deflator.pull(&mut compressed, capacity).unwrap() == 0 { break; }
        }

        loop {
            let capacity = compressed.len() + 4096;
            if !deflator.finish(&mut compressed, capacity).unwrap() { break; }
        }

        assert_eq!(miniz_oxide::inflate::decompress_to_vec(compressed.as_slice()).unwrap(), original);
    }

    #[test]
    fn roundtrip_through_inflator(){
        let original = sample_bytes();
        let fragments: Vec<&[u8]> = original.chunks(1000).collect();
        let compressed = deflate_fragments(&fragments, Level::DEFAULT, 37);

        let mut inflator = Inflator::new();
        let mut output = OutputBuffer::new();

        for fragment in compressed.chunks(50) {
            inflator.push(fragment);
            while inflator.pull(&mut output, original.len() + 1).unwrap() > 0 {}
        }

        assert!(inflator.is_finished());
        assert_eq!(output.into_vec(), original);
    }
}
