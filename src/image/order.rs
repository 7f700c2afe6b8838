
//! Where each chunk type may appear in a file.

use smallvec::SmallVec;
use crate::chunk::ChunkType;
use crate::error::{DecodingError, UnitResult};


/// Chunks that must not appear more than once.
const UNIQUE: &[ChunkType] = &[
    ChunkType::IHDR, ChunkType::PLTE, ChunkType::IEND,
    ChunkType::cHRM, ChunkType::gAMA, ChunkType::iCCP, ChunkType::sBIT, ChunkType::sRGB,
    ChunkType::bKGD, ChunkType::hIST, ChunkType::tRNS, ChunkType::pHYs, ChunkType::tIME,
];

/// Ancillary chunks that must precede both the palette and the image data.
pub(crate) const BEFORE_PALETTE: &[ChunkType] = &[
    ChunkType::cHRM, ChunkType::gAMA, ChunkType::iCCP, ChunkType::sBIT, ChunkType::sRGB,
];

/// Ancillary chunks that must follow the palette, if there is one.
const AFTER_PALETTE: &[ChunkType] = &[
    ChunkType::bKGD, ChunkType::hIST, ChunkType::tRNS,
];

/// Ancillary chunks that must precede the image data.
const BEFORE_DATA: &[ChunkType] = &[
    ChunkType::cHRM, ChunkType::gAMA, ChunkType::iCCP, ChunkType::sBIT, ChunkType::sRGB,
    ChunkType::bKGD, ChunkType::hIST, ChunkType::tRNS,
    ChunkType::pHYs, ChunkType::sPLT,
];


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Data {
    Pending,
    Running,
    Ended,
}

/// Checks each chunk type against the types that came before it.
/// The critical chunk rules are always enforced.
/// The placement of ancillary chunks is only enforced in pedantic mode.
#[derive(Debug, Clone)]
pub(crate) struct ChunkOrder {
    pedantic: bool,
    palette_required: bool,

    seen: SmallVec<[ChunkType; 16]>,
    previous: Option<ChunkType>,
    data: Data,
}

impl ChunkOrder {

    pub fn new(pedantic: bool) -> Self {
        ChunkOrder {
            pedantic,
            palette_required: false,
            seen: SmallVec::new(),
            previous: None,
            data: Data::Pending,
        }
    }

    /// Require a palette before the image data, as for indexed formats.
    pub fn require_palette(&mut self) {
        self.palette_required = true;
    }

    /// Whether the chunks so far contained image data, followed by another chunk.
    pub fn data_ended(&self) -> bool {
        self.data == Data::Ended
    }

    /// Check the next chunk type, then remember it.
    pub fn visit(&mut self, chunk: ChunkType) -> UnitResult {
        self.check(chunk)?;

        if UNIQUE.contains(&chunk) || AFTER_PALETTE.contains(&chunk) {
            self.seen.push(chunk);
        }

        self.data = match (self.data, chunk) {
            (Data::Pending, ChunkType::IDAT) => Data::Running,
            (Data::Running, ChunkType::IDAT) => Data::Running,
            (Data::Pending, _) => Data::Pending,
            _ => Data::Ended,
        };

        self.previous = Some(chunk);
        Ok(())
    }

    fn check(&self, chunk: ChunkType) -> UnitResult {
        let previous = match self.previous {
            Some(previous) => previous,

            None => return match chunk {
                ChunkType::IHDR | ChunkType::CgBI => Ok(()),
                _ => Err(DecodingError::MissingChunk { chunk: ChunkType::IHDR, before: chunk }.into()),
            },
        };

        if previous == ChunkType::IEND {
            return Err(unexpected(chunk, ChunkType::IEND));
        }

        if chunk == ChunkType::CgBI {
            return Err(unexpected(chunk, previous));
        }

        if previous == ChunkType::CgBI && chunk != ChunkType::IHDR {
            return Err(DecodingError::MissingChunk { chunk: ChunkType::IHDR, before: chunk }.into());
        }

        if UNIQUE.contains(&chunk) && self.has_seen(chunk) {
            return Err(DecodingError::DuplicateChunk(chunk).into());
        }

        match chunk {
            ChunkType::PLTE if self.data != Data::Pending => return Err(unexpected(chunk, ChunkType::IDAT)),

            ChunkType::IDAT => match self.data {
                Data::Ended => return Err(unexpected(chunk, previous)),

                Data::Pending if self.palette_required && !self.has_seen(ChunkType::PLTE) => return Err(
                    DecodingError::MissingChunk { chunk: ChunkType::PLTE, before: chunk }.into()
                ),

                _ => {},
            },

            ChunkType::IEND if self.data == Data::Pending => return Err(
                DecodingError::MissingChunk { chunk: ChunkType::IDAT, before: chunk }.into()
            ),

            _ => {},
        }

        if self.pedantic {
            self.check_placement(chunk)?;
        }

        Ok(())
    }

    fn check_placement(&self, chunk: ChunkType) -> UnitResult {
        if BEFORE_DATA.contains(&chunk) && self.data != Data::Pending {
            return Err(unexpected(chunk, ChunkType::IDAT));
        }

        if BEFORE_PALETTE.contains(&chunk) && self.has_seen(ChunkType::PLTE) {
            return Err(unexpected(chunk, ChunkType::PLTE));
        }

        if chunk == ChunkType::PLTE {
            if let Some(&early) = AFTER_PALETTE.iter().find(|&&after| self.has_seen(after)) {
                return Err(unexpected(chunk, early));
            }
        }

        Ok(())
    }

    fn has_seen(&self, chunk: ChunkType) -> bool {
        self.seen.contains(&chunk)
    }
}

fn unexpected(chunk: ChunkType, after: ChunkType) -> crate::error::Error {
    DecodingError::UnexpectedChunk { chunk, after }.into()
}
