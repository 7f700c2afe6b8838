
//! The contents of the `PLTE` chunk.

use crate::error::{ParsingError, Result, UnitResult};
use crate::meta::format::Format;


/// An ordered table of red, green and blue entries.
/// Indexed images refer to these entries by index,
/// other color images may carry one as a suggestion for limited displays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {

    /// Create a palette for the specified format, checking the number of entries.
    pub fn new(entries: Vec<[u8; 3]>, format: Format) -> Result<Self> {
        validate_entry_count(entries.len(), format)?;
        Ok(Palette { entries })
    }

    /// Decode and validate the payload of a palette chunk.
    pub fn parse(payload: &[u8], format: Format) -> Result<Self> {
        if !format.has_color() {
            return Err(ParsingError::UnexpectedPalette(format).into());
        }

        if payload.len() % 3 != 0 {
            return Err(ParsingError::InvalidPaletteSampleCount(payload.len()).into());
        }

        let entries: Vec<[u8; 3]> = payload.chunks_exact(3)
            .map(|rgb| [ rgb[0], rgb[1], rgb[2] ])
            .collect();

        Palette::new(entries, format)
    }

    /// Check whether this palette could be stored for the specified format.
    pub fn validate(&self, format: Format) -> UnitResult {
        validate_entry_count(self.entries.len(), format)
    }

    /// The payload of the palette chunk.
    pub fn serialize(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|rgb| rgb.iter().copied()).collect()
    }

    /// The entries in order.
    pub fn entries(&self) -> &[[u8; 3]] { &self.entries }

    /// Number of entries. Never zero.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Always false, as an empty palette cannot be constructed.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Iterate the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, [u8; 3]> { self.entries.iter() }
}

impl<'p> IntoIterator for &'p Palette {
    type Item = &'p [u8; 3];
    type IntoIter = std::slice::Iter<'p, [u8; 3]>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

fn validate_entry_count(count: usize, format: Format) -> UnitResult {
    if !format.has_color() {
        return Err(ParsingError::UnexpectedPalette(format).into());
    }

    let max = format.max_palette_entries();
    if count == 0 || count > max {
        return Err(ParsingError::InvalidPaletteEntryCount { count, max }.into());
    }

    Ok(())
}
