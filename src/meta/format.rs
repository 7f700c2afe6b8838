
//! The fifteen combinations of bit depth and color type that png allows.

use crate::error::{ParsingError, Result};


/// The color type codes stored in the header.
pub mod color_type {

    /// One luminance sample.
    pub const GRAY: u8 = 0;

    /// Red, green and blue samples.
    pub const RGB: u8 = 2;

    /// One palette index.
    pub const INDEXED: u8 = 3;

    /// Luminance and alpha samples.
    pub const GRAY_ALPHA: u8 = 4;

    /// Red, green, blue and alpha samples.
    pub const RGBA: u8 = 6;
}


/// How the pixels of an image are stored.
/// The number in each name is the bit depth of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Luminance, 1 bit.
    Gray1,
    /// Luminance, 2 bits.
    Gray2,
    /// Luminance, 4 bits.
    Gray4,
    /// Luminance, 8 bits.
    Gray8,
    /// Luminance, 16 bits.
    Gray16,

    /// Red, green and blue, 8 bits each.
    Rgb8,
    /// Red, green and blue, 16 bits each.
    Rgb16,

    /// Palette index, 1 bit.
    Indexed1,
    /// Palette index, 2 bits.
    Indexed2,
    /// Palette index, 4 bits.
    Indexed4,
    /// Palette index, 8 bits.
    Indexed8,

    /// Luminance and alpha, 8 bits each.
    GrayAlpha8,
    /// Luminance and alpha, 16 bits each.
    GrayAlpha16,

    /// Red, green, blue and alpha, 8 bits each.
    Rgba8,
    /// Red, green, blue and alpha, 16 bits each.
    Rgba16,
}

impl Format {

    /// All formats, in the order of their color codes.
    pub const ALL: [Format; 15] = [
        Format::Gray1, Format::Gray2, Format::Gray4, Format::Gray8, Format::Gray16,
        Format::Rgb8, Format::Rgb16,
        Format::Indexed1, Format::Indexed2, Format::Indexed4, Format::Indexed8,
        Format::GrayAlpha8, Format::GrayAlpha16,
        Format::Rgba8, Format::Rgba16,
    ];

    /// Look up the bit depth and color type pair of a header.
    pub fn from_color_code(depth: u8, color_type: u8) -> Result<Self> {
        use self::color_type::*;

        Ok(match (depth, color_type) {
            (1, GRAY) => Format::Gray1,
            (2, GRAY) => Format::Gray2,
            (4, GRAY) => Format::Gray4,
            (8, GRAY) => Format::Gray8,
            (16, GRAY) => Format::Gray16,

            (8, RGB) => Format::Rgb8,
            (16, RGB) => Format::Rgb16,

            (1, INDEXED) => Format::Indexed1,
            (2, INDEXED) => Format::Indexed2,
            (4, INDEXED) => Format::Indexed4,
            (8, INDEXED) => Format::Indexed8,

            (8, GRAY_ALPHA) => Format::GrayAlpha8,
            (16, GRAY_ALPHA) => Format::GrayAlpha16,

            (8, RGBA) => Format::Rgba8,
            (16, RGBA) => Format::Rgba16,

            _ => return Err(ParsingError::InvalidHeaderColorCode { depth, color_type }.into()),
        })
    }

    /// The bit depth and color type pair that the header stores for this format.
    pub fn color_code(self) -> (u8, u8) {
        (self.bit_depth(), self.color_type())
    }

    /// The color type code of this format.
    pub fn color_type(self) -> u8 {
        use self::color_type::*;

        match self {
            Format::Gray1 | Format::Gray2 | Format::Gray4 | Format::Gray8 | Format::Gray16 => GRAY,
            Format::Rgb8 | Format::Rgb16 => RGB,
            Format::Indexed1 | Format::Indexed2 | Format::Indexed4 | Format::Indexed8 => INDEXED,
            Format::GrayAlpha8 | Format::GrayAlpha16 => GRAY_ALPHA,
            Format::Rgba8 | Format::Rgba16 => RGBA,
        }
    }

    /// Bits per sample. For indexed formats, bits per palette index.
    pub fn bit_depth(self) -> u8 {
        match self {
            Format::Gray1 | Format::Indexed1 => 1,
            Format::Gray2 | Format::Indexed2 => 2,
            Format::Gray4 | Format::Indexed4 => 4,

            Format::Gray8 | Format::Rgb8 | Format::Indexed8
                | Format::GrayAlpha8 | Format::Rgba8 => 8,

            Format::Gray16 | Format::Rgb16 | Format::GrayAlpha16 | Format::Rgba16 => 16,
        }
    }

    /// Whether pixels have a hue, and a palette therefore makes sense.
    pub fn has_color(self) -> bool {
        match self.color_type() {
            color_type::RGB | color_type::INDEXED | color_type::RGBA => true,
            _ => false,
        }
    }

    /// Whether pixels are palette indices.
    pub fn is_indexed(self) -> bool {
        self.color_type() == color_type::INDEXED
    }

    /// Whether pixels contain an alpha sample.
    pub fn has_alpha(self) -> bool {
        match self.color_type() {
            color_type::GRAY_ALPHA | color_type::RGBA => true,
            _ => false,
        }
    }

    /// Number of samples per pixel.
    pub fn channel_count(self) -> usize {
        match self.color_type() {
            color_type::RGB => 3,
            color_type::GRAY_ALPHA => 2,
            color_type::RGBA => 4,
            _ => 1,
        }
    }

    /// Number of bits per pixel. May be less than a byte.
    pub fn bits_per_pixel(self) -> usize {
        self.channel_count() * usize::from(self.bit_depth())
    }

    /// Number of palette entries that the bit depth can address.
    /// A palette never has more than 256 entries, even for 16 bit samples.
    pub fn max_palette_entries(self) -> usize {
        1 << self.bit_depth().min(8)
    }
}
