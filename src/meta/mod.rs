
//! Describes the structure of a png image:
//! the header, the pixel format, and the palette.

pub mod header;
pub mod format;
pub mod palette;

use crate::error::{ParsingError, Result};
use crate::math::Vec2;
use self::format::Format;
use self::header::Header;
use self::palette::Palette;


/// Which variant of the png format a file follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standard {

    /// The png format as specified.
    Common,

    /// The Apple variant, marked by a `CgBI` chunk before the header.
    /// The image data of these files is not a valid zlib stream for other decoders,
    /// and the pixels are usually stored as premultiplied bgra.
    Ios,
}

impl Default for Standard {
    fn default() -> Self { Standard::Common }
}


/// The pixel format of an image, together with its palette.
/// Indexed formats always have a palette,
/// true color formats may have a suggested palette,
/// and gray formats never have one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorLayout {
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
    Rgb8 {
        /// Suggested colors for displays with fewer colors.
        palette: Option<Palette>
    },

    /// Red, green and blue, 16 bits each.
    Rgb16 {
        /// Suggested colors for displays with fewer colors.
        palette: Option<Palette>
    },

    /// Palette index, 1 bit.
    Indexed1 {
        /// The colors that the pixels refer to.
        palette: Palette
    },

    /// Palette index, 2 bits.
    Indexed2 {
        /// The colors that the pixels refer to.
        palette: Palette
    },

    /// Palette index, 4 bits.
    Indexed4 {
        /// The colors that the pixels refer to.
        palette: Palette
    },

    /// Palette index, 8 bits.
    Indexed8 {
        /// The colors that the pixels refer to.
        palette: Palette
    },

    /// Luminance and alpha, 8 bits each.
    GrayAlpha8,
    /// Luminance and alpha, 16 bits each.
    GrayAlpha16,

    /// Red, green, blue and alpha, 8 bits each.
    Rgba8 {
        /// Suggested colors for displays with fewer colors.
        palette: Option<Palette>
    },

    /// Red, green, blue and alpha, 16 bits each.
    Rgba16 {
        /// Suggested colors for displays with fewer colors.
        palette: Option<Palette>
    },
}

impl ColorLayout {

    /// Combine a format with a palette, checking that the palette is allowed and present where required.
    pub fn new(format: Format, palette: Option<Palette>) -> Result<Self> {
        if let Some(palette) = &palette {
            palette.validate(format)?;
        }

        let required = |palette: Option<Palette>| palette
            .ok_or(ParsingError::MissingPalette(format));

        // formats without color have already rejected any palette
        Ok(match format {
            Format::Gray1 => ColorLayout::Gray1,
            Format::Gray2 => ColorLayout::Gray2,
            Format::Gray4 => ColorLayout::Gray4,
            Format::Gray8 => ColorLayout::Gray8,
            Format::Gray16 => ColorLayout::Gray16,

            Format::Rgb8 => ColorLayout::Rgb8 { palette },
            Format::Rgb16 => ColorLayout::Rgb16 { palette },

            Format::Indexed1 => ColorLayout::Indexed1 { palette: required(palette)? },
            Format::Indexed2 => ColorLayout::Indexed2 { palette: required(palette)? },
            Format::Indexed4 => ColorLayout::Indexed4 { palette: required(palette)? },
            Format::Indexed8 => ColorLayout::Indexed8 { palette: required(palette)? },

            Format::GrayAlpha8 => ColorLayout::GrayAlpha8,
            Format::GrayAlpha16 => ColorLayout::GrayAlpha16,

            Format::Rgba8 => ColorLayout::Rgba8 { palette },
            Format::Rgba16 => ColorLayout::Rgba16 { palette },
        })
    }

    /// The pixel format, without the palette.
    pub fn format(&self) -> Format {
        match self {
            ColorLayout::Gray1 => Format::Gray1,
            ColorLayout::Gray2 => Format::Gray2,
            ColorLayout::Gray4 => Format::Gray4,
            ColorLayout::Gray8 => Format::Gray8,
            ColorLayout::Gray16 => Format::Gray16,
            ColorLayout::Rgb8 { .. } => Format::Rgb8,
            ColorLayout::Rgb16 { .. } => Format::Rgb16,
            ColorLayout::Indexed1 { .. } => Format::Indexed1,
            ColorLayout::Indexed2 { .. } => Format::Indexed2,
            ColorLayout::Indexed4 { .. } => Format::Indexed4,
            ColorLayout::Indexed8 { .. } => Format::Indexed8,
            ColorLayout::GrayAlpha8 => Format::GrayAlpha8,
            ColorLayout::GrayAlpha16 => Format::GrayAlpha16,
            ColorLayout::Rgba8 { .. } => Format::Rgba8,
            ColorLayout::Rgba16 { .. } => Format::Rgba16,
        }
    }

    /// The palette, if any.
    pub fn palette(&self) -> Option<&Palette> {
        match self {
            ColorLayout::Rgb8 { palette } | ColorLayout::Rgb16 { palette }
                | ColorLayout::Rgba8 { palette } | ColorLayout::Rgba16 { palette }
                => palette.as_ref(),

            ColorLayout::Indexed1 { palette } | ColorLayout::Indexed2 { palette }
                | ColorLayout::Indexed4 { palette } | ColorLayout::Indexed8 { palette }
                => Some(palette),

            _ => None,
        }
    }
}


/// Everything about the pixels of an image except their size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {

    /// Pixel format and palette.
    pub color: ColorLayout,

    /// Which variant of png this image follows.
    pub standard: Standard,

    /// Whether the scanlines are ordered in seven passes (Adam7).
    pub interlaced: bool,
}

impl Layout {

    /// Combine a decoded header with the decoded palette, if any.
    pub fn new(header: &Header, palette: Option<Palette>, standard: Standard) -> Result<Self> {
        Ok(Layout {
            color: ColorLayout::new(header.format, palette)?,
            interlaced: header.interlaced,
            standard,
        })
    }

    /// The pixel format, without the palette.
    pub fn format(&self) -> Format { self.color.format() }

    /// The palette, if any.
    pub fn palette(&self) -> Option<&Palette> { self.color.palette() }

    /// The header of an image with this layout and the specified size.
    pub fn header(&self, size: impl Into<Vec2<u32>>) -> Result<Header> {
        Header::new(size, self.format(), self.interlaced)
    }
}
