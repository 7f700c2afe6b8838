
//! Read and write the binary structure of png files.
//!
//! - `chunk` splits a file into checksummed chunks, and formats them again
//! - `compression` streams the image data through the zlib engine, fragment by fragment
//! - `meta` decodes the header and the palette
//! - `image` combines these into a decoder and an encoder of whole files
//!
//! The image data is exposed as the decompressed, still filtered scanline stream.
//! Reconstructing the samples from the scanlines is left to other crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]


pub mod io;
pub mod math;
pub mod crc;
pub mod bits;
pub mod chunk;
pub mod compression;
pub mod meta;
pub mod image;
pub mod error;


/// Export the most important items from `pngcore`.
/// _Note: This includes a type called `Result`, possibly overwriting the default `std::Result` type usage._
pub mod prelude {

    // main exports
    pub use crate::image::{Image, ReadOptions, WriteOptions, Decoder, Encoder};

    // core data types
    pub use crate::chunk::{Chunk, ChunkType};
    pub use crate::meta::{Layout, ColorLayout, Standard};
    pub use crate::meta::header::Header;
    pub use crate::meta::format::Format;
    pub use crate::meta::palette::Palette;
    pub use crate::compression::Level;
    pub use crate::math::Vec2;

    // secondary data types
    pub use crate::meta;
    pub use crate::error::{Result, Error};
}
