//! Damaged and misordered files.
//! These must produce the matching error, and must never panic.

extern crate pngcore;

use std::panic::catch_unwind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pngcore::prelude::*;
use pngcore::chunk::writer::ChunkWriter;
use pngcore::error::{DecodingError, LexingError, ParsingError};

fn valid_file() -> Vec<u8> {
    let palette = Palette::new(vec![[255, 0, 0], [0, 0, 255]], Format::Indexed1).unwrap();
    let layout = Layout {
        color: ColorLayout::Indexed1 { palette },
        standard: Standard::Common,
        interlaced: false,
    };

    let data = (0 .. 16).flat_map(|row| vec![0, row * 7, row * 13]).collect();
    let image = Image::new((16, 16), layout, data).unwrap()
        .with_chunk(Chunk::new(ChunkType::tEXt, &b"Author\0nobody"[..]));

    let mut file = Vec::new();
    WriteOptions { chunk_size: 20, .. WriteOptions::default() }.to_buffered(&image, &mut file).unwrap();
    file
}

fn gray_header() -> Vec<u8> {
    Header::new((2, 2), Format::Gray8, false).unwrap().serialize()
}

fn compressed_gray_data() -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(&[0, 1, 2, 0, 3, 4], 6)
}

fn file(chunks: Vec<(ChunkType, Vec<u8>)>) -> Vec<u8> {
    let mut writer = ChunkWriter::new(Vec::new());
    writer.write_signature().unwrap();

    for (chunk_type, payload) in chunks {
        writer.write_chunk(chunk_type, &payload).unwrap();
    }

    writer.into_inner()
}

fn decode(bytes: &[u8]) -> Result<Image> {
    ReadOptions::default().from_buffered(bytes)
}


#[test]
fn valid_file_is_valid(){
    assert!(decode(&valid_file()).is_ok());
    assert!(ReadOptions::pedantic().from_buffered(valid_file().as_slice()).is_ok());
}

#[test]
fn every_truncation_is_an_error(){
    let file = valid_file();

    for length in 0 .. file.len() {
        let error = decode(&file[.. length]).expect_err("truncated file was accepted");

        match error {
            Error::Lexing(LexingError::TruncatedSignature)
                | Error::Lexing(LexingError::TruncatedChunkHeader)
                | Error::Lexing(LexingError::TruncatedChunkBody { .. }) => {},

            other => panic!("truncated to {} bytes: {:?}", length, other),
        }
    }
}

#[test]
fn every_damaged_byte_is_an_error(){
    let file = valid_file();

    for index in 0 .. file.len() {
        let mut damaged = file.clone();
        damaged[index] ^= 0xFF;

        assert!(decode(&damaged).is_err(), "damaged byte {} was accepted", index);
    }
}

#[test]
fn damaged_checksum(){
    let mut damaged = valid_file();
    let checksum_of_header = 8 + 8 + 13;
    damaged[checksum_of_header] ^= 1;

    match decode(&damaged) {
        Err(Error::Lexing(LexingError::InvalidChunkChecksum { declared, computed })) => {
            assert_eq!(declared ^ computed, 1 << 24);
        },

        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn missing_palette(){
    let header = Header::new((2, 2), Format::Indexed8, false).unwrap().serialize();

    let bytes = file(vec![
        (ChunkType::IHDR, header),
        (ChunkType::IDAT, compressed_gray_data()),
        (ChunkType::IEND, Vec::new()),
    ]);

    assert_eq!(
        decode(&bytes).unwrap_err(),
        Error::Decoding(DecodingError::MissingChunk { chunk: ChunkType::PLTE, before: ChunkType::IDAT })
    );
}

#[test]
fn palette_for_gray_image(){
    let bytes = file(vec![
        (ChunkType::IHDR, gray_header()),
        (ChunkType::PLTE, vec![0; 6]),
        (ChunkType::IDAT, compressed_gray_data()),
        (ChunkType::IEND, Vec::new()),
    ]);

    assert_eq!(
        decode(&bytes).unwrap_err(),
        Error::Parsing(ParsingError::UnexpectedPalette(Format::Gray8))
    );
}

#[test]
fn invalid_header(){
    let mut header = gray_header();
    header[12] = 7;

    let bytes = file(vec![
        (ChunkType::IHDR, header),
        (ChunkType::IDAT, compressed_gray_data()),
        (ChunkType::IEND, Vec::new()),
    ]);

    assert_eq!(
        decode(&bytes).unwrap_err(),
        Error::Parsing(ParsingError::InvalidHeaderInterlacingCode(7))
    );
}

#[test]
fn misordered_chunks(){
    let header_not_first = file(vec![
        (ChunkType::gAMA, vec![0; 4]),
        (ChunkType::IHDR, gray_header()),
    ]);

    assert_eq!(
        decode(&header_not_first).unwrap_err(),
        Error::Decoding(DecodingError::MissingChunk { chunk: ChunkType::IHDR, before: ChunkType::gAMA })
    );

    let split_data = file(vec![
        (ChunkType::IHDR, gray_header()),
        (ChunkType::IDAT, compressed_gray_data()),
        (ChunkType::tEXt, b"a\0b".to_vec()),
        (ChunkType::IDAT, Vec::new()),
        (ChunkType::IEND, Vec::new()),
    ]);

    assert_eq!(
        decode(&split_data).unwrap_err(),
        Error::Decoding(DecodingError::UnexpectedChunk { chunk: ChunkType::IDAT, after: ChunkType::tEXt })
    );

    let duplicate_time = file(vec![
        (ChunkType::IHDR, gray_header()),
        (ChunkType::tIME, vec![0; 7]),
        (ChunkType::IDAT, compressed_gray_data()),
        (ChunkType::tIME, vec![0; 7]),
    ]);

    assert_eq!(
        decode(&duplicate_time).unwrap_err(),
        Error::Decoding(DecodingError::DuplicateChunk(ChunkType::tIME))
    );
}

#[test]
fn late_ancillary_chunk_is_pedantic(){
    let bytes = file(vec![
        (ChunkType::IHDR, gray_header()),
        (ChunkType::IDAT, compressed_gray_data()),
        (ChunkType::gAMA, vec![0; 4]),
        (ChunkType::IEND, Vec::new()),
    ]);

    assert_eq!(decode(&bytes).unwrap().ancillary[0].chunk_type, ChunkType::gAMA);

    assert_eq!(
        ReadOptions::pedantic().from_buffered(bytes.as_slice()).unwrap_err(),
        Error::Decoding(DecodingError::UnexpectedChunk { chunk: ChunkType::gAMA, after: ChunkType::IDAT })
    );
}

#[test]
fn unknown_critical_chunk(){
    let mut unknown = file(vec![ (ChunkType::IHDR, gray_header()) ]);
    unknown.extend_from_slice(&[ 0, 0, 0, 0 ]);
    unknown.extend_from_slice(b"ABCD");
    unknown.extend_from_slice(&[ 0, 0, 0, 0 ]);

    assert_eq!(
        decode(&unknown).unwrap_err(),
        Error::Lexing(LexingError::InvalidChunkTypeCode(u32::from_be_bytes(*b"ABCD")))
    );
}

#[test]
fn random_damage_never_panics(){
    let file = valid_file();
    let mut random = StdRng::seed_from_u64(92_1030);

    for _ in 0 .. 2048 {
        let mut damaged = file.clone();

        for _ in 0 .. random.random_range(1 .. 4) {
            let index = random.random_range(8 .. damaged.len());

            match random.random_range(0 .. 3) {
                0 => damaged[index] = random.random(),
                1 => { damaged.remove(index); },
                _ => damaged.insert(index, random.random()),
            }
        }

        let result = catch_unwind(move || decode(&damaged).map(|_| ()));
        assert!(result.is_ok(), "decoding a damaged file panicked");
    }
}
