
//! The CRC-32 checksum that protects the type code and payload of every chunk.
//! Uses the reflected polynomial `0xEDB88320`, as specified by ISO 3309 and png.

const POLYNOMIAL: u32 = 0xEDB8_8320;

/// One entry for every possible byte value, computed at compile time.
static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut index = 0;

    while index < 256 {
        let mut value = index as u32;
        let mut bit = 0;

        while bit < 8 {
            value = if value & 1 == 1 { POLYNOMIAL ^ (value >> 1) } else { value >> 1 };
            bit += 1;
        }

        table[index] = value;
        index += 1;
    }

    table
}

/// Compute the checksum of the bytes.
#[inline]
pub fn compute(bytes: &[u8]) -> u32 {
    update(0, bytes)
}

/// Continue a checksum with more bytes.
/// `update(compute(a), b)` equals the checksum of `a` followed by `b`,
/// which allows summing a chunk type and its payload without joining them.
pub fn update(checksum: u32, bytes: &[u8]) -> u32 {
    let register = bytes.iter().fold(!checksum, |register, &byte| {
        TABLE[((register ^ u32::from(byte)) & 0xff) as usize] ^ (register >> 8)
    });

    !register
}
