
//! Extract bit fields at arbitrary bit offsets from a packed byte buffer.
//! Deflate stores most fields starting at the least significant bit,
//! but writes its huffman codes starting at the most significant bit,
//! so both conventions are offered over the same storage.

/// A read-only view of some bytes as a sequence of little-endian 16-bit atoms.
/// Bit `i` of the stream is bit `i % 8` of byte `i / 8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {

    /// Atom `i` contains the bytes `2i` and `2i + 1`.
    /// The last atom is always zero, so that a read at any valid bit offset
    /// may look at the atom after the one containing its first bit.
    atoms: Vec<u16>,

    byte_len: usize,
}

/// An integer type that a bit field can be read as.
pub trait Field: Copy {

    /// Number of bits this type can hold.
    const BITS: u32;

    /// Convert the masked bits to this type.
    fn from_bits(bits: u16) -> Self;
}

macro_rules! implement_field_for_primitive {
    ($kind: ident, $bits: expr) => {
        impl Field for $kind {
            const BITS: u32 = $bits;

            #[inline]
            fn from_bits(bits: u16) -> Self {
                bits as $kind
            }
        }
    };
}

implement_field_for_primitive!(u8, 8);
implement_field_for_primitive!(u16, 16);
implement_field_for_primitive!(u32, 32);
implement_field_for_primitive!(u64, 64);
implement_field_for_primitive!(usize, usize::BITS);

const ATOM_BITS: usize = 16;

impl Bitstream {

    /// Copy the bytes into atoms, padding odd lengths and appending the zero atom.
    pub fn new(bytes: &[u8]) -> Self {
        let mut atoms = Vec::with_capacity(bytes.len() / 2 + 2);

        atoms.extend(bytes.chunks(2).map(|pair| {
            let low = u16::from(pair[0]);
            let high = pair.get(1).copied().map_or(0, u16::from);
            low | (high << 8)
        }));

        atoms.push(0);
        Bitstream { atoms, byte_len: bytes.len() }
    }

    /// Number of bytes this stream was created from.
    pub fn byte_len(&self) -> usize { self.byte_len }

    /// Number of addressable bits.
    pub fn bit_len(&self) -> usize { self.byte_len * 8 }

    /// Whether no bits can be read.
    pub fn is_empty(&self) -> bool { self.byte_len == 0 }

    /// The sixteen bits starting at the offset, least significant first.
    /// Bits past the end of the bytes read as zero.
    #[inline]
    fn window(&self, bit_offset: usize) -> u16 {
        let atom = bit_offset / ATOM_BITS;
        let shift = bit_offset % ATOM_BITS;

        let low = self.atoms[atom] >> shift;

        // shifting a u16 by 16 overflows instead of producing zero
        let high = if shift == 0 { 0 } else { self.atoms[atom + 1] << (ATOM_BITS - shift) };

        low | high
    }

    /// Read `width` bits starting at the bit offset.
    /// The first bit becomes the least significant bit of the result.
    ///
    /// # Panics
    /// If the bit offset is not smaller than `bit_len()`.
    /// In debug builds, also if `width` exceeds 16 or the bit count of `T`.
    #[inline]
    pub fn read<T: Field>(&self, bit_offset: usize, width: u32) -> T {
        debug_assert!(width as usize <= ATOM_BITS, "bit field wider than an atom");
        debug_assert!(width <= T::BITS, "bit field does not fit the requested type");
        assert!(bit_offset < self.bit_len(), "bit offset {} out of bounds", bit_offset);

        let mask = if width as usize >= ATOM_BITS { u16::MAX } else { (1_u16 << width) - 1 };
        T::from_bits(self.window(bit_offset) & mask)
    }

    /// Read sixteen bits starting at the bit offset,
    /// with the bits of each of the two bytes in reverse order.
    /// The first bit becomes the most significant bit of the result,
    /// which is how huffman codes are written.
    ///
    /// # Panics
    /// If the bit offset is not smaller than `bit_len()`.
    #[inline]
    pub fn read_reversed(&self, bit_offset: usize) -> u16 {
        assert!(bit_offset < self.bit_len(), "bit offset {} out of bounds", bit_offset);

        let [first, second] = self.window(bit_offset).to_le_bytes();
        u16::from_be_bytes([first.reverse_bits(), second.reverse_bits()])
    }
}
