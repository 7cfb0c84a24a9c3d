//! Bit-level helpers shared by the framer and the codecs.

use bitvec::prelude::*;

/// Owned bitstream, MSB-first within each byte.
pub type Bits = BitVec<u8, Msb0>;

/// Borrowed bitstream.
pub type BitStr = BitSlice<u8, Msb0>;

/// Expand bytes into bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> Bits {
    Bits::from_slice(bytes)
}

/// Pack bits into bytes. A trailing partial byte is dropped.
pub fn bits_to_bytes(bits: &BitStr) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|byte| read_uint(byte) as u8)
        .collect()
}

/// Interpret up to 64 bits as an unsigned integer, first bit most significant.
pub fn read_uint(bits: &BitStr) -> u64 {
    bits.iter()
        .by_vals()
        .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit))
}

/// Append the low `width` bits of `value`, most significant first.
pub fn push_uint(bits: &mut Bits, value: u64, width: u32) {
    for shift in (0..width).rev() {
        bits.push((value >> shift) & 1 == 1);
    }
}

/// Read `width` bits starting at `offset` as an integer, right-padding with
/// zeros past the end of the stream.
pub fn chunk_at(bits: &BitStr, offset: usize, width: u32) -> u64 {
    let end = (offset + width as usize).min(bits.len());
    let start = offset.min(end);
    let taken = end - start;
    if taken == 0 {
        return 0;
    }
    let value = read_uint(&bits[start..end]);
    value << (width as usize - taken)
}

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &BitStr, needle: &BitStr) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_bits_roundtrip() {
        let bytes = vec![0b1011_0010, 0x00, 0xFF, 0x5A];
        let bits = bytes_to_bits(&bytes);
        assert_eq!(bits.len(), 32);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert_eq!(bits_to_bytes(&bits), bytes);
    }

    #[test]
    fn test_partial_byte_dropped() {
        let mut bits = bytes_to_bits(&[0xAB]);
        bits.push(true);
        bits.push(false);
        assert_eq!(bits_to_bytes(&bits), vec![0xAB]);
    }

    #[test]
    fn test_push_and_read_uint() {
        let mut bits = Bits::new();
        push_uint(&mut bits, 0b101, 3);
        push_uint(&mut bits, 300, 16);
        assert_eq!(read_uint(&bits[..3]), 0b101);
        assert_eq!(read_uint(&bits[3..]), 300);
    }

    #[test]
    fn test_chunk_at_pads_tail() {
        let bits = bytes_to_bits(&[0b1100_0000]);
        assert_eq!(chunk_at(&bits, 0, 3), 0b110);
        // Last bit plus two zero pad bits.
        assert_eq!(chunk_at(&bits, 7, 3), 0b000);
        assert_eq!(chunk_at(&bits, 1, 2), 0b10);
        assert_eq!(chunk_at(&bits, 8, 4), 0);
    }

    #[test]
    fn test_find() {
        let haystack = bytes_to_bits(b"abc###END###");
        let needle = bytes_to_bits(b"###END###");
        assert_eq!(find(&haystack, &needle), Some(24));
        assert_eq!(find(&needle, &haystack), None);
    }
}
