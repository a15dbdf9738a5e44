use std::io::{self, Read, Write};

/// Delimits sections of the binary CSRRG format, written little-endian.
pub const SECTION_SENTINEL: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Writes `value` as a variable-length integer: 7 payload bits per byte,
/// least-significant group first, high bit set on every byte but the last.
pub fn encode_vbyte<W: Write>(writer: &mut W, mut value: u64) -> io::Result<()> {
    while value >= 0x80 {
        writer.write_all(&[(value as u8 & 0x7F) | 0x80])?;
        value >>= 7;
    }
    writer.write_all(&[value as u8])
}

/// Reads one vbyte-encoded integer from `reader`.
pub fn decode_vbyte<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        value |= u64::from(byte[0] & 0x7F) << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

pub(crate) fn write_sentinel<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(&SECTION_SENTINEL.to_le_bytes())
}
