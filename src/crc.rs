//! CRC-32 as used by PNG chunks (ISO 3309 / zlib, reflected polynomial `0xEDB88320`)
//!
//! The lookup table is built at compile time. [`update`] works on the raw
//! register so callers can feed several byte slices (chunk type, then chunk
//! data) without concatenating them first.

/// Reflected CRC-32 polynomial
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Initial register value, also the final XOR mask
pub const INIT: u32 = 0xFFFF_FFFF;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            if c & 1 != 0 {
                c = POLYNOMIAL ^ (c >> 1);
            } else {
                c >>= 1;
            }
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Feed `bytes` into a running CRC register
///
/// Start from [`INIT`] and XOR the final register with [`INIT`] to get the
/// checksum, or use [`crc32`] / [`chunk_crc`].
pub fn update(register: u32, bytes: &[u8]) -> u32 {
    bytes.iter().fold(register, |crc, &b| {
        TABLE[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// CRC-32 of a single byte slice
pub fn crc32(bytes: &[u8]) -> u32 {
    update(INIT, bytes) ^ INIT
}

/// CRC-32 of a PNG chunk: computed over the type followed by the data
pub fn chunk_crc(chunk_type: &[u8], data: &[u8]) -> u32 {
    update(update(INIT, chunk_type), data) ^ INIT
}
