//! CRC-8 (polynomial x^8 + x^2 + x + 1, init 0x00) over UTF-8 bytes.
//!
//! Guards redemption codes against typos and corruption. It is not a
//! security boundary: anyone can compute a valid checksum.

const POLYNOMIAL: u8 = 0x07;

static TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Raw CRC-8 of `data`.
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, byte| TABLE[(crc ^ byte) as usize])
}

/// Checksum of `data` as two uppercase hex digits.
pub fn checksum(data: &str) -> String {
    format!("{:02X}", crc8(data.as_bytes()))
}

/// Case-insensitive comparison against the recomputed checksum.
pub fn verify(data: &str, claimed: &str) -> bool {
    checksum(data).eq_ignore_ascii_case(claimed)
}
