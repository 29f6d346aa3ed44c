/// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, MSB first, no final XOR.
pub fn crc16(buf: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &b in buf {
        crc ^= u16::from(b) << 8;

        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// Checksum of the UTF-8 bytes of `data`, as 4 uppercase hex digits.
pub fn calculate_crc16(data: &str) -> String {
    hex::encode_upper(crc16(data.as_bytes()).to_be_bytes())
}

pub fn parse_crc(s: &str) -> Option<u16> {
    if s.len() != 4 {
        return None;
    }

    let bytes = hex::decode(s).ok()?;

    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
