//! CRC-16 dos slots de save e da tabela de cheats.
//!
//! Polinômio 0x8005, registrador inicial 0x0000, sem reflexão e sem XOR
//! final (CRC-16/BUYPASS, `CRC_16_UMTS` no catálogo do crate `crc`).
//! O trailer é gravado em big-endian logo após os dados.

use ::crc::{Crc, CRC_16_UMTS};

/// Polinômio gerador
pub const CRC16_POLY: u16 = 0x8005;

/// Valor inicial do registrador
pub const CRC16_INIT: u16 = 0x0000;

/// Tamanho do trailer em bytes
pub const TRAILER_LEN: usize = 2;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_UMTS);

/// Calcula o CRC-16 de `data`
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Anexa o CRC (big-endian) do conteúdo atual
pub fn append_trailer(buf: &mut Vec<u8>) {
    let crc = crc16(buf);
    buf.extend_from_slice(&crc.to_be_bytes());
}

/// Separa `buf` em dados e trailer gravado
pub fn split_trailer(buf: &[u8]) -> Option<(&[u8], u16)> {
    if buf.len() < TRAILER_LEN {
        return None;
    }
    let (payload, trailer) = buf.split_at(buf.len() - TRAILER_LEN);
    Some((payload, u16::from_be_bytes([trailer[0], trailer[1]])))
}

/// Verifica se o trailer confere com os dados à sua frente
pub fn verify_trailer(buf: &[u8]) -> bool {
    match split_trailer(buf) {
        Some((payload, stored)) => crc16(payload) == stored,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16(b"123456789"), 0xFEE8);
    }

    #[test]
    fn test_crc16_empty_is_init() {
        assert_eq!(crc16(&[]), CRC16_INIT);
    }

    #[test]
    fn test_crc16_deterministic() {
        let data: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let first = crc16(&data);
        assert_eq!(crc16(&data), first);
        assert_eq!(crc16(&data), first);
    }

    #[test]
    fn test_crc16_matches_bitwise() {
        // Registrador de deslocamento, bit a bit
        fn slow(data: &[u8]) -> u16 {
            let mut crc = CRC16_INIT;
            for &byte in data {
                crc ^= (byte as u16) << 8;
                for _ in 0..8 {
                    crc = if crc & 0x8000 != 0 { (crc << 1) ^ CRC16_POLY } else { crc << 1 };
                }
            }
            crc
        }

        let data = b"SUPER MARIOWORLD\x00\x01\x02\xFF\x80";
        assert_eq!(crc16(data), slow(data));
        assert_eq!(crc16(&[0u8; 2048]), slow(&[0u8; 2048]));
    }

    #[test]
    fn test_trailer_round_trip() {
        let mut buf = vec![0x12, 0x34, 0x56, 0x78, 0x9A];
        append_trailer(&mut buf);
        assert_eq!(buf.len(), 7);
        assert!(verify_trailer(&buf));
        // Sem reflexão nem XOR final o resíduo é zero
        assert_eq!(crc16(&buf), 0);
    }

    #[test]
    fn test_trailer_detects_flip() {
        let mut buf = vec![0u8; 1024];
        append_trailer(&mut buf);
        buf[100] ^= 0x01;
        assert!(!verify_trailer(&buf));
    }

    #[test]
    fn test_split_trailer_short_input() {
        assert!(split_trailer(&[0xAB]).is_none());
        assert!(!verify_trailer(&[]));
    }
}
