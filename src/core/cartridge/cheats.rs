//! Tabela de cheats carregada junto com o jogo.
//!
//! Formato: um código por linha, 16 dígitos hex (8 bytes), que podem ser
//! separados entre bytes por espaço, tab, `:` ou `-`. Linhas iniciadas
//! com `#` ou `;` são comentários. Linha que não forma exatamente 8 bytes
//! é descartada sozinha, sem afetar as vizinhas. Tudo após o 32º código é
//! ignorado.

use crate::core::memory::crc16;
use bytemuck::{Pod, Zeroable};
use log::{debug, warn};

/// Bytes por código
pub const BYTES_PER_CHEAT: usize = 8;
/// Caracteres por código no texto: 2 por byte mais separador ou quebra de linha
pub const CHARS_PER_CHEAT: usize = BYTES_PER_CHEAT * 3;
/// Capacidade da tabela
pub const MAX_CHEATS: usize = 32;
/// Tamanho da tabela cheia entregue ao core
pub const TOTAL_BYTES: usize = MAX_CHEATS * BYTES_PER_CHEAT;

/// Um código binário. O significado dos bytes fica a cargo do core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct CheatEntry([u8; BYTES_PER_CHEAT]);

impl CheatEntry {
    pub const fn from_bytes(bytes: [u8; BYTES_PER_CHEAT]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; BYTES_PER_CHEAT] {
        &self.0
    }

    /// O código como palavra big-endian, primeiro byte nos bits altos
    pub fn word(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

impl std::fmt::Display for CheatEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016X}", self.word())
    }
}

/// Estado do scanner de uma linha
#[derive(Default)]
struct LineScanner {
    bytes: [u8; BYTES_PER_CHEAT],
    count: usize,
    high_nibble: Option<u8>,
    broken: bool,
    comment: bool,
}

impl LineScanner {
    fn is_blank(&self) -> bool {
        self.count == 0 && self.high_nibble.is_none() && !self.broken && !self.comment
    }

    fn feed(&mut self, c: u8) {
        if self.broken || self.comment {
            return;
        }

        if let Some(digit) = (c as char).to_digit(16) {
            let digit = digit as u8;
            match self.high_nibble.take() {
                None if self.count == BYTES_PER_CHEAT => self.broken = true,
                None => self.high_nibble = Some(digit),
                Some(high) => {
                    self.bytes[self.count] = (high << 4) | digit;
                    self.count += 1;
                }
            }
            return;
        }

        match c {
            b'\r' => {}
            // Separador só é válido entre bytes inteiros
            b' ' | b'\t' | b':' | b'-' => {
                if self.high_nibble.is_some() {
                    self.broken = true;
                }
            }
            b'#' | b';' if self.is_blank() => self.comment = true,
            _ => self.broken = true,
        }
    }

    fn finish(&mut self) -> Option<CheatEntry> {
        let done = std::mem::take(self);
        let complete = !done.broken
            && !done.comment
            && done.high_nibble.is_none()
            && done.count == BYTES_PER_CHEAT;
        complete.then(|| CheatEntry(done.bytes))
    }
}

/// Tabela limitada e somente leitura de cheats
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CheatTable {
    entries: [CheatEntry; MAX_CHEATS],
    len: usize,
}

impl CheatTable {
    pub const fn empty() -> Self {
        Self {
            entries: [CheatEntry([0; BYTES_PER_CHEAT]); MAX_CHEATS],
            len: 0,
        }
    }

    /// Interpreta o texto de cheats; nunca falha, linhas ruins são puladas
    pub fn parse(source: &[u8]) -> Self {
        let mut table = Self::empty();
        let mut scanner = LineScanner::default();
        let mut line_no = 1usize;
        let mut discarded = 0usize;

        // Última linha sem quebra também conta
        let chars = source.iter().copied().chain(std::iter::once(b'\n'));

        for (pos, c) in chars.enumerate() {
            if c != b'\n' {
                scanner.feed(c);
                continue;
            }

            let blank = scanner.is_blank() || scanner.comment;
            match scanner.finish() {
                Some(entry) => {
                    table.entries[table.len] = entry;
                    table.len += 1;
                }
                None if !blank => {
                    warn!("Linha de cheat {} inválida, ignorada", line_no);
                    discarded += 1;
                }
                None => {}
            }
            line_no += 1;

            if table.len == MAX_CHEATS {
                let rest = source.get(pos..).unwrap_or_default();
                if rest.iter().any(|b| !b.is_ascii_whitespace()) {
                    debug!("Tabela de cheats cheia, ignorando após a linha {}", line_no - 1);
                }
                break;
            }
        }

        debug!("Tabela de cheats: {} códigos, {} linhas descartadas", table.len, discarded);
        table
    }

    pub fn parse_str(source: &str) -> Self {
        Self::parse(source.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&CheatEntry> {
        self.entries().get(index)
    }

    pub fn entries(&self) -> &[CheatEntry] {
        &self.entries[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheatEntry> {
        self.entries().iter()
    }

    /// Códigos empacotados, `len() * 8` bytes, na ordem do arquivo
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.entries())
    }

    /// CRC-16 dos códigos empacotados, para conferir a cópia do core
    pub fn checksum(&self) -> u16 {
        crc16(self.as_bytes())
    }
}

impl Default for CheatTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for CheatTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries().iter().map(|e| e.to_string())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_line(i: usize) -> String {
        format!("{:016X}", 0x0100_0000_0000_0000u64 * (i as u64 % 0xFF) + i as u64)
    }

    #[test]
    fn test_parse_single_code() {
        let table = CheatTable::parse_str("7E0DBF0063000000\n");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(0).unwrap().bytes(),
            &[0x7E, 0x0D, 0xBF, 0x00, 0x63, 0x00, 0x00, 0x00]
        );
        assert_eq!(table.get(0).unwrap().word(), 0x7E0D_BF00_6300_0000);
    }

    #[test]
    fn test_parse_without_final_newline() {
        let table = CheatTable::parse_str("0011223344556677\n8899aabbccddeeff");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().word(), 0x8899_AABB_CCDD_EEFF);
    }

    #[test]
    fn test_caps_at_32_in_file_order() {
        let source: String = (0..40).map(|i| code_line(i) + "\n").collect();
        let table = CheatTable::parse_str(&source);

        assert_eq!(table.len(), MAX_CHEATS);
        for i in 0..MAX_CHEATS {
            assert_eq!(table.get(i).unwrap().to_string(), code_line(i));
        }
        assert!(table.get(MAX_CHEATS).is_none());
        assert_eq!(table.as_bytes().len(), TOTAL_BYTES);
    }

    #[test]
    fn test_short_line_dropped_without_shift() {
        let source = "001122334455667\n8899AABBCCDDEEFF\n";
        let table = CheatTable::parse_str(source);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().word(), 0x8899_AABB_CCDD_EEFF);
    }

    #[test]
    fn test_long_line_dropped() {
        let table = CheatTable::parse_str("00112233445566778\n0000000000000001\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().word(), 1);
    }

    #[test]
    fn test_bad_character_drops_line_only() {
        let source = "0011zz3344556677\n1111111111111111\n0x11111111111111\n2222222222222222";
        let table = CheatTable::parse_str(source);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().word(), 0x1111_1111_1111_1111);
        assert_eq!(table.get(1).unwrap().word(), 0x2222_2222_2222_2222);
    }

    #[test]
    fn test_separators_and_crlf() {
        let source = "00 11 22 33 44 55 66 77\r\n88:99:AA:BB:CC:DD:EE:FF\r\n01-02-03-04-05-06-07-08\r\n";
        let table = CheatTable::parse_str(source);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1).unwrap().word(), 0x8899_AABB_CCDD_EEFF);
        assert_eq!(table.get(2).unwrap().word(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_separator_inside_byte_breaks_line() {
        let table = CheatTable::parse_str("0 011223344556677\n");
        assert!(table.is_empty());
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let source = "# vidas infinitas\n\n; zelda\n0011223344556677\n\n\n";
        let table = CheatTable::parse_str(source);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_source() {
        let table = CheatTable::parse(&[]);
        assert!(table.is_empty());
        assert!(table.as_bytes().is_empty());
        assert_eq!(table.checksum(), 0);
    }

    #[test]
    fn test_binary_garbage_never_panics() {
        let garbage: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let table = CheatTable::parse(&garbage);
        assert!(table.len() <= MAX_CHEATS);
    }

    #[test]
    fn test_checksum_tracks_content() {
        let a = CheatTable::parse_str("0011223344556677\n");
        let b = CheatTable::parse_str("0011223344556678\n");
        assert_eq!(a.checksum(), crc16(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77]));
        assert_ne!(a.checksum(), b.checksum());
    }
}
