//! Save RAM e verificação de integridade.
//! Guarda o buffer BSRAM do jogo carregado e o CRC-16 usado em tudo que
//! vai para o cartão SD.

pub mod crc;
pub mod sram;

// Re-exportações para facilitar o uso
pub use self::crc::{append_trailer, crc16, split_trailer, verify_trailer, TRAILER_LEN};
pub use sram::Bsram;

/// Maior janela de BSRAM que um cartucho pode declarar (SNES: 512 KB)
pub const MAX_BSRAM_KB: usize = 512;

/// Bytes por KB de BSRAM
pub const KB: usize = 1024;

/// Tamanho em bytes de um slot cru de `size_kb` KB
pub const fn slot_bytes(size_kb: usize) -> usize {
    size_kb * KB
}
