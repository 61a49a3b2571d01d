//! Save RAM com bateria (BSRAM) do jogo carregado.
//! O core de emulação escreve aqui à vontade; o save store só lê no commit
//! e preenche uma vez no carregamento.

use super::{slot_bytes, KB};
use log::debug;

/// Buffer BSRAM com flag de sujeira
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bsram {
    data: Vec<u8>,
    dirty: bool,
}

impl Bsram {
    /// Cria um buffer zerado de `size_kb` KB
    pub fn new(size_kb: usize) -> Self {
        Self {
            data: vec![0; slot_bytes(size_kb)],
            dirty: false,
        }
    }

    /// Envolve o conteúdo lido do cartão; começa limpo
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, dirty: false }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Tamanho em KB inteiros
    pub fn size_kb(&self) -> usize {
        self.data.len() / KB
    }

    /// Lê um byte, espelhado no tamanho do buffer como no barramento
    pub fn read_byte(&self, addr: u32) -> u8 {
        if self.data.is_empty() {
            return 0xFF;
        }
        self.data[addr as usize % self.data.len()]
    }

    /// Escreve um byte (espelhado) e marca como suja
    pub fn write_byte(&mut self, addr: u32, value: u8) {
        if self.data.is_empty() {
            return;
        }
        let addr = addr as usize % self.data.len();
        if self.data[addr] != value {
            self.data[addr] = value;
            self.dirty = true;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Acesso mutável em bloco; sempre marca como suja
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.dirty = true;
        &mut self.data
    }

    /// Houve escrita desde o último commit bem-sucedido?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Chamado pelo agendador após um commit bem-sucedido
    pub fn mark_clean(&mut self) {
        if self.dirty {
            debug!("BSRAM limpa ({} bytes gravados)", self.data.len());
        }
        self.dirty = false;
    }
}
