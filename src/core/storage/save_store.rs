//! Slots de save: um arquivo por jogo com a sua BSRAM.
//!
//! O slot é cru (`size_kb * 1024` bytes) ou cru seguido do trailer CRC-16
//! big-endian. A leitura aceita as duas formas; a gravação usa o
//! [`SlotFormat`] configurado. Toda gravação substitui o arquivo inteiro,
//! então uma escrita interrompida aparece como tamanho ou checksum errado
//! no próximo carregamento e nunca é aceita.

use super::{Storage, StorageError};
use crate::core::config::{FirmwareConfig, SlotFormat};
use crate::core::memory::{crc, slot_bytes, Bsram, MAX_BSRAM_KB};
use bitflags::bitflags;
use log::{debug, info, warn};
use std::path::Path;

bitflags! {
    /// O que aconteceu ao carregar o slot
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SlotFlags: u8 {
        /// Slot ausente, criado zerado
        const CREATED     = 1 << 0;
        /// Slot gravado sem trailer
        const RAW         = 1 << 1;
        /// Trailer presente e verificado
        const CHECKSUMMED = 1 << 2;
        /// Criado em memória, ainda não gravado no cartão
        const UNSAVED     = 1 << 3;
    }
}

/// Motivo da rejeição de um slot existente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptKind {
    /// Tamanho não bate com nenhuma das formas
    Length { expected: usize, actual: usize },
    /// Trailer não confere com o conteúdo
    Checksum { stored: u16, computed: u16 },
    /// Tamanho de BSRAM acima do que qualquer cartucho usa
    Size { requested_kb: usize },
}

impl std::fmt::Display for CorruptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorruptKind::Length { expected, actual } => {
                write!(f, "tamanho {} (esperado {} ou {})", actual, expected, expected + crc::TRAILER_LEN)
            }
            CorruptKind::Checksum { stored, computed } => {
                write!(f, "checksum {:04X} (calculado {:04X})", stored, computed)
            }
            CorruptKind::Size { requested_kb } => {
                write!(f, "BSRAM de {} KB acima do limite de {} KB", requested_kb, MAX_BSRAM_KB)
            }
        }
    }
}

/// Erros do slot de save
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("slot de save corrompido: {0}")]
    Corrupt(CorruptKind),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Resultado de um carregamento bem-sucedido
#[derive(Debug, Clone)]
pub struct LoadedSlot {
    pub bsram: Bsram,
    pub flags: SlotFlags,
}

/// Valida a imagem do slot e devolve o conteúdo da BSRAM
pub fn decode_slot(data: &[u8], size_kb: usize) -> Result<(Vec<u8>, SlotFlags), CorruptKind> {
    let expected = slot_bytes(size_kb);

    if data.len() == expected {
        return Ok((data.to_vec(), SlotFlags::RAW));
    }

    if data.len() == expected + crc::TRAILER_LEN {
        if let Some((payload, stored)) = crc::split_trailer(data) {
            let computed = crc::crc16(payload);
            if computed != stored {
                return Err(CorruptKind::Checksum { stored, computed });
            }
            return Ok((payload.to_vec(), SlotFlags::CHECKSUMMED));
        }
    }

    Err(CorruptKind::Length {
        expected,
        actual: data.len(),
    })
}

/// Monta a imagem do slot, ajustada para exatamente `size_kb` KB
pub fn encode_slot(content: &[u8], size_kb: usize, format: SlotFormat) -> Vec<u8> {
    let size = slot_bytes(size_kb);
    let mut image = Vec::with_capacity(size + crc::TRAILER_LEN);
    image.extend_from_slice(&content[..content.len().min(size)]);
    image.resize(size, 0);

    if format == SlotFormat::Checksummed {
        crc::append_trailer(&mut image);
    }
    image
}

/// Liga cada jogo ao seu slot num [`Storage`]
pub struct SaveStore<S: Storage> {
    storage: S,
    format: SlotFormat,
    save_extension: String,
}

impl<S: Storage> SaveStore<S> {
    pub fn new(storage: S, config: &FirmwareConfig) -> Self {
        Self {
            storage,
            format: config.slot_format,
            save_extension: config.save_extension.clone(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn format(&self) -> SlotFormat {
        self.format
    }

    /// Nome do slot de uma ROM: o nome sem extensão mais a extensão de save
    pub fn slot_name(&self, game: &str) -> String {
        companion_name(game, &self.save_extension)
    }

    /// Carrega o slot `name`, criando zerado se não existir
    pub fn load(&mut self, name: &str, size_kb: usize) -> Result<LoadedSlot, SlotError> {
        if size_kb > MAX_BSRAM_KB {
            return Err(SlotError::Corrupt(CorruptKind::Size { requested_kb: size_kb }));
        }

        // Cartucho sem bateria
        if size_kb == 0 {
            debug!("{}: sem BSRAM, slot ignorado", name);
            return Ok(LoadedSlot {
                bsram: Bsram::new(0),
                flags: SlotFlags::empty(),
            });
        }

        match self.storage.read(name)? {
            Some(data) => match decode_slot(&data, size_kb) {
                Ok((content, flags)) => {
                    info!("Slot {} carregado: {} KB ({:?})", name, size_kb, flags);
                    Ok(LoadedSlot {
                        bsram: Bsram::from_vec(content),
                        flags,
                    })
                }
                Err(kind) => {
                    warn!("Slot {} rejeitado: {}", name, kind);
                    Err(SlotError::Corrupt(kind))
                }
            },
            None => {
                let mut bsram = Bsram::new(size_kb);
                let image = encode_slot(bsram.as_slice(), size_kb, self.format);

                let flags = match self.storage.write(name, &image) {
                    Ok(()) => {
                        info!("Slot {} criado: {} KB", name, size_kb);
                        SlotFlags::CREATED
                    }
                    Err(e) => {
                        // Segue em frente; o autosave tenta de novo
                        warn!("Falha ao criar slot {}: {}", name, e);
                        bsram.mark_dirty();
                        SlotFlags::CREATED | SlotFlags::UNSAVED
                    }
                };
                Ok(LoadedSlot { bsram, flags })
            }
        }
    }

    /// Sobrescreve o slot `name` com a BSRAM.
    ///
    /// Erros: `Corrupt(Size)` para tamanho acima do limite, `Storage` se a escrita falhar
    pub fn save(&mut self, name: &str, size_kb: usize, bsram: &Bsram) -> Result<(), SlotError> {
        if size_kb > MAX_BSRAM_KB {
            return Err(SlotError::Corrupt(CorruptKind::Size { requested_kb: size_kb }));
        }
        if size_kb == 0 {
            return Ok(());
        }

        if bsram.len() != slot_bytes(size_kb) {
            debug!("{}: ajustando {} bytes num slot de {} KB", name, bsram.len(), size_kb);
        }

        let image = encode_slot(bsram.as_slice(), size_kb, self.format);
        self.storage.write(name, &image)?;
        info!("Slot {} salvo ({} bytes)", name, image.len());
        Ok(())
    }
}

/// `<nome da ROM sem extensão>.<ext>`
pub fn companion_name(game: &str, extension: &str) -> String {
    let stem = Path::new(game)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(game);
    format!("{}.{}", stem, extension)
}
