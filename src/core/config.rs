//! Parâmetros do firmware.

use std::time::Duration;

/// Formato do slot de save no cartão
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotFormat {
    /// Só os bytes da BSRAM, `size_kb * 1024` bytes
    Raw,
    /// Bytes crus seguidos do trailer CRC-16 big-endian
    #[default]
    Checksummed,
}

/// Configuração compartilhada pelo save store, autosave e carregador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareConfig {
    /// Tempo mínimo entre dois commits do autosave
    pub autosave_interval: Duration,
    /// Formato usado na gravação (a leitura aceita os dois)
    pub slot_format: SlotFormat,
    /// Extensão do arquivo de save, sem o ponto
    pub save_extension: String,
    /// Extensão do arquivo de cheats, sem o ponto
    pub cheat_extension: String,
    /// Estado inicial da chave de cheats por jogo
    pub cheats_enabled: bool,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(10),
            slot_format: SlotFormat::Checksummed,
            save_extension: "srm".to_string(),
            cheat_extension: "cht".to_string(),
            cheats_enabled: true,
        }
    }
}

impl FirmwareConfig {
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    pub fn with_slot_format(mut self, format: SlotFormat) -> Self {
        self.slot_format = format;
        self
    }

    pub fn with_save_extension(mut self, ext: impl Into<String>) -> Self {
        self.save_extension = ext.into();
        self
    }

    pub fn with_cheat_extension(mut self, ext: impl Into<String>) -> Self {
        self.cheat_extension = ext.into();
        self
    }

    pub fn with_cheats_enabled(mut self, enabled: bool) -> Self {
        self.cheats_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FirmwareConfig::default();
        assert_eq!(config.autosave_interval, Duration::from_secs(10));
        assert_eq!(config.slot_format, SlotFormat::Checksummed);
        assert_eq!(config.save_extension, "srm");
        assert_eq!(config.cheat_extension, "cht");
        assert!(config.cheats_enabled);
    }

    #[test]
    fn test_builder() {
        let config = FirmwareConfig::default()
            .with_slot_format(SlotFormat::Raw)
            .with_autosave_interval(Duration::from_secs(3))
            .with_save_extension("sav")
            .with_cheats_enabled(false);
        assert_eq!(config.slot_format, SlotFormat::Raw);
        assert_eq!(config.autosave_interval, Duration::from_secs(3));
        assert_eq!(config.save_extension, "sav");
        assert!(!config.cheats_enabled);
    }
}
