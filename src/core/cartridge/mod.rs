//! Dados do cartucho que a persistência precisa do carregador de ROM:
//! qual jogo foi escolhido, em qual core roda e quanta RAM com bateria
//! declara. Também abriga a tabela de cheats do jogo.

pub mod cheats;

pub use cheats::{CheatEntry, CheatTable, MAX_CHEATS};

/// Índice da ROM na listagem do cartão, como escolhido no menu
pub type RomId = usize;

/// Core de emulação da ROM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Console {
    Nes,
    Snes,
}

impl std::fmt::Display for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Console::Nes => write!(f, "NES"),
            Console::Snes => write!(f, "SNES"),
        }
    }
}

/// ROM resolvida
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomInfo {
    /// Nome do arquivo da ROM no cartão
    pub name: String,
    pub console: Console,
    /// RAM com bateria declarada em KB; 0 para cartuchos sem bateria
    pub bsram_kb: usize,
}

impl RomInfo {
    pub fn new(name: impl Into<String>, console: Console, bsram_kb: usize) -> Self {
        Self {
            name: name.into(),
            console,
            bsram_kb,
        }
    }

    pub fn has_battery(&self) -> bool {
        self.bsram_kb > 0
    }
}

/// Colaborador de carregamento de ROM
pub trait RomCatalog {
    /// Resolve a escolha do menu; `None` se o arquivo sumiu
    fn resolve(&self, rom: RomId) -> Option<RomInfo>;
}

/// Catálogo sobre uma listagem fixa
#[derive(Debug, Clone, Default)]
pub struct RomList {
    roms: Vec<RomInfo>,
}

impl RomList {
    pub fn new(roms: Vec<RomInfo>) -> Self {
        Self { roms }
    }

    pub fn push(&mut self, rom: RomInfo) -> RomId {
        self.roms.push(rom);
        self.roms.len() - 1
    }

    pub fn len(&self) -> usize {
        self.roms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roms.is_empty()
    }
}

impl RomCatalog for RomList {
    fn resolve(&self, rom: RomId) -> Option<RomInfo> {
        self.roms.get(rom).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_list_resolve() {
        let mut list = RomList::default();
        let id = list.push(RomInfo::new("Zelda.sfc", Console::Snes, 8));
        assert_eq!(id, 0);
        assert_eq!(list.resolve(0).unwrap().bsram_kb, 8);
        assert!(list.resolve(1).is_none());
    }

    #[test]
    fn test_has_battery() {
        assert!(!RomInfo::new("Mario.nes", Console::Nes, 0).has_battery());
        assert!(RomInfo::new("Zelda.nes", Console::Nes, 8).has_battery());
        assert_eq!(Console::Snes.to_string(), "SNES");
    }
}
