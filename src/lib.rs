// Ponto de entrada principal da biblioteca.
// Os cores de emulação e o menu ficam em outro lugar; aqui só mantemos a
// save RAM com bateria e os cheats sincronizados com o cartão SD.

// Módulos principais.
pub mod core;

// Re-exportações para facilitar o uso.
pub use crate::core::autosave::{AutosaveEvent, AutosaveScheduler, AutosaveState};
pub use crate::core::cartridge::{CheatEntry, CheatTable, Console, RomCatalog, RomId, RomInfo, RomList};
pub use crate::core::config::{FirmwareConfig, SlotFormat};
pub use crate::core::memory::{crc16, Bsram};
pub use crate::core::storage::{DirStorage, MemStorage, SaveStore, SlotError, Storage, StorageError};
pub use crate::core::system::{Firmware, GameSession, LoadOutcome, LogSink, StatusSink};

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Função conveniente para criar o firmware sobre um diretório (ponto de montagem do cartão SD).
pub fn create_firmware<P, C>(sd_root: P, catalog: C) -> Firmware<DirStorage, C>
where
    P: AsRef<std::path::Path>,
    C: RomCatalog,
{
    Firmware::new(DirStorage::new(sd_root), catalog, FirmwareConfig::default())
}
