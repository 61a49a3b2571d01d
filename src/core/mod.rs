//! Estado persistente do firmware do cartucho: save RAM, slots no cartão,
//! autosave e cheats.

pub mod autosave;
pub mod cartridge;
pub mod config;
pub mod memory;
pub mod storage;
pub mod system;
