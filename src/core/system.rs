//! Orquestração do carregamento de jogos.
//!
//! `Firmware` guarda tudo que vive durante um jogo num `GameSession`: a
//! BSRAM, a tabela de cheats e o timer do autosave. O menu chama
//! [`Firmware::load_game`]; o loop de emulação chama
//! [`Firmware::autosave_tick`] uma vez por frame e acessa BSRAM e cheats
//! por [`Firmware::session_mut`].
//!
//! Se o flush do jogo anterior falhar na troca, a BSRAM dele vai para a
//! fila de commits pendentes e continua sendo regravada a cada intervalo.

use crate::core::autosave::{AutosaveEvent, AutosaveScheduler};
use crate::core::cartridge::{CheatTable, RomCatalog, RomId, RomInfo};
use crate::core::config::FirmwareConfig;
use crate::core::memory::Bsram;
use crate::core::storage::save_store::companion_name;
use crate::core::storage::{LoadedSlot, SaveStore, SlotError, SlotFlags, Storage};
use log::{error, info, warn};
use std::time::Duration;

/// Resultado do carregamento, como reportado ao menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoadOutcome {
    Ok = 0x00,
    /// A ROM escolhida não foi encontrada
    FileNotExist = 0x01,
    /// O slot existe mas é inutilizável; a emulação não pode começar
    FileCorrupt = 0x02,
}

impl LoadOutcome {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_ok(self) -> bool {
        self == LoadOutcome::Ok
    }
}

/// Saída de texto visível do menu
pub trait StatusSink {
    /// Linha de status
    fn status(&mut self, msg: &str);
    /// Caixa de mensagem
    fn message(&mut self, text: &str, centered: bool);
}

/// Sink que só registra no log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn status(&mut self, msg: &str) {
        info!("[status] {}", msg);
    }

    fn message(&mut self, text: &str, centered: bool) {
        info!("[mensagem{}] {}", if centered { ", centralizada" } else { "" }, text);
    }
}

const NO_CHEATS: &CheatTable = &CheatTable::empty();

/// Estado do jogo carregado
#[derive(Debug)]
pub struct GameSession {
    rom: RomInfo,
    slot: String,
    slot_flags: SlotFlags,
    bsram: Bsram,
    cheats: CheatTable,
    cheats_enabled: bool,
    autosave: AutosaveScheduler,
}

impl GameSession {
    pub fn rom(&self) -> &RomInfo {
        &self.rom
    }

    /// Nome do arquivo do slot
    pub fn slot_name(&self) -> &str {
        &self.slot
    }

    pub fn slot_flags(&self) -> SlotFlags {
        self.slot_flags
    }

    pub fn bsram(&self) -> &Bsram {
        &self.bsram
    }

    /// Acesso do core de emulação à BSRAM
    pub fn bsram_mut(&mut self) -> &mut Bsram {
        &mut self.bsram
    }

    /// Todos os códigos lidos, ativos ou não
    pub fn cheats(&self) -> &CheatTable {
        &self.cheats
    }

    /// Tabela que o core deve aplicar: vazia com os cheats desligados
    pub fn active_cheats(&self) -> &CheatTable {
        if self.cheats_enabled {
            &self.cheats
        } else {
            NO_CHEATS
        }
    }

    pub fn cheats_enabled(&self) -> bool {
        self.cheats_enabled
    }

    pub fn set_cheats_enabled(&mut self, enabled: bool) {
        if enabled != self.cheats_enabled {
            info!("Cheats {}", if enabled { "ativados" } else { "desativados" });
        }
        self.cheats_enabled = enabled;
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }
}

/// BSRAM de um jogo descarregado que ainda não chegou ao cartão
#[derive(Debug)]
struct PendingCommit {
    slot: String,
    size_kb: usize,
    bsram: Bsram,
    autosave: AutosaveScheduler,
}

/// Lado de persistência do firmware
pub struct Firmware<S: Storage, C: RomCatalog> {
    config: FirmwareConfig,
    store: SaveStore<S>,
    catalog: C,
    session: Option<GameSession>,
    pending: Vec<PendingCommit>,
}

impl<S: Storage, C: RomCatalog> Firmware<S, C> {
    pub fn new(storage: S, catalog: C, config: FirmwareConfig) -> Self {
        let store = SaveStore::new(storage, &config);
        Self {
            config,
            store,
            catalog,
            session: None,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &FirmwareConfig {
        &self.config
    }

    pub fn store(&self) -> &SaveStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SaveStore<S> {
        &mut self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Slots de jogos anteriores ainda aguardando gravação
    pub fn pending_commits(&self) -> usize {
        self.pending.len()
    }

    /// Carrega o jogo escolhido no menu
    pub fn load_game(&mut self, rom: RomId, ui: &mut dyn StatusSink) -> LoadOutcome {
        let Some(info) = self.catalog.resolve(rom) else {
            warn!("ROM #{} não encontrada", rom);
            ui.message("Arquivo da ROM não encontrado", true);
            return LoadOutcome::FileNotExist;
        };

        // O jogo atual para aqui, qualquer que seja o resultado
        if self.unload() == AutosaveEvent::Failed {
            ui.message("Falha ao salvar o jogo anterior", true);
        }

        ui.status(&format!("Carregando {}...", info.name));
        let slot = self.store.slot_name(&info.name);

        // A cópia pendente é mais nova que a do cartão
        let (loaded, autosave) = match self.take_pending(&slot, info.bsram_kb) {
            Some(pending) => {
                info!("{}: retomando BSRAM pendente", slot);
                ui.status("Save pendente restaurado");
                let loaded = LoadedSlot {
                    bsram: pending.bsram,
                    flags: SlotFlags::UNSAVED,
                };
                (loaded, pending.autosave)
            }
            None => match self.store.load(&slot, info.bsram_kb) {
                Ok(loaded) => (loaded, AutosaveScheduler::new(self.config.autosave_interval)),
                Err(SlotError::Corrupt(kind)) => {
                    error!("{}: save corrompido ({}), jogo não iniciado", info.name, kind);
                    ui.message(&format!("Arquivo de save {} corrompido", slot), true);
                    return LoadOutcome::FileCorrupt;
                }
                Err(SlotError::Storage(e)) => {
                    error!("{}: save ilegível ({}), jogo não iniciado", info.name, e);
                    ui.message(&format!("Não foi possível ler {}", slot), true);
                    return LoadOutcome::FileCorrupt;
                }
            },
        };

        if loaded.flags.contains(SlotFlags::CREATED | SlotFlags::UNSAVED) {
            ui.status("Save ainda não gravado");
        } else if loaded.flags.contains(SlotFlags::CREATED) {
            ui.status("Novo arquivo de save criado");
        }

        let cheats = self.load_cheats(&info);

        info!(
            "{} carregado: {}, BSRAM de {} KB, {} cheats",
            info.name,
            info.console,
            info.bsram_kb,
            cheats.len()
        );
        ui.status(&format!("{} pronto", info.name));

        self.session = Some(GameSession {
            rom: info,
            slot,
            slot_flags: loaded.flags,
            bsram: loaded.bsram,
            cheats,
            cheats_enabled: self.config.cheats_enabled,
            autosave,
        });
        LoadOutcome::Ok
    }

    /// Lê o arquivo de cheats do jogo; ausente ou ilegível é tabela vazia
    fn load_cheats(&self, info: &RomInfo) -> CheatTable {
        let name = companion_name(&info.name, &self.config.cheat_extension);
        match self.store.storage().read(&name) {
            Ok(Some(source)) => CheatTable::parse(&source),
            Ok(None) => CheatTable::empty(),
            Err(e) => {
                warn!("Arquivo de cheats {} ilegível: {}", name, e);
                CheatTable::empty()
            }
        }
    }

    fn take_pending(&mut self, slot: &str, size_kb: usize) -> Option<PendingCommit> {
        let index = self
            .pending
            .iter()
            .position(|p| p.slot == slot && p.size_kb == size_kb)?;
        Some(self.pending.remove(index))
    }

    /// Entrada por frame do loop de emulação
    pub fn autosave_tick(&mut self, delta: Duration) -> AutosaveEvent {
        let retried = self.retry_pending(delta);

        let Some(session) = self.session.as_mut() else {
            return retried;
        };
        let event = session.autosave.tick(
            delta,
            &mut self.store,
            &session.slot,
            session.rom.bsram_kb,
            &mut session.bsram,
        );

        match event {
            AutosaveEvent::Idle => retried,
            _ => event,
        }
    }

    /// Regrava os slots pendentes, um intervalo após a última tentativa
    fn retry_pending(&mut self, delta: Duration) -> AutosaveEvent {
        let store = &mut self.store;
        let mut result = AutosaveEvent::Idle;

        self.pending.retain_mut(|p| {
            match p.autosave.tick(delta, store, &p.slot, p.size_kb, &mut p.bsram) {
                AutosaveEvent::Committed => {
                    info!("{}: BSRAM pendente gravada", p.slot);
                    if result == AutosaveEvent::Idle {
                        result = AutosaveEvent::Committed;
                    }
                    false
                }
                AutosaveEvent::Failed => {
                    result = AutosaveEvent::Failed;
                    true
                }
                AutosaveEvent::Idle => true,
            }
        });
        result
    }

    /// Grava o jogo atual agora se houver alterações
    pub fn flush(&mut self) -> AutosaveEvent {
        let Some(session) = self.session.as_mut() else {
            return AutosaveEvent::Idle;
        };
        session
            .autosave
            .flush(&mut self.store, &session.slot, session.rom.bsram_kb, &mut session.bsram)
    }

    /// Grava e descarrega o jogo atual. Se a gravação falhar, a BSRAM
    /// fica na fila pendente até o cartão aceitar a escrita.
    pub fn unload(&mut self) -> AutosaveEvent {
        let event = self.flush();
        let Some(session) = self.session.take() else {
            return event;
        };

        if event == AutosaveEvent::Failed {
            warn!("{} descarregado com BSRAM não gravada, commit pendente", session.rom.name);
            // Uma entrada por slot; a mais nova substitui
            self.pending.retain(|p| p.slot != session.slot);
            self.pending.push(PendingCommit {
                slot: session.slot,
                size_kb: session.rom.bsram_kb,
                bsram: session.bsram,
                autosave: session.autosave,
            });
        } else {
            info!("{} descarregado", session.rom.name);
        }
        event
    }
}
