//! Commit periódico da BSRAM.
//!
//! Chamado a cada frame (ou em qualquer cadência) com o tempo desde a
//! chamada anterior. Só grava quando o intervalo passou desde a última
//! tentativa *e* o jogo escreveu na BSRAM nesse meio tempo; jogo parado
//! não toca no cartão. Falhas mantêm o buffer sujo e são repetidas um
//! intervalo depois, indefinidamente.

use crate::core::memory::Bsram;
use crate::core::storage::{SaveStore, Storage};
use log::{debug, trace, warn};
use std::time::Duration;

/// Estado do agendador em relação a um buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    /// O próximo tick grava
    Due,
}

/// O que o tick fez
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveEvent {
    /// Nada a fazer
    Idle,
    /// BSRAM gravada no cartão
    Committed,
    /// Escrita falhou; o buffer continua sujo
    Failed,
}

/// Política de autosave de um jogo
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    interval: Duration,
    elapsed: Duration,
    commits: u64,
    failures: u64,
}

impl AutosaveScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            commits: 0,
            failures: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tempo acumulado desde a última tentativa
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `Due` quando o intervalo já passou e `bsram` tem alterações
    pub fn state(&self, bsram: &Bsram) -> AutosaveState {
        if self.elapsed >= self.interval && bsram.is_dirty() {
            AutosaveState::Due
        } else {
            AutosaveState::Idle
        }
    }

    /// Commits bem-sucedidos até agora
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Commits com falha até agora
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Avança o timer em `delta` e grava se estiver na hora. No máximo um
    /// commit por chamada, por maior que seja `delta`.
    pub fn tick<S: Storage>(
        &mut self,
        delta: Duration,
        store: &mut SaveStore<S>,
        slot: &str,
        size_kb: usize,
        bsram: &mut Bsram,
    ) -> AutosaveEvent {
        self.elapsed = self.elapsed.saturating_add(delta);

        if self.state(bsram) == AutosaveState::Idle {
            trace!(
                "Autosave ocioso ({:?}/{:?}, suja={})",
                self.elapsed,
                self.interval,
                bsram.is_dirty()
            );
            return AutosaveEvent::Idle;
        }

        self.commit(store, slot, size_kb, bsram)
    }

    /// Grava na hora se o buffer estiver sujo, por exemplo antes de trocar de jogo
    pub fn flush<S: Storage>(
        &mut self,
        store: &mut SaveStore<S>,
        slot: &str,
        size_kb: usize,
        bsram: &mut Bsram,
    ) -> AutosaveEvent {
        if !bsram.is_dirty() {
            return AutosaveEvent::Idle;
        }
        debug!("Flush do autosave pedido para {}", slot);
        self.commit(store, slot, size_kb, bsram)
    }

    fn commit<S: Storage>(
        &mut self,
        store: &mut SaveStore<S>,
        slot: &str,
        size_kb: usize,
        bsram: &mut Bsram,
    ) -> AutosaveEvent {
        let event = match store.save(slot, size_kb, bsram) {
            Ok(()) => {
                bsram.mark_clean();
                self.commits += 1;
                debug!("Autosave gravou {} (#{})", slot, self.commits);
                AutosaveEvent::Committed
            }
            Err(e) => {
                self.failures += 1;
                warn!("Falha no autosave de {}, nova tentativa em {:?}: {}", slot, self.interval, e);
                AutosaveEvent::Failed
            }
        };

        // Com ou sem sucesso, a próxima tentativa espera um intervalo inteiro
        self.elapsed = Duration::ZERO;
        event
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
