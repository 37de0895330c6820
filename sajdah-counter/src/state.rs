//! Estado persistente do contador

use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;

/// Sajdahs por rakat (fixo)
pub const SAJDAHS_PER_RAKAT: u8 = 2;

/// Estado do contador, possuído exclusivamente pela máquina de estados.
///
/// Invariantes:
/// - `sajdah_progress ∈ {0, 1}`: volta a 0 no instante em que chegaria a 2,
///   junto com o incremento de `rakat_count`
/// - `rakat_count` só cresce, exceto em reset explícito
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterState {
    rakat_count: u64,
    sajdah_progress: u8,
    last_accepted_event_time: Option<TimestampMs>,
}

impl CounterState {
    /// Estado inicial `{0, 0, never}`
    pub fn new() -> Self {
        Self::default()
    }

    /// Rakats completos
    pub fn rakat_count(&self) -> u64 {
        self.rakat_count
    }

    /// Sajdahs no rakat corrente (0 ou 1)
    pub fn sajdah_progress(&self) -> u8 {
        self.sajdah_progress
    }

    /// Último evento aceito (None = nunca)
    pub fn last_accepted_event_time(&self) -> Option<TimestampMs> {
        self.last_accepted_event_time
    }

    /// Fase atual da máquina
    pub fn phase(&self) -> CounterPhase {
        if self.sajdah_progress == 0 {
            CounterPhase::Idle
        } else {
            CounterPhase::OneSajdah
        }
    }

    /// Total de sajdahs aceitas desde o último reset
    pub fn total_sajdahs(&self) -> u64 {
        self.rakat_count * SAJDAHS_PER_RAKAT as u64 + self.sajdah_progress as u64
    }

    /// Registra uma sajdah aceita; retorna `(progresso exibido, rakat completo?)`
    pub(crate) fn advance(&mut self, now: TimestampMs) -> (u8, bool) {
        self.last_accepted_event_time = Some(now);
        self.sajdah_progress += 1;
        let shown = self.sajdah_progress;

        if self.sajdah_progress >= SAJDAHS_PER_RAKAT {
            self.rakat_count += 1;
            self.sajdah_progress = 0;
            return (shown, true);
        }

        (shown, false)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Estados da máquina (× rakat_count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterPhase {
    /// progress = 0
    Idle,
    /// progress = 1
    OneSajdah,
}

/// Visão serializável para a camada de apresentação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub rakat_count: u64,
    pub sajdah_progress: u8,
    /// Pontos acesos na tela (0, 1 ou 2)
    pub display_progress: u8,
    pub phase: CounterPhase,
    pub last_accepted_event_time: Option<TimestampMs>,
    pub accepted_events: u64,
    pub debounced_events: u64,
}
