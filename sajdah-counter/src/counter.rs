//! Máquina de estados sajdah/rakat

use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use crate::events::CounterEvent;
use crate::state::{CounterSnapshot, CounterState};

/// Janela padrão de debounce (ms)
pub const DEFAULT_COOLDOWN_MS: u64 = 1500;

/// Configuração do contador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Intervalo mínimo entre eventos aceitos (0 desativa o debounce)
    pub cooldown_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

/// Contadores de diagnóstico
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterStats {
    pub accepted: u64,
    pub debounced: u64,
}

/// Contador de rakats.
///
/// Único consumidor dos eventos candidatos, de qualquer canal. O debounce é a
/// única defesa contra um baque disparando os dois canais, contra o "ringing"
/// do sensor e contra re-disparos rápidos.
///
/// ```text
/// IDLE ──aceito──▶ ONE_SAJDAH ──aceito──▶ IDLE (rakat + 1)
///   ▲                                        │
///   └──────────────── reset ◀────────────────┘
/// ```
#[derive(Debug, Clone, Default)]
pub struct SajdahCounter {
    config: CounterConfig,
    state: CounterState,
    /// Pontos exibidos: mantém 2 após o rakat até o próximo evento aceito
    display_progress: u8,
    stats: CounterStats,
}

impl SajdahCounter {
    /// Cria contador com cooldown padrão
    pub fn new() -> Self {
        Self::with_config(CounterConfig::default())
    }

    /// Cria contador com configuração específica
    pub fn with_config(config: CounterConfig) -> Self {
        Self {
            config,
            state: CounterState::new(),
            display_progress: 0,
            stats: CounterStats::default(),
        }
    }

    /// Processa um evento candidato no instante `now`.
    ///
    /// Retorna as notificações em ordem: vazio se descartado pelo debounce,
    /// `[SajdahProgress]`, ou `[SajdahProgress(2), RakatComplete]`.
    /// Timestamps anteriores ao último aceito contam como intervalo 0.
    pub fn process_candidate_event(&mut self, now: TimestampMs) -> Vec<CounterEvent> {
        if let Some(last) = self.state.last_accepted_event_time() {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.config.cooldown_ms {
                self.stats.debounced += 1;
                tracing::trace!(now, elapsed, cooldown_ms = self.config.cooldown_ms, "debounced");
                return Vec::new();
            }
        }

        self.stats.accepted += 1;
        let (shown, rakat_done) = self.state.advance(now);
        self.display_progress = shown;

        let mut events = Vec::with_capacity(2);
        events.push(CounterEvent::SajdahProgress {
            value: shown,
            timestamp: now,
        });
        tracing::debug!(now, progress = shown, "sajdah accepted");

        if rakat_done {
            let count = self.state.rakat_count();
            events.push(CounterEvent::RakatComplete {
                count,
                timestamp: now,
            });
            tracing::info!(count, "rakat complete");
        }

        events
    }

    /// Processa um [`CandidateEvent`] (a origem só aparece nos logs)
    pub fn process(&mut self, event: &CandidateEvent) -> Vec<CounterEvent> {
        tracing::trace!(channel = %event.channel, timestamp = event.timestamp, "candidate");
        self.process_candidate_event(event.timestamp)
    }

    /// Toque manual: aceita "agora" pelo relógio do sistema
    pub fn accept_now(&mut self) -> Vec<CounterEvent> {
        self.process(&CandidateEvent::manual(now_ms()))
    }

    /// Volta a `{0, 0, never}`; idempotente
    pub fn reset(&mut self) -> CounterEvent {
        self.state.clear();
        self.display_progress = 0;
        tracing::debug!("counter reset");
        CounterEvent::Reset
    }

    pub fn state(&self) -> &CounterState {
        &self.state
    }

    pub fn rakat_count(&self) -> u64 {
        self.state.rakat_count()
    }

    pub fn sajdah_progress(&self) -> u8 {
        self.state.sajdah_progress()
    }

    /// Pontos acesos na tela: `progress % 2 || 2` no momento do último evento
    pub fn display_progress(&self) -> u8 {
        self.display_progress
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Troca o cooldown sem perder o estado
    pub fn set_cooldown_ms(&mut self, cooldown_ms: u64) {
        self.config.cooldown_ms = cooldown_ms;
    }

    pub fn stats(&self) -> CounterStats {
        self.stats
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            rakat_count: self.state.rakat_count(),
            sajdah_progress: self.state.sajdah_progress(),
            display_progress: self.display_progress,
            phase: self.state.phase(),
            last_accepted_event_time: self.state.last_accepted_event_time(),
            accepted_events: self.stats.accepted,
            debounced_events: self.stats.debounced,
        }
    }
}

impl SajdahComponent for SajdahCounter {
    fn name(&self) -> &str {
        "SajdahCounter"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }
}
