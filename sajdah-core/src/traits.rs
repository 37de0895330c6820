//! # 🎯 Traits — Abstrações dos Canais
//!
//! | Trait | Papel |
//! |:------|:------|
//! | [`SajdahComponent`] | Base de todo componente (nome, versão, prontidão) |
//! | [`ThumpDetector`] | Canal → fluxo de eventos candidatos |

use crate::types::{CandidateEvent, ChannelId, SensorSample};
use std::fmt::Debug;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROS
// ═══════════════════════════════════════════════════════════════════════════════

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Erro de canal
///
/// Amostra entregue ao detector errado. Indisponibilidade de sensor fica na
/// camada do driver: o canal simplesmente não recebe amostras.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: ChannelId, got: ChannelId },
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAIT BASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait base para qualquer componente do contador.
pub trait SajdahComponent: Send + Sync + Debug {
    /// Nome único do componente (para logs e debug)
    fn name(&self) -> &str;

    /// Versão do componente
    fn version(&self) -> &str {
        "2026.1.16"
    }

    /// Componente está pronto para uso?
    fn is_ready(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONDICIONAMENTO DE SINAL
// ═══════════════════════════════════════════════════════════════════════════════

/// Converte o fluxo bruto de um canal em eventos candidatos.
///
/// Cada implementação guarda seu próprio estado (buffer, última leitura) e não
/// compartilha nada mutável com outros canais. `push` deve ser O(1) em relação
/// ao tamanho do buffer para nunca atrasar a cadência de amostragem.
///
/// # Exemplo
///
/// ```ignore
/// use sajdah_core::prelude::*;
///
/// let mut detector = MotionConditioner::new()?;
/// if let Some(event) = detector.push(&SensorSample::motion(0.0, 0.0, 1.12, 1000)) {
///     counter.process_candidate_event(event.timestamp);
/// }
/// ```
pub trait ThumpDetector: SajdahComponent {
    /// Canal atendido por este detector
    fn channel(&self) -> ChannelId;

    /// Processa uma amostra; retorna evento se um baque foi detectado
    fn push(&mut self, sample: &SensorSample) -> Option<CandidateEvent>;

    /// Descarta o baseline acumulado (início/fim de sessão)
    fn reset(&mut self);

    /// Processa um lote, retornando todos os eventos candidatos
    fn push_batch(&mut self, samples: &[SensorSample]) -> Vec<CandidateEvent> {
        samples.iter().filter_map(|s| self.push(s)).collect()
    }

    /// Verifica se a amostra pertence a este canal
    fn accepts(&self, sample: &SensorSample) -> ChannelResult<()> {
        if sample.channel == self.channel() {
            Ok(())
        } else {
            Err(ChannelError::ChannelMismatch {
                expected: self.channel(),
                got: sample.channel,
            })
        }
    }
}
