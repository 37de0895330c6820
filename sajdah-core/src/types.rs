//! Tipos de dados compartilhados entre canais e contador

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp em milissegundos (relógio do chamador)
pub type TimestampMs = u64;

/// Timestamp atual em milissegundos desde epoch
pub fn now_ms() -> TimestampMs {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Aceleração da gravidade (m/s²), converte unidades normalizadas do acelerômetro
pub const GRAVITY: f64 = 9.81;

/// Canal de origem de uma amostra ou evento candidato
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelId {
    /// Magnitude da aceleração linear (m/s²)
    Motion,
    /// Nível de pressão sonora do microfone (dBFS)
    Audio,
    /// Toque manual na tela (fallback sem sensores)
    Manual,
}

impl ChannelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::Motion => "motion",
            ChannelId::Audio => "audio",
            ChannelId::Manual => "manual",
        }
    }

    /// Unidade da magnitude transportada pelo canal
    pub fn unit(&self) -> &'static str {
        match self {
            ChannelId::Motion => "m/s²",
            ChannelId::Audio => "dB",
            ChannelId::Manual => "",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leitura escalar de um canal
///
/// Efêmera: não é retida além do processamento no buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub timestamp: TimestampMs,
    /// m/s² para movimento, dB para áudio
    pub magnitude: f64,
    pub channel: ChannelId,
}

impl SensorSample {
    pub fn new(channel: ChannelId, magnitude: f64, timestamp: TimestampMs) -> Self {
        Self {
            timestamp,
            magnitude,
            channel,
        }
    }

    /// Amostra de movimento a partir de um vetor 3-eixos em unidades de g
    pub fn motion(ax: f64, ay: f64, az: f64, timestamp: TimestampMs) -> Self {
        let magnitude = (ax * ax + ay * ay + az * az).sqrt() * GRAVITY;
        Self::new(ChannelId::Motion, magnitude, timestamp)
    }

    /// Amostra de áudio (metering em dBFS)
    pub fn audio(level_db: f64, timestamp: TimestampMs) -> Self {
        Self::new(ChannelId::Audio, level_db, timestamp)
    }

    pub fn is_finite(&self) -> bool {
        self.magnitude.is_finite()
    }
}

/// "Este canal acredita que um baque ocorreu agora."
///
/// Produzido pelo condicionador, consumido imediatamente pelo contador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub timestamp: TimestampMs,
    /// Apenas para diagnóstico; o contador ignora a origem
    pub channel: ChannelId,
}

impl CandidateEvent {
    pub fn new(channel: ChannelId, timestamp: TimestampMs) -> Self {
        Self { timestamp, channel }
    }

    /// Evento de toque manual
    pub fn manual(timestamp: TimestampMs) -> Self {
        Self::new(ChannelId::Manual, timestamp)
    }
}
