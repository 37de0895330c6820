//! Condicionador do canal de áudio (metering do microfone)

use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use crate::buffer::{RollingBuffer, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use crate::error::{SignalError, SignalResult};

/// Piso do metering (silêncio digital)
pub const DBFS_MIN: f64 = -160.0;

/// Teto do metering (fundo de escala)
pub const DBFS_MAX: f64 = 0.0;

/// Configuração do canal de áudio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Nível mínimo (dBFS); -25 a -30 dB é um toque leve no aparelho
    pub volume_threshold: f64,
    /// Exige também que o nível supere o ruído ambiente recente
    pub ambient_tracking: bool,
    /// Margem sobre o piso de ruído (dB), usada com `ambient_tracking`
    pub floor_margin_db: f64,
    /// Amostras na média do piso de ruído
    pub buffer_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume_threshold: -30.0,
            ambient_tracking: false,
            floor_margin_db: 10.0,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> SignalResult<()> {
        if !self.volume_threshold.is_finite()
            || !(DBFS_MIN..=DBFS_MAX).contains(&self.volume_threshold)
        {
            return Err(SignalError::InvalidThreshold {
                name: "volume_threshold",
                value: self.volume_threshold,
            });
        }

        if !self.floor_margin_db.is_finite() || self.floor_margin_db < 0.0 {
            return Err(SignalError::InvalidThreshold {
                name: "floor_margin_db",
                value: self.floor_margin_db,
            });
        }

        if self.buffer_size == 0 || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(SignalError::InvalidBufferSize(self.buffer_size));
        }

        Ok(())
    }
}

/// Leitura de diagnóstico da última amostra processada
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioReading {
    pub timestamp: TimestampMs,
    /// Nível já limitado a [-160, 0] dBFS
    pub level: f64,
    /// Piso de ruído antes desta amostra (apenas com `ambient_tracking`)
    pub floor: Option<f64>,
    pub triggered: bool,
}

/// Condicionador de áudio.
///
/// Regra de referência: evento sse `level > volume_threshold`. Com
/// `ambient_tracking`, o piso é a média das amostras anteriores e o nível
/// precisa superá-lo por `floor_margin_db`.
#[derive(Debug, Clone)]
pub struct AudioConditioner {
    config: AudioConfig,
    floor: RollingBuffer,
    last_reading: Option<AudioReading>,
    samples_seen: u64,
    events_emitted: u64,
}

impl AudioConditioner {
    /// Cria condicionador com configuração padrão
    pub fn new() -> SignalResult<Self> {
        Self::with_config(AudioConfig::default())
    }

    /// Cria condicionador com configuração específica
    pub fn with_config(config: AudioConfig) -> SignalResult<Self> {
        config.validate()?;
        let floor = RollingBuffer::new(config.buffer_size)?;

        Ok(Self {
            config,
            floor,
            last_reading: None,
            samples_seen: 0,
            events_emitted: 0,
        })
    }

    pub fn configure(&mut self, config: AudioConfig) -> SignalResult<()> {
        config.validate()?;
        if config.buffer_size != self.config.buffer_size {
            self.floor = RollingBuffer::new(config.buffer_size)?;
        }
        self.config = config;
        Ok(())
    }

    /// Alimenta um nível de metering (dBFS)
    pub fn feed(&mut self, level_db: f64, timestamp: TimestampMs) -> Option<CandidateEvent> {
        if !level_db.is_finite() {
            tracing::warn!(channel = "audio", timestamp, "dropping non-finite sample");
            return None;
        }

        self.samples_seen += 1;
        let level = level_db.clamp(DBFS_MIN, DBFS_MAX);

        let floor = if self.config.ambient_tracking {
            let floor = self.floor.mean();
            self.floor.push(level);
            floor
        } else {
            None
        };

        let above_floor = floor.is_none_or(|f| level > f + self.config.floor_margin_db);
        let triggered = level > self.config.volume_threshold && above_floor;

        self.last_reading = Some(AudioReading {
            timestamp,
            level,
            floor,
            triggered,
        });

        if !triggered {
            return None;
        }

        self.events_emitted += 1;
        tracing::trace!(timestamp, level, ?floor, "audio thump candidate");
        Some(CandidateEvent::new(ChannelId::Audio, timestamp))
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Piso de ruído atual (None sem `ambient_tracking` ou sem amostras)
    pub fn noise_floor(&self) -> Option<f64> {
        if self.config.ambient_tracking {
            self.floor.mean()
        } else {
            None
        }
    }

    pub fn last_reading(&self) -> Option<&AudioReading> {
        self.last_reading.as_ref()
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }
}

impl Default for AudioConditioner {
    fn default() -> Self {
        Self {
            config: AudioConfig::default(),
            floor: RollingBuffer::default(),
            last_reading: None,
            samples_seen: 0,
            events_emitted: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPLEMENTAÇÃO DOS TRAITS DO CORE
// ═══════════════════════════════════════════════════════════════════════════════

impl SajdahComponent for AudioConditioner {
    fn name(&self) -> &str {
        "AudioConditioner"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }
}

impl ThumpDetector for AudioConditioner {
    fn channel(&self) -> ChannelId {
        ChannelId::Audio
    }

    fn push(&mut self, sample: &SensorSample) -> Option<CandidateEvent> {
        if let Err(err) = self.accepts(sample) {
            tracing::warn!(%err, "audio conditioner ignoring sample");
            return None;
        }
        self.feed(sample.magnitude, sample.timestamp)
    }

    fn reset(&mut self) {
        self.floor.clear();
        self.last_reading = None;
    }
}
