//! Condicionador do canal de movimento (acelerômetro)

use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use crate::buffer::{RollingBuffer, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use crate::error::{SignalError, SignalResult};

/// Presets de limiar calibrados em campo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPreset {
    /// delta > 0.6 e magnitude > 10.1 (tapete fino, superfície dura)
    #[default]
    Sensitive,
    /// delta > 0.8 e magnitude > 10.2 (menos falsos positivos ao manusear)
    Firm,
}

impl MotionPreset {
    pub fn config(self) -> MotionConfig {
        match self {
            MotionPreset::Sensitive => MotionConfig {
                delta_threshold: 0.6,
                absolute_threshold: 10.1,
                buffer_size: DEFAULT_BUFFER_SIZE,
            },
            MotionPreset::Firm => MotionConfig {
                delta_threshold: 0.8,
                absolute_threshold: 10.2,
                buffer_size: DEFAULT_BUFFER_SIZE,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPreset::Sensitive => "sensitive",
            MotionPreset::Firm => "firm",
        }
    }
}

impl std::str::FromStr for MotionPreset {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sensitive" => Ok(MotionPreset::Sensitive),
            "firm" => Ok(MotionPreset::Firm),
            other => Err(SignalError::InvalidConfig(format!(
                "Unknown motion preset: {other}"
            ))),
        }
    }
}

/// Configuração do canal de movimento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Excesso mínimo sobre o baseline (m/s²)
    pub delta_threshold: f64,
    /// Magnitude absoluta mínima (m/s²); a gravidade sozinha dá ~9.81
    pub absolute_threshold: f64,
    /// Amostras na média móvel
    pub buffer_size: usize,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionPreset::default().config()
    }
}

impl MotionConfig {
    pub fn validate(&self) -> SignalResult<()> {
        if !self.delta_threshold.is_finite() || self.delta_threshold < 0.0 {
            return Err(SignalError::InvalidThreshold {
                name: "delta_threshold",
                value: self.delta_threshold,
            });
        }

        if !self.absolute_threshold.is_finite() || self.absolute_threshold < 0.0 {
            return Err(SignalError::InvalidThreshold {
                name: "absolute_threshold",
                value: self.absolute_threshold,
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
pub struct MotionReading {
    pub timestamp: TimestampMs,
    /// Força total (m/s²)
    pub magnitude: f64,
    /// Média móvel, incluindo a amostra atual
    pub baseline: f64,
    pub delta: f64,
    pub triggered: bool,
}

/// Condicionador de movimento.
///
/// Um limiar absoluto sozinho dispararia o tempo todo (gravidade); o teste de
/// delta sobre o baseline isola picos curtos. As duas condições precisam valer:
/// inclinação lenta tem magnitude alta e delta baixo, tremor tem o oposto.
#[derive(Debug, Clone)]
pub struct MotionConditioner {
    config: MotionConfig,
    buffer: RollingBuffer,
    last_reading: Option<MotionReading>,
    samples_seen: u64,
    events_emitted: u64,
}

impl MotionConditioner {
    /// Cria condicionador com o preset padrão
    pub fn new() -> SignalResult<Self> {
        Self::with_config(MotionConfig::default())
    }

    /// Cria condicionador a partir de um preset
    pub fn with_preset(preset: MotionPreset) -> SignalResult<Self> {
        Self::with_config(preset.config())
    }

    /// Cria condicionador com configuração específica
    pub fn with_config(config: MotionConfig) -> SignalResult<Self> {
        config.validate()?;
        let buffer = RollingBuffer::new(config.buffer_size)?;

        Ok(Self {
            config,
            buffer,
            last_reading: None,
            samples_seen: 0,
            events_emitted: 0,
        })
    }

    /// Troca a configuração; o buffer é recriado se a capacidade mudar
    pub fn configure(&mut self, config: MotionConfig) -> SignalResult<()> {
        config.validate()?;
        if config.buffer_size != self.config.buffer_size {
            self.buffer = RollingBuffer::new(config.buffer_size)?;
        }
        self.config = config;
        Ok(())
    }

    /// Alimenta um vetor 3-eixos em unidades de g
    pub fn feed(&mut self, ax: f64, ay: f64, az: f64, timestamp: TimestampMs) -> Option<CandidateEvent> {
        self.push(&SensorSample::motion(ax, ay, az, timestamp))
    }

    /// Alimenta uma magnitude já convertida para m/s²
    pub fn feed_magnitude(&mut self, magnitude: f64, timestamp: TimestampMs) -> Option<CandidateEvent> {
        if !magnitude.is_finite() {
            tracing::warn!(channel = "motion", timestamp, "dropping non-finite sample");
            return None;
        }

        self.samples_seen += 1;
        self.buffer.push(magnitude);
        let baseline = self.buffer.mean().unwrap_or(magnitude);
        let delta = magnitude - baseline;

        let triggered =
            delta > self.config.delta_threshold && magnitude > self.config.absolute_threshold;

        self.last_reading = Some(MotionReading {
            timestamp,
            magnitude,
            baseline,
            delta,
            triggered,
        });

        if !triggered {
            return None;
        }

        self.events_emitted += 1;
        tracing::trace!(timestamp, magnitude, baseline, delta, "motion thump candidate");
        Some(CandidateEvent::new(ChannelId::Motion, timestamp))
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Baseline atual (None antes da primeira amostra)
    pub fn baseline(&self) -> Option<f64> {
        self.buffer.mean()
    }

    pub fn last_reading(&self) -> Option<&MotionReading> {
        self.last_reading.as_ref()
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }
}

impl Default for MotionConditioner {
    fn default() -> Self {
        Self {
            config: MotionConfig::default(),
            buffer: RollingBuffer::default(),
            last_reading: None,
            samples_seen: 0,
            events_emitted: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPLEMENTAÇÃO DOS TRAITS DO CORE
// ═══════════════════════════════════════════════════════════════════════════════

impl SajdahComponent for MotionConditioner {
    fn name(&self) -> &str {
        "MotionConditioner"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }
}

impl ThumpDetector for MotionConditioner {
    fn channel(&self) -> ChannelId {
        ChannelId::Motion
    }

    fn push(&mut self, sample: &SensorSample) -> Option<CandidateEvent> {
        if let Err(err) = self.accepts(sample) {
            tracing::warn!(%err, "motion conditioner ignoring sample");
            return None;
        }
        self.feed_magnitude(sample.magnitude, sample.timestamp)
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.last_reading = None;
    }
}
