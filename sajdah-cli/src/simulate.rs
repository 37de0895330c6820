//! Gerador de oração sintética
//!
//! Produz um script com `rakats × 2` baques sobre um fundo parado e ruidoso,
//! no formato lido por [`crate::script`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use crate::error::{ScriptError, ScriptResult};
use crate::script::ScriptLine;

/// Canal(is) simulados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SimChannel {
    #[default]
    Motion,
    Audio,
    /// Movimento e áudio veem o mesmo baque
    Both,
    /// Só toques manuais
    Tap,
}

/// Parâmetros da simulação
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub rakats: u32,
    pub channel: SimChannel,
    /// Amplitude do ruído do acelerômetro (g); o microfone usa 100× em dB
    pub noise: f64,
    pub sample_rate_hz: u32,
    /// Intervalo entre as duas sajdahs de um rakat (ms)
    pub sajdah_gap_ms: u64,
    /// Intervalo entre rakats (ms)
    pub rakat_gap_ms: u64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rakats: 4,
            channel: SimChannel::Motion,
            noise: 0.01,
            sample_rate_hz: 50,
            sajdah_gap_ms: 4_000,
            rakat_gap_ms: 12_000,
            seed: 7,
        }
    }
}

/// Pico do acelerômetro no impacto (g)
const THUMP_G: f64 = 1.25;
/// Nível do microfone no impacto (dBFS)
const THUMP_DB: f64 = -12.0;
/// Sala silenciosa (dBFS)
const QUIET_DB: f64 = -55.0;
/// Atraso do som em relação ao movimento
const AUDIO_LAG_MS: u64 = 15;
const LEAD_IN_MS: u64 = 2_000;

impl SimulationConfig {
    pub fn validate(&self) -> ScriptResult<()> {
        if self.sample_rate_hz == 0 || self.sample_rate_hz > 1000 {
            return Err(ScriptError::InvalidSimulation(format!(
                "sample rate {} Hz outside 1..=1000",
                self.sample_rate_hz
            )));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(ScriptError::InvalidSimulation(format!("noise must be >= 0, got {}", self.noise)));
        }
        if self.sajdah_gap_ms == 0 || self.rakat_gap_ms == 0 {
            return Err(ScriptError::InvalidSimulation("gaps must be positive".into()));
        }
        Ok(())
    }

    /// Instantes dos baques, em ordem
    pub fn thump_times(&self) -> Vec<TimestampMs> {
        (0..self.rakats as u64)
            .flat_map(|r| {
                let first = LEAD_IN_MS + r * (self.sajdah_gap_ms + self.rakat_gap_ms);
                [first, first + self.sajdah_gap_ms]
            })
            .collect()
    }

    /// Fim do script (um pouco após o último baque)
    pub fn duration_ms(&self) -> TimestampMs {
        self.thump_times().last().map_or(LEAD_IN_MS, |t| t + LEAD_IN_MS)
    }
}

/// Gera o script; determinístico para a mesma `seed`
pub fn generate(config: &SimulationConfig) -> ScriptResult<Vec<ScriptLine>> {
    config.validate()?;

    let thumps = config.thump_times();
    if config.channel == SimChannel::Tap {
        return Ok(thumps.into_iter().map(|t| ScriptLine::Tap { t, tap: true }).collect());
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let interval = (1000 / config.sample_rate_hz as u64).max(1);
    let with_motion = matches!(config.channel, SimChannel::Motion | SimChannel::Both);
    let with_audio = matches!(config.channel, SimChannel::Audio | SimChannel::Both);

    let mut lines = Vec::new();
    let mut next_thump = thumps.iter().peekable();
    let mut t = 0;

    while t <= config.duration_ms() {
        // Baque no primeiro tick que alcança o instante programado
        let thump = next_thump.next_if(|&&at| at <= t).is_some();

        if with_motion {
            let jitter = |rng: &mut StdRng| {
                if config.noise > 0.0 {
                    rng.gen_range(-config.noise..=config.noise)
                } else {
                    0.0
                }
            };
            let az = if thump { THUMP_G } else { 1.0 };
            let motion = [jitter(&mut rng), jitter(&mut rng), az + jitter(&mut rng)];
            lines.push(ScriptLine::Motion { t, motion });
        }

        if with_audio {
            let spread = config.noise * 100.0;
            let noise = if spread > 0.0 { rng.gen_range(-spread..=spread) } else { 0.0 };
            let (level, at) = if thump {
                (THUMP_DB + noise.min(0.0), t + AUDIO_LAG_MS)
            } else {
                (QUIET_DB + noise, t)
            };
            lines.push(ScriptLine::Audio { t: at, audio: level });
        }

        t += interval;
    }

    tracing::debug!(
        rakats = config.rakats,
        channel = ?config.channel,
        records = lines.len(),
        "synthetic prayer generated"
    );

    Ok(lines)
}
