//! Configuração da sessão (sajdah.toml)
//!
//! Opções reconhecidas, todas independentes:
//!
//! ```toml
//! delta_threshold = 0.6        # m/s² sobre o baseline
//! absolute_threshold = 10.1    # m/s²
//! volume_threshold = -30.0     # dBFS
//! cooldown_ms = 1500
//! buffer_size = 10
//! ```
//!
//! Também aceita as chaves em camelCase (`deltaThreshold`, `cooldownMs`, ...),
//! `motion_preset = "sensitive" | "firm"` e os interruptores por canal.

use std::path::Path;
use serde::{Deserialize, Serialize};
use sajdah_counter::CounterConfig;
use sajdah_signal::{AudioConfig, MotionConfig, MotionPreset, DEFAULT_BUFFER_SIZE};
use crate::error::{SessionError, SessionResult};

/// Configuração completa de uma sessão
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preset base dos limiares de movimento
    #[serde(alias = "motionPreset")]
    pub motion_preset: MotionPreset,

    /// Sobrescreve o delta do preset (m/s²)
    #[serde(alias = "deltaThreshold", skip_serializing_if = "Option::is_none")]
    pub delta_threshold: Option<f64>,

    /// Sobrescreve a magnitude absoluta do preset (m/s²)
    #[serde(alias = "absoluteThreshold", skip_serializing_if = "Option::is_none")]
    pub absolute_threshold: Option<f64>,

    /// Limiar de volume (dBFS)
    #[serde(alias = "volumeThreshold")]
    pub volume_threshold: f64,

    /// Janela de debounce (ms)
    #[serde(alias = "cooldownMs")]
    pub cooldown_ms: u64,

    /// Amostras na média móvel de cada canal
    #[serde(alias = "bufferSize")]
    pub buffer_size: usize,

    #[serde(alias = "motionEnabled")]
    pub motion_enabled: bool,

    /// Requer permissão de microfone na camada do driver
    #[serde(alias = "audioEnabled")]
    pub audio_enabled: bool,

    #[serde(alias = "ambientTracking")]
    pub ambient_tracking: bool,

    #[serde(alias = "floorMarginDb")]
    pub floor_margin_db: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let audio = AudioConfig::default();
        Self {
            motion_preset: MotionPreset::default(),
            delta_threshold: None,
            absolute_threshold: None,
            volume_threshold: audio.volume_threshold,
            cooldown_ms: CounterConfig::default().cooldown_ms,
            buffer_size: DEFAULT_BUFFER_SIZE,
            motion_enabled: true,
            audio_enabled: true,
            ambient_tracking: audio.ambient_tracking,
            floor_margin_db: audio.floor_margin_db,
        }
    }
}

impl Settings {
    /// Configuração padrão com outro preset de movimento
    pub fn with_preset(preset: MotionPreset) -> Self {
        Self {
            motion_preset: preset,
            ..Self::default()
        }
    }

    /// Parse a partir de TOML
    pub fn from_toml_str(content: &str) -> SessionResult<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SessionError::ConfigFile(format!("Failed to parse sajdah.toml: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Carrega de um arquivo
    pub fn from_file(path: &Path) -> SessionResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SessionError::ConfigFile(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Serializa para TOML
    pub fn to_toml_string(&self) -> SessionResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SessionError::ConfigFile(format!("Failed to serialize settings: {}", e)))
    }

    /// Mesma configuração com os limiares do preset explicitados
    pub fn effective(&self) -> Self {
        let motion = self.motion_config();
        Self {
            delta_threshold: Some(motion.delta_threshold),
            absolute_threshold: Some(motion.absolute_threshold),
            ..self.clone()
        }
    }

    /// Configuração do canal de movimento (preset + sobrescritas)
    pub fn motion_config(&self) -> MotionConfig {
        let preset = self.motion_preset.config();
        MotionConfig {
            delta_threshold: self.delta_threshold.unwrap_or(preset.delta_threshold),
            absolute_threshold: self.absolute_threshold.unwrap_or(preset.absolute_threshold),
            buffer_size: self.buffer_size,
        }
    }

    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            volume_threshold: self.volume_threshold,
            ambient_tracking: self.ambient_tracking,
            floor_margin_db: self.floor_margin_db,
            buffer_size: self.buffer_size,
        }
    }

    pub fn counter_config(&self) -> CounterConfig {
        CounterConfig {
            cooldown_ms: self.cooldown_ms,
        }
    }

    /// Valida todas as partes
    pub fn validate(&self) -> SessionResult<()> {
        self.motion_config().validate()?;
        self.audio_config().validate()?;
        Ok(())
    }
}
