//! # 📈 sajdah-signal — Condicionamento de Sinal
//!
//! Converte o fluxo bruto e ruidoso de cada canal em eventos candidatos de
//! "baque" (sajdah), de forma independente por canal.
//!
//! ## Canais
//!
//! | Canal | Entrada | Regra |
//! |:------|:--------|:------|
//! | Movimento | vetor 3-eixos (g), 50–60 Hz | `delta > Δ` **e** `magnitude > A` |
//! | Áudio | metering dBFS, ≥ 20 Hz | `nível > V` |
//!
//! Onde `magnitude = |a| · 9.81` e `delta = magnitude − média(buffer)`.
//!
//! ## Exemplo
//!
//! ```ignore
//! use sajdah_signal::{MotionConditioner, MotionPreset};
//! use sajdah_core::traits::ThumpDetector;
//!
//! let mut motion = MotionConditioner::with_preset(MotionPreset::Firm)?;
//! if let Some(event) = motion.feed(0.02, -0.01, 1.13, now_ms) {
//!     counter.process_candidate_event(event.timestamp);
//! }
//! ```

pub mod audio;
pub mod buffer;
pub mod error;
pub mod motion;

pub use audio::{AudioConditioner, AudioConfig, AudioReading, DBFS_MAX, DBFS_MIN};
pub use buffer::{RollingBuffer, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
pub use error::{SignalError, SignalResult};
pub use motion::{MotionConditioner, MotionConfig, MotionPreset, MotionReading};

// Re-export core types
pub use sajdah_core::prelude::*;

#[cfg(test)]
mod tests;
