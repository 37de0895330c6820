//! # 🕌 sajdah-session — Sessão de Oração
//!
//! Junta os canais de [`sajdah_signal`] e o contador de [`sajdah_counter`]
//! sob um único dono, configurado por um `sajdah.toml`.
//!
//! ## Camadas
//!
//! | Tipo | Uso |
//! |:-----|:----|
//! | [`Settings`] | opções reconhecidas, presets, TOML |
//! | [`SajdahPipeline`] | síncrono, uma thread (replay, testes) |
//! | [`Session`] | worker + `crossbeam-channel`, vários produtores |
//!
//! Amostras de um canal desligado são ignoradas; sem canais ativos a sessão
//! ainda aceita o toque manual.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;

pub use config::Settings;
pub use error::{SessionError, SessionResult};
pub use pipeline::{Diagnostics, SajdahPipeline};
pub use session::{Command, Session, SessionHandle};

// Re-exports para quem só depende da sessão
pub use sajdah_counter::{
    CounterEvent, CounterPhase, CounterSnapshot, EventBus, EventFilter, FeedbackKind, Subscription,
};
pub use sajdah_signal::MotionPreset;
pub use sajdah_core::prelude::*;
