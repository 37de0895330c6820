//! # 🕌 sajdah-core — Tipos e Traits Fundamentais
//!
//! Base compartilhada por todos os crates do contador de rakat:
//!
//! | Módulo | Conteúdo |
//! |:-------|:---------|
//! | [`types`] | [`SensorSample`], [`CandidateEvent`], [`ChannelId`] |
//! | [`traits`] | [`SajdahComponent`], [`ThumpDetector`], [`ChannelError`] |
//!
//! ## Fluxo
//!
//! ```text
//! driver(s) → ThumpDetector (por canal) → CandidateEvent → contador → notificações
//! ```
//!
//! > *"Trait no core, implementação no módulo."*
//!
//! Os condicionadores concretos vivem em `sajdah-signal`, a máquina de estados
//! em `sajdah-counter`.

pub mod prelude;
pub mod traits;
pub mod types;

pub use traits::{ChannelError, ChannelResult, SajdahComponent, ThumpDetector};
pub use types::{CandidateEvent, ChannelId, SensorSample, TimestampMs, GRAVITY, now_ms};
