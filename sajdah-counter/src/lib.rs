//! # 📿 sajdah-counter — Máquina de Estados Sajdah/Rakat
//!
//! Fonte única da verdade para as contagens. Recebe eventos candidatos de
//! qualquer canal, aplica o debounce e dobra as sajdahs aceitas em rakats
//! (2 sajdahs = 1 rakat, fixo).
//!
//! ## Notificações
//!
//! | Evento | Quando | Feedback |
//! |:-------|:-------|:---------|
//! | `SajdahProgress { value: 1 \| 2 }` | toda sajdah aceita | `Heavy` |
//! | `RakatComplete { count }` | segunda sajdah do ciclo | `Success` |
//! | `Reset` | reset explícito | `Warning` |
//!
//! ## Exemplo
//!
//! ```ignore
//! use sajdah_counter::SajdahCounter;
//!
//! let mut counter = SajdahCounter::new();
//! counter.process_candidate_event(0);     // progress(1)
//! counter.process_candidate_event(500);   // descartado (cooldown)
//! counter.process_candidate_event(1600);  // progress(2) + rakat(1)
//! ```

pub mod counter;
pub mod error;
pub mod events;
pub mod shared;
pub mod state;

pub use counter::{CounterConfig, CounterStats, SajdahCounter, DEFAULT_COOLDOWN_MS};
pub use error::{CounterError, CounterResult};
pub use events::{CounterEvent, EventBus, EventFilter, EventHandler, FeedbackKind, Subscription};
pub use shared::SharedCounter;
pub use state::{CounterPhase, CounterSnapshot, CounterState, SAJDAHS_PER_RAKAT};

// Re-export core types
pub use sajdah_core::prelude::*;
