//! # Prelude — Re-exportações Convenientes
//!
//! ```
//! use sajdah_core::prelude::*;
//! ```

pub use crate::traits::{ChannelError, ChannelResult, SajdahComponent, ThumpDetector};
pub use crate::types::{CandidateEvent, ChannelId, SensorSample, TimestampMs, GRAVITY, now_ms};
