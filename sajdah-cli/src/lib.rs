//! Biblioteca da CLI `sajdah`: scripts de amostras e simulação

pub mod error;
pub mod script;
pub mod simulate;

pub use error::{ScriptError, ScriptResult};
pub use script::{parse_script, read_script, replay, to_jsonl, ReplaySummary, ScriptLine};
pub use simulate::{generate, SimChannel, SimulationConfig};
