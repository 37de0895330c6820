//! Scripts de amostras (JSON lines)
//!
//! ```text
//! {"t": 1000, "motion": [0.01, -0.02, 1.18]}   # vetor em g
//! {"t": 1020, "audio": -12.5}                  # dBFS
//! {"t": 5000, "tap": true}                     # toque manual
//! {"reset": true}
//! ```
//!
//! Linhas vazias e linhas começando com `#` são ignoradas.

use std::path::Path;
use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use sajdah_counter::{CounterEvent, CounterSnapshot};
use sajdah_session::{SajdahPipeline, SessionResult};
use crate::error::{ScriptError, ScriptResult};

/// Um registro do script
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptLine {
    Motion { t: TimestampMs, motion: [f64; 3] },
    Audio { t: TimestampMs, audio: f64 },
    Tap { t: TimestampMs, tap: bool },
    Reset { reset: bool },
}

impl ScriptLine {
    pub fn timestamp(&self) -> Option<TimestampMs> {
        match self {
            ScriptLine::Motion { t, .. } | ScriptLine::Audio { t, .. } | ScriptLine::Tap { t, .. } => Some(*t),
            ScriptLine::Reset { .. } => None,
        }
    }

    /// Aplica o registro ao pipeline
    pub fn apply(&self, pipeline: &mut SajdahPipeline) -> SessionResult<Vec<CounterEvent>> {
        match *self {
            ScriptLine::Motion { t, motion: [ax, ay, az] } => pipeline.feed_motion_sample(ax, ay, az, t),
            ScriptLine::Audio { t, audio } => pipeline.feed_audio_level(audio, t),
            ScriptLine::Tap { t, tap: true } => pipeline.trigger_manual(t),
            ScriptLine::Reset { reset: true } => {
                pipeline.reset()?;
                Ok(vec![CounterEvent::Reset])
            }
            ScriptLine::Tap { tap: false, .. } | ScriptLine::Reset { reset: false } => Ok(Vec::new()),
        }
    }
}

/// Faz o parse de um script inteiro
pub fn parse_script(content: &str) -> ScriptResult<Vec<ScriptLine>> {
    let mut lines = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let line = serde_json::from_str::<ScriptLine>(trimmed).map_err(|e| ScriptError::Parse {
            line: idx + 1,
            message: format!("unrecognized record ({})", e),
        })?;
        lines.push(line);
    }

    Ok(lines)
}

pub fn read_script(path: &Path) -> ScriptResult<Vec<ScriptLine>> {
    let content = std::fs::read_to_string(path)?;
    parse_script(&content)
}

/// Serializa como JSON lines
pub fn to_jsonl(lines: &[ScriptLine]) -> ScriptResult<String> {
    let mut out = String::with_capacity(lines.len() * 48);
    for line in lines {
        let json = serde_json::to_string(line).map_err(|e| ScriptError::Parse {
            line: 0,
            message: e.to_string(),
        })?;
        out.push_str(&json);
        out.push('\n');
    }
    Ok(out)
}

/// Resultado de um replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub records: usize,
    pub notifications: usize,
    pub snapshot: CounterSnapshot,
}

/// Reproduz o script, entregando cada notificação ao `sink` em ordem
pub fn replay<F>(pipeline: &mut SajdahPipeline, lines: &[ScriptLine], mut sink: F) -> ScriptResult<ReplaySummary>
where
    F: FnMut(&CounterEvent),
{
    let mut notifications = 0;

    for line in lines {
        for event in line.apply(pipeline)? {
            notifications += 1;
            sink(&event);
        }
    }

    tracing::debug!(records = lines.len(), notifications, "replay finished");

    Ok(ReplaySummary {
        records: lines.len(),
        notifications,
        snapshot: pipeline.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_record_kind() {
        let script = r#"
            # cabeçalho
            {"t": 0, "motion": [0.0, 0.0, 1.0]}
            {"t": 20, "audio": -42.5}
            {"t": 40, "tap": true}

            {"reset": true}
        "#;

        let lines = parse_script(script).unwrap();
        assert_eq!(
            lines,
            vec![
                ScriptLine::Motion { t: 0, motion: [0.0, 0.0, 1.0] },
                ScriptLine::Audio { t: 20, audio: -42.5 },
                ScriptLine::Tap { t: 40, tap: true },
                ScriptLine::Reset { reset: true },
            ]
        );
        assert_eq!(lines[3].timestamp(), None);
    }

    #[test]
    fn test_malformed_line_reports_number() {
        let script = "{\"t\": 0, \"audio\": -40}\n{\"t\": \"soon\"}\n";
        match parse_script(script) {
            Err(ScriptError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_audio_level_accepted() {
        let lines = parse_script(r#"{"t": 5, "audio": -10}"#).unwrap();
        assert_eq!(lines, vec![ScriptLine::Audio { t: 5, audio: -10.0 }]);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let lines = vec![
            ScriptLine::Tap { t: 40, tap: true },
            ScriptLine::Reset { reset: true },
        ];
        let text = to_jsonl(&lines).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(parse_script(&text).unwrap(), lines);
    }

    #[test]
    fn test_replay_counts_and_notifies() {
        let script = r#"
            {"t": 0, "tap": true}
            {"t": 500, "tap": true}
            {"t": 1600, "tap": true}
            {"t": 1700, "tap": false}
        "#;
        let lines = parse_script(script).unwrap();
        let mut pipeline = SajdahPipeline::new().unwrap();
        let mut seen = Vec::new();

        let summary = replay(&mut pipeline, &lines, |e| seen.push(*e)).unwrap();

        assert_eq!(summary.records, 4);
        assert_eq!(summary.notifications, 3);
        assert_eq!(summary.snapshot.rakat_count, 1);
        assert_eq!(seen.last(), Some(&CounterEvent::RakatComplete { count: 1, timestamp: 1600 }));
    }

    #[test]
    fn test_replay_reset_record() {
        let lines = parse_script("{\"t\": 0, \"tap\": true}\n{\"reset\": true}\n").unwrap();
        let mut pipeline = SajdahPipeline::new().unwrap();
        let mut seen = Vec::new();

        replay(&mut pipeline, &lines, |e| seen.push(*e)).unwrap();

        assert_eq!(seen.last(), Some(&CounterEvent::Reset));
        assert_eq!(pipeline.snapshot().sajdah_progress, 0);
        assert_eq!(pipeline.snapshot().last_accepted_event_time, None);
    }
}
