//! Pipeline síncrono: canais → contador → bus
//!
//! Dono único dos condicionadores e do contador. Quem precisa de threads usa
//! [`crate::Session`], que roda um `SajdahPipeline` dentro do worker.

use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use sajdah_counter::{CounterEvent, CounterSnapshot, EventBus, SajdahCounter};
use sajdah_signal::{AudioConditioner, AudioReading, MotionConditioner, MotionReading};
use crate::config::Settings;
use crate::error::SessionResult;

/// Linha de diagnóstico (força e volume ao vivo)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub motion: Option<MotionReading>,
    pub audio: Option<AudioReading>,
}

/// Pipeline de uma sessão
#[derive(Debug)]
pub struct SajdahPipeline {
    settings: Settings,
    motion: Option<MotionConditioner>,
    audio: Option<AudioConditioner>,
    counter: SajdahCounter,
    bus: EventBus,
}

impl SajdahPipeline {
    /// Cria pipeline com configuração padrão
    pub fn new() -> SessionResult<Self> {
        Self::with_settings(Settings::default(), EventBus::new())
    }

    /// Cria pipeline com configuração e bus específicos
    pub fn with_settings(settings: Settings, bus: EventBus) -> SessionResult<Self> {
        settings.validate()?;

        let motion = if settings.motion_enabled {
            Some(MotionConditioner::with_config(settings.motion_config())?)
        } else {
            None
        };

        let audio = if settings.audio_enabled {
            Some(AudioConditioner::with_config(settings.audio_config())?)
        } else {
            None
        };

        let counter = SajdahCounter::with_config(settings.counter_config());

        Ok(Self {
            settings,
            motion,
            audio,
            counter,
            bus,
        })
    }

    /// Amostra do acelerômetro (unidades de g)
    pub fn feed_motion_sample(
        &mut self,
        ax: f64,
        ay: f64,
        az: f64,
        timestamp: TimestampMs,
    ) -> SessionResult<Vec<CounterEvent>> {
        let candidate = match self.motion.as_mut() {
            Some(motion) => motion.feed(ax, ay, az, timestamp),
            None => return Ok(Vec::new()),
        };
        self.accept(candidate)
    }

    /// Nível do microfone (dBFS)
    pub fn feed_audio_level(&mut self, level_db: f64, timestamp: TimestampMs) -> SessionResult<Vec<CounterEvent>> {
        let candidate = match self.audio.as_mut() {
            Some(audio) => audio.feed(level_db, timestamp),
            None => return Ok(Vec::new()),
        };
        self.accept(candidate)
    }

    /// Amostra genérica, roteada pelo canal
    pub fn feed_sample(&mut self, sample: &SensorSample) -> SessionResult<Vec<CounterEvent>> {
        let candidate = match sample.channel {
            ChannelId::Motion => self.motion.as_mut().and_then(|m| m.push(sample)),
            ChannelId::Audio => self.audio.as_mut().and_then(|a| a.push(sample)),
            ChannelId::Manual => Some(CandidateEvent::manual(sample.timestamp)),
        };
        self.accept(candidate)
    }

    /// Toque manual; funciona mesmo sem canais ativos
    pub fn trigger_manual(&mut self, timestamp: TimestampMs) -> SessionResult<Vec<CounterEvent>> {
        self.accept(Some(CandidateEvent::manual(timestamp)))
    }

    fn accept(&mut self, candidate: Option<CandidateEvent>) -> SessionResult<Vec<CounterEvent>> {
        let Some(candidate) = candidate else {
            return Ok(Vec::new());
        };
        let events = self.counter.process(&candidate);
        self.bus.emit_all(&events)?;
        Ok(events)
    }

    /// Zera o contador e publica `Reset`
    pub fn reset(&mut self) -> SessionResult<()> {
        let event = self.counter.reset();
        self.bus.emit(event)?;
        Ok(())
    }

    /// Descarta os baselines (início/fim de captura)
    pub fn reset_channels(&mut self) {
        if let Some(motion) = self.motion.as_mut() {
            motion.reset();
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.reset();
        }
    }

    /// Canais ativos; vazio é um estado válido (só toque manual)
    pub fn active_channels(&self) -> Vec<ChannelId> {
        let mut channels = Vec::with_capacity(2);
        if self.motion.is_some() {
            channels.push(ChannelId::Motion);
        }
        if self.audio.is_some() {
            channels.push(ChannelId::Audio);
        }
        channels
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            motion: self.motion.as_ref().and_then(|m| m.last_reading().copied()),
            audio: self.audio.as_ref().and_then(|a| a.last_reading().copied()),
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.counter.snapshot()
    }

    pub fn counter(&self) -> &SajdahCounter {
        &self.counter
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_then_spike(pipeline: &mut SajdahPipeline, start: TimestampMs) -> Vec<CounterEvent> {
        let mut events = Vec::new();
        for i in 0..9 {
            events.extend(pipeline.feed_motion_sample(0.0, 0.0, 1.0, start + i * 20).unwrap());
        }
        events.extend(
            pipeline
                .feed_motion_sample(0.0, 0.0, 11.0 / GRAVITY, start + 180)
                .unwrap(),
        );
        events
    }

    #[test]
    fn test_motion_spike_counts() {
        let mut pipeline = SajdahPipeline::new().unwrap();
        let events = rest_then_spike(&mut pipeline, 0);

        assert_eq!(
            events,
            vec![CounterEvent::SajdahProgress { value: 1, timestamp: 180 }]
        );
        assert!(pipeline.diagnostics().motion.unwrap().triggered);

        let json = serde_json::to_string(&pipeline.diagnostics()).unwrap();
        assert!(json.contains("\"triggered\":true"));
        assert!(json.contains("\"audio\":null"));
    }

    #[test]
    fn test_disabled_audio_ignored() {
        let settings = Settings {
            audio_enabled: false,
            ..Settings::default()
        };
        let mut pipeline = SajdahPipeline::with_settings(settings, EventBus::new()).unwrap();

        assert!(pipeline.feed_audio_level(-5.0, 0).unwrap().is_empty());
        assert_eq!(pipeline.active_channels(), vec![ChannelId::Motion]);
        assert!(pipeline.diagnostics().audio.is_none());
    }

    #[test]
    fn test_no_channels_manual_only() {
        let settings = Settings {
            audio_enabled: false,
            motion_enabled: false,
            ..Settings::default()
        };
        let mut pipeline = SajdahPipeline::with_settings(settings, EventBus::new()).unwrap();
        assert!(pipeline.active_channels().is_empty());

        assert!(pipeline.feed_motion_sample(0.0, 0.0, 3.0, 0).unwrap().is_empty());
        pipeline.trigger_manual(0).unwrap();
        let events = pipeline.trigger_manual(2000).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(pipeline.snapshot().rakat_count, 1);
    }

    #[test]
    fn test_feed_sample_routes_by_channel() {
        let mut pipeline = SajdahPipeline::new().unwrap();
        let events = pipeline.feed_sample(&SensorSample::audio(-10.0, 0)).unwrap();
        assert_eq!(events.len(), 1);

        let events = pipeline
            .feed_sample(&SensorSample::new(ChannelId::Manual, 0.0, 1600))
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_reset_publishes() {
        let bus = EventBus::new();
        let sub = bus.subscribe_channel(sajdah_counter::EventFilter::Reset).unwrap();
        let mut pipeline = SajdahPipeline::with_settings(Settings::default(), bus).unwrap();

        pipeline.trigger_manual(0).unwrap();
        pipeline.reset().unwrap();

        assert_eq!(sub.drain(), vec![CounterEvent::Reset]);
        assert_eq!(pipeline.snapshot().sajdah_progress, 0);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = Settings {
            buffer_size: 0,
            ..Settings::default()
        };
        assert!(SajdahPipeline::with_settings(settings, EventBus::new()).is_err());
    }
}
