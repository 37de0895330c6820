//! Testes do módulo sajdah-signal

use super::*;

fn feed_magnitudes(conditioner: &mut MotionConditioner, values: &[f64]) -> Vec<CandidateEvent> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| conditioner.feed_magnitude(m, i as u64 * 20))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTES DE MOTION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_motion_creation() {
    let motion = MotionConditioner::new().unwrap();
    assert_eq!(motion.name(), "MotionConditioner");
    assert_eq!(motion.channel(), ChannelId::Motion);
    assert!(motion.is_ready());
    assert_eq!(motion.config(), &MotionPreset::Sensitive.config());
    assert_eq!(motion.baseline(), None);
}

#[test]
fn test_motion_presets() {
    let sensitive = MotionPreset::Sensitive.config();
    assert_eq!(sensitive.delta_threshold, 0.6);
    assert_eq!(sensitive.absolute_threshold, 10.1);
    assert_eq!(sensitive.buffer_size, 10);

    let firm = MotionPreset::Firm.config();
    assert_eq!(firm.delta_threshold, 0.8);
    assert_eq!(firm.absolute_threshold, 10.2);

    assert_eq!("FIRM".parse::<MotionPreset>().unwrap(), MotionPreset::Firm);
    assert!("gentle".parse::<MotionPreset>().is_err());
}

#[test]
fn test_motion_invalid_config() {
    let config = MotionConfig {
        buffer_size: 0,
        ..MotionConfig::default()
    };
    assert_eq!(
        MotionConditioner::with_config(config).unwrap_err(),
        SignalError::InvalidBufferSize(0)
    );

    let config = MotionConfig {
        delta_threshold: f64::NAN,
        ..MotionConfig::default()
    };
    assert!(MotionConditioner::with_config(config).is_err());

    let config = MotionConfig {
        absolute_threshold: -1.0,
        ..MotionConfig::default()
    };
    assert!(MotionConditioner::with_config(config).is_err());
}

#[test]
fn test_motion_constant_gravity_never_triggers() {
    let mut motion = MotionConditioner::new().unwrap();

    for i in 0..10_000u64 {
        assert!(motion.feed(0.0, 0.0, 1.0, i * 20).is_none());
    }

    let baseline = motion.baseline().unwrap();
    assert!((baseline - GRAVITY).abs() < 1e-9);

    let reading = motion.last_reading().unwrap();
    assert!(reading.delta.abs() < 1e-9);
    assert_eq!(motion.events_emitted(), 0);
    assert_eq!(motion.samples_seen(), 10_000);
}

#[test]
fn test_motion_constant_high_magnitude_never_triggers() {
    // Magnitude acima do limiar absoluto, mas delta ~0
    let mut motion = MotionConditioner::new().unwrap();
    let events = feed_magnitudes(&mut motion, &[10.5; 500]);
    assert!(events.is_empty());
}

#[test]
fn test_motion_spike_after_rest() {
    let mut values = vec![GRAVITY; 9];
    values.push(11.0);

    for preset in [MotionPreset::Sensitive, MotionPreset::Firm] {
        let mut motion = MotionConditioner::with_preset(preset).unwrap();
        let events = feed_magnitudes(&mut motion, &values);

        assert_eq!(events.len(), 1, "preset {}", preset.as_str());
        assert_eq!(events[0].timestamp, 9 * 20);
        assert_eq!(events[0].channel, ChannelId::Motion);

        let reading = motion.last_reading().unwrap();
        assert!(reading.triggered);
        assert!((reading.baseline - 9.929).abs() < 1e-9);
        assert!((reading.delta - 1.071).abs() < 1e-9);
    }
}

#[test]
fn test_motion_spike_only_on_spike_sample() {
    let mut motion = MotionConditioner::new().unwrap();
    let mut values = vec![GRAVITY; 9];
    values.push(11.0);
    values.extend([GRAVITY; 20]);

    let events = feed_magnitudes(&mut motion, &values);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestamp, 180);
}

#[test]
fn test_motion_slow_tilt_rejected() {
    // Rampa lenta de 9.81 a ~12.8: magnitude alta, delta pequeno
    let mut motion = MotionConditioner::new().unwrap();
    let values: Vec<f64> = (0..300).map(|i| GRAVITY + i as f64 * 0.01).collect();

    assert!(feed_magnitudes(&mut motion, &values).is_empty());
    assert!(motion.last_reading().unwrap().magnitude > 12.0);
}

#[test]
fn test_motion_small_jitter_rejected() {
    // Delta alto, magnitude abaixo do limiar absoluto
    let mut motion = MotionConditioner::new().unwrap();
    let mut values = vec![8.0; 9];
    values.push(9.5);

    assert!(feed_magnitudes(&mut motion, &values).is_empty());
    assert!(motion.last_reading().unwrap().delta > 1.0);
}

#[test]
fn test_firm_rejects_what_sensitive_accepts() {
    // baseline 9.52, delta 0.63, magnitude 10.15
    let mut values = vec![9.45; 9];
    values.push(10.15);

    let mut sensitive = MotionConditioner::with_preset(MotionPreset::Sensitive).unwrap();
    let mut firm = MotionConditioner::with_preset(MotionPreset::Firm).unwrap();

    assert_eq!(feed_magnitudes(&mut sensitive, &values).len(), 1);
    assert!(feed_magnitudes(&mut firm, &values).is_empty());
}

#[test]
fn test_motion_non_finite_dropped() {
    let mut motion = MotionConditioner::new().unwrap();
    assert!(motion.feed(f64::NAN, 0.0, 1.0, 0).is_none());
    assert!(motion.feed_magnitude(f64::INFINITY, 0).is_none());
    assert_eq!(motion.samples_seen(), 0);
    assert_eq!(motion.baseline(), None);
}

#[test]
fn test_motion_ignores_audio_sample() {
    let mut motion = MotionConditioner::new().unwrap();
    assert!(motion.push(&SensorSample::audio(-5.0, 0)).is_none());
    assert_eq!(motion.samples_seen(), 0);
}

#[test]
fn test_motion_reset_clears_baseline() {
    let mut motion = MotionConditioner::new().unwrap();
    feed_magnitudes(&mut motion, &[GRAVITY; 5]);
    assert!(motion.baseline().is_some());

    motion.reset();
    assert_eq!(motion.baseline(), None);
    assert!(motion.last_reading().is_none());
}

#[test]
fn test_motion_configure_resizes_buffer() {
    let mut motion = MotionConditioner::new().unwrap();
    feed_magnitudes(&mut motion, &[GRAVITY; 5]);

    let config = MotionConfig {
        buffer_size: 3,
        ..MotionPreset::Firm.config()
    };
    motion.configure(config.clone()).unwrap();
    assert_eq!(motion.config(), &config);
    assert_eq!(motion.baseline(), None);

    let bad = MotionConfig {
        buffer_size: 0,
        ..config
    };
    assert!(motion.configure(bad).is_err());
    assert_eq!(motion.config().buffer_size, 3);
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTES DE AUDIO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_audio_creation() {
    let audio = AudioConditioner::new().unwrap();
    assert_eq!(audio.name(), "AudioConditioner");
    assert_eq!(audio.channel(), ChannelId::Audio);
    assert_eq!(audio.config().volume_threshold, -30.0);
    assert!(!audio.config().ambient_tracking);
    assert_eq!(audio.noise_floor(), None);
}

#[test]
fn test_audio_threshold_is_strict() {
    let mut audio = AudioConditioner::new().unwrap();
    assert!(audio.feed(-40.0, 0).is_none());
    assert!(audio.feed(-30.0, 50).is_none());

    let event = audio.feed(-29.9, 100).unwrap();
    assert_eq!(event.channel, ChannelId::Audio);
    assert_eq!(event.timestamp, 100);
    assert_eq!(audio.events_emitted(), 1);
}

#[test]
fn test_audio_every_loud_sample_is_a_candidate() {
    // Sem debounce aqui: isso é papel do contador
    let mut audio = AudioConditioner::new().unwrap();
    let events: Vec<_> = (0..5).filter_map(|i| audio.feed(-12.0, i * 50)).collect();
    assert_eq!(events.len(), 5);
}

#[test]
fn test_audio_level_clamped() {
    let mut audio = AudioConditioner::new().unwrap();

    assert!(audio.feed(5.0, 0).is_some());
    assert_eq!(audio.last_reading().unwrap().level, DBFS_MAX);

    assert!(audio.feed(-400.0, 50).is_none());
    assert_eq!(audio.last_reading().unwrap().level, DBFS_MIN);
}

#[test]
fn test_audio_non_finite_dropped() {
    let mut audio = AudioConditioner::new().unwrap();
    assert!(audio.feed(f64::NAN, 0).is_none());
    assert_eq!(audio.samples_seen(), 0);
    assert!(audio.last_reading().is_none());
}

#[test]
fn test_audio_invalid_config() {
    let config = AudioConfig {
        volume_threshold: 10.0,
        ..AudioConfig::default()
    };
    assert!(AudioConditioner::with_config(config).is_err());

    let config = AudioConfig {
        floor_margin_db: -1.0,
        ..AudioConfig::default()
    };
    assert!(AudioConditioner::with_config(config).is_err());

    let config = AudioConfig {
        buffer_size: MAX_BUFFER_SIZE + 1,
        ..AudioConfig::default()
    };
    assert!(AudioConditioner::with_config(config).is_err());
}

#[test]
fn test_audio_ambient_tracking_rejects_loud_room() {
    let config = AudioConfig {
        ambient_tracking: true,
        floor_margin_db: 10.0,
        ..AudioConfig::default()
    };
    let mut audio = AudioConditioner::with_config(config).unwrap();

    // Primeira amostra não tem piso: vale a regra de referência
    let first = audio.feed(-25.0, 0);
    assert!(first.is_some());

    // Sala barulhenta constante em -25 dB: acima do limiar, mas não do piso
    let events: Vec<_> = (1..40).filter_map(|i| audio.feed(-25.0, i * 50)).collect();
    assert!(events.is_empty());
    assert!((audio.noise_floor().unwrap() + 25.0).abs() < 1e-9);

    // Pico real
    assert!(audio.feed(-10.0, 2000).is_some());
    let reading = audio.last_reading().unwrap();
    assert!((reading.floor.unwrap() + 25.0).abs() < 1e-9);
}

#[test]
fn test_audio_ignores_motion_sample() {
    let mut audio = AudioConditioner::new().unwrap();
    assert!(audio.push(&SensorSample::motion(0.0, 0.0, 2.0, 0)).is_none());
    assert_eq!(audio.samples_seen(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTES DE INTEGRAÇÃO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_detectors_as_trait_objects() {
    let mut detectors: Vec<Box<dyn ThumpDetector>> = vec![
        Box::new(MotionConditioner::new().unwrap()),
        Box::new(AudioConditioner::new().unwrap()),
    ];

    let mut samples: Vec<SensorSample> = (0..9)
        .map(|i| SensorSample::motion(0.0, 0.0, 1.0, i * 20))
        .collect();
    samples.push(SensorSample::motion(0.0, 0.0, 11.0 / GRAVITY, 180));
    samples.push(SensorSample::audio(-20.0, 185));

    let events: Vec<CandidateEvent> = detectors
        .iter_mut()
        .flat_map(|d| d.push_batch(&samples))
        .collect();

    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| e.channel == ChannelId::Motion && e.timestamp == 180));
    assert!(events.iter().any(|e| e.channel == ChannelId::Audio && e.timestamp == 185));
}

#[test]
fn test_reading_serializes() {
    let mut motion = MotionConditioner::new().unwrap();
    motion.feed(0.0, 0.0, 1.0, 0);

    let json = serde_json::to_string(motion.last_reading().unwrap()).unwrap();
    assert!(json.contains("\"magnitude\""));
    assert!(json.contains("\"triggered\":false"));
}
