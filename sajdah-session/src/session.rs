//! # Session Actor
//!
//! Um worker dono do [`SajdahPipeline`]; produtores (drivers de sensor, UI)
//! enviam [`Command`]s por um canal crossbeam sem bloquear.
//!
//! ```ignore
//! use sajdah_session::{Session, Settings};
//!
//! let mut session = Session::spawn(Settings::default())?;
//! let events = session.subscribe(EventFilter::All)?;
//! session.start()?;
//!
//! // thread do acelerômetro
//! let motion = session.handle();
//! motion.feed_motion_sample(0.0, 0.0, 1.0, now_ms())?;
//!
//! session.shutdown()?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use sajdah_core::prelude::*;
use sajdah_counter::{CounterEvent, CounterSnapshot, EventBus, EventFilter, Subscription};
use crate::config::Settings;
use crate::error::{SessionError, SessionResult};
use crate::pipeline::{Diagnostics, SajdahPipeline};

/// Mensagens processadas pelo worker, em ordem de chegada
#[derive(Debug)]
pub enum Command {
    Motion {
        ax: f64,
        ay: f64,
        az: f64,
        timestamp: TimestampMs,
    },
    Audio {
        level_db: f64,
        timestamp: TimestampMs,
    },
    Manual {
        timestamp: TimestampMs,
    },
    Reset,
    /// Início da captura: descarta baselines antigos
    Start,
    /// Fim da captura
    Stop,
    Snapshot(Sender<CounterSnapshot>),
    Diagnostics(Sender<Diagnostics>),
    Shutdown,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLE (PRODUTORES)
// ═══════════════════════════════════════════════════════════════════════════════

/// Lado produtor da sessão; barato de clonar, um por thread de sensor
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: Sender<Command>,
    active: Arc<AtomicBool>,
    worker: ThreadId,
}

impl SessionHandle {
    fn send(&self, command: Command) -> SessionResult<()> {
        self.commands.send(command).map_err(|_| SessionError::WorkerGone)
    }

    /// Consultas esperam resposta do worker; vindas dele mesmo nunca voltariam
    fn query<T>(&self, command: impl FnOnce(Sender<T>) -> Command) -> SessionResult<T> {
        if thread::current().id() == self.worker {
            return Err(SessionError::ReentrantQuery);
        }
        let (reply, rx) = bounded(1);
        self.send(command(reply))?;
        rx.recv().map_err(|_| SessionError::WorkerGone)
    }

    /// Captura ligada?
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Amostra do acelerômetro; descartada com a sessão parada.
    /// Retorna se a amostra foi enfileirada.
    pub fn feed_motion_sample(&self, ax: f64, ay: f64, az: f64, timestamp: TimestampMs) -> SessionResult<bool> {
        if !self.is_active() {
            return Ok(false);
        }
        self.send(Command::Motion { ax, ay, az, timestamp })?;
        Ok(true)
    }

    /// Nível do microfone; descartado com a sessão parada
    pub fn feed_audio_level(&self, level_db: f64, timestamp: TimestampMs) -> SessionResult<bool> {
        if !self.is_active() {
            return Ok(false);
        }
        self.send(Command::Audio { level_db, timestamp })?;
        Ok(true)
    }

    /// Toque manual; conta mesmo com a sessão parada
    pub fn trigger_manual(&self, timestamp: TimestampMs) -> SessionResult<()> {
        self.send(Command::Manual { timestamp })
    }

    pub fn trigger_manual_now(&self) -> SessionResult<()> {
        self.trigger_manual(now_ms())
    }

    pub fn reset(&self) -> SessionResult<()> {
        self.send(Command::Reset)
    }

    /// Estado após todos os comandos já enviados por este produtor
    pub fn snapshot(&self) -> SessionResult<CounterSnapshot> {
        self.query(Command::Snapshot)
    }

    pub fn diagnostics(&self) -> SessionResult<Diagnostics> {
        self.query(Command::Diagnostics)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Sessão de oração com worker próprio
#[derive(Debug)]
pub struct Session {
    handle: SessionHandle,
    bus: EventBus,
    settings: Settings,
    worker: Option<JoinHandle<()>>,
}

impl Session {
    /// Valida a configuração e sobe o worker. A sessão nasce parada.
    pub fn spawn(settings: Settings) -> SessionResult<Self> {
        Self::with_bus(settings, EventBus::new())
    }

    /// Como [`Session::spawn`], publicando em um bus existente
    pub fn with_bus(settings: Settings, bus: EventBus) -> SessionResult<Self> {
        let pipeline = SajdahPipeline::with_settings(settings.clone(), bus.clone())?;
        let (commands, inbox) = unbounded();

        let worker = thread::Builder::new()
            .name("sajdah-session".into())
            .spawn(move || run_worker(pipeline, inbox))
            .map_err(|e| SessionError::Spawn(e.to_string()))?;

        tracing::debug!(
            motion = settings.motion_enabled,
            audio = settings.audio_enabled,
            cooldown_ms = settings.cooldown_ms,
            "session worker spawned"
        );

        Ok(Self {
            handle: SessionHandle {
                commands,
                active: Arc::new(AtomicBool::new(false)),
                worker: worker.thread().id(),
            },
            bus,
            settings,
            worker: Some(worker),
        })
    }

    /// Novo produtor
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Liga a captura dos canais
    pub fn start(&self) -> SessionResult<()> {
        // Start entra na fila antes de qualquer amostra aceita pelo flag
        self.handle.send(Command::Start)?;
        self.handle.active.store(true, Ordering::Release);
        Ok(())
    }

    /// Desliga a captura; amostras já enfileiradas ainda podem contar
    pub fn stop(&self) -> SessionResult<()> {
        self.handle.active.store(false, Ordering::Release);
        self.handle.send(Command::Stop)
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    pub fn feed_motion_sample(&self, ax: f64, ay: f64, az: f64, timestamp: TimestampMs) -> SessionResult<bool> {
        self.handle.feed_motion_sample(ax, ay, az, timestamp)
    }

    pub fn feed_audio_level(&self, level_db: f64, timestamp: TimestampMs) -> SessionResult<bool> {
        self.handle.feed_audio_level(level_db, timestamp)
    }

    pub fn trigger_manual(&self, timestamp: TimestampMs) -> SessionResult<()> {
        self.handle.trigger_manual(timestamp)
    }

    pub fn reset(&self) -> SessionResult<()> {
        self.handle.reset()
    }

    pub fn snapshot(&self) -> SessionResult<CounterSnapshot> {
        self.handle.snapshot()
    }

    pub fn diagnostics(&self) -> SessionResult<Diagnostics> {
        self.handle.diagnostics()
    }

    /// Assina notificações por canal
    pub fn subscribe(&self, filter: EventFilter) -> SessionResult<Subscription> {
        Ok(self.bus.subscribe_channel(filter)?)
    }

    /// Assina notificações por callback.
    ///
    /// O callback roda na thread do worker: comandos de um [`SessionHandle`]
    /// (toque, reset) podem ser enviados dali, mas `snapshot`/`diagnostics`
    /// retornam [`SessionError::ReentrantQuery`]. Um callback que entra em
    /// pânico é isolado e o worker segue vivo.
    pub fn on_event<F>(&self, filter: EventFilter, handler: F) -> SessionResult<()>
    where
        F: Fn(&CounterEvent) + Send + Sync + 'static,
    {
        Ok(self.bus.subscribe(filter, handler)?)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Encerra o worker após drenar a fila
    pub fn shutdown(&mut self) -> SessionResult<()> {
        self.handle.active.store(false, Ordering::Release);
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        // Worker já pode ter saído; o join decide
        let _ = self.handle.send(Command::Shutdown);
        worker.join().map_err(|_| SessionError::WorkerGone)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(%err, "session worker did not shut down cleanly");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WORKER
// ═══════════════════════════════════════════════════════════════════════════════

fn run_worker(mut pipeline: SajdahPipeline, inbox: Receiver<Command>) {
    for command in inbox.iter() {
        let result = match command {
            Command::Motion { ax, ay, az, timestamp } => {
                pipeline.feed_motion_sample(ax, ay, az, timestamp).map(drop)
            }
            Command::Audio { level_db, timestamp } => pipeline.feed_audio_level(level_db, timestamp).map(drop),
            Command::Manual { timestamp } => pipeline.trigger_manual(timestamp).map(drop),
            Command::Reset => pipeline.reset(),
            Command::Start => {
                pipeline.reset_channels();
                tracing::info!(channels = ?pipeline.active_channels(), "session started");
                Ok(())
            }
            Command::Stop => {
                pipeline.reset_channels();
                tracing::info!(rakats = pipeline.counter().rakat_count(), "session stopped");
                Ok(())
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(pipeline.snapshot());
                Ok(())
            }
            Command::Diagnostics(reply) => {
                let _ = reply.send(pipeline.diagnostics());
                Ok(())
            }
            Command::Shutdown => break,
        };

        if let Err(err) = result {
            tracing::warn!(%err, "session command failed");
        }
    }
    tracing::debug!("session worker exiting");
}
