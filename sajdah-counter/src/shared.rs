//! Contador compartilhado entre threads (mutex + bus)

use std::sync::{Arc, Mutex};
use sajdah_core::prelude::*;
use crate::counter::{CounterConfig, SajdahCounter};
use crate::error::CounterResult;
use crate::events::{CounterEvent, EventBus};
use crate::state::CounterSnapshot;

/// Contador protegido por mutex.
///
/// Debounce e mutação acontecem na mesma aquisição do lock, e as notificações
/// são publicadas antes de soltá-lo: dois canais disparando quase juntos
/// nunca contam em dobro e os observadores veem os eventos na ordem aceita.
/// Handlers do bus não devem chamar de volta este contador. Um handler que entra
/// em pânico é isolado pelo bus e não envenena o lock.
#[derive(Debug, Clone)]
pub struct SharedCounter {
    inner: Arc<Mutex<SajdahCounter>>,
    bus: EventBus,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::with_config(CounterConfig::default(), EventBus::new())
    }

    pub fn with_config(config: CounterConfig, bus: EventBus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SajdahCounter::with_config(config))),
            bus,
        }
    }

    pub fn process_candidate_event(&self, now: TimestampMs) -> CounterResult<Vec<CounterEvent>> {
        let mut counter = self.inner.lock()?;
        let events = counter.process_candidate_event(now);
        self.bus.emit_all(&events)?;
        Ok(events)
    }

    pub fn process(&self, event: &CandidateEvent) -> CounterResult<Vec<CounterEvent>> {
        let mut counter = self.inner.lock()?;
        let events = counter.process(event);
        self.bus.emit_all(&events)?;
        Ok(events)
    }

    pub fn accept_now(&self) -> CounterResult<Vec<CounterEvent>> {
        self.process(&CandidateEvent::manual(now_ms()))
    }

    pub fn reset(&self) -> CounterResult<()> {
        let mut counter = self.inner.lock()?;
        let event = counter.reset();
        self.bus.emit(event)
    }

    pub fn snapshot(&self) -> CounterResult<CounterSnapshot> {
        Ok(self.inner.lock()?.snapshot())
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl Default for SharedCounter {
    fn default() -> Self {
        Self::new()
    }
}
