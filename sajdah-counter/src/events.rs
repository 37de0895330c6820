//! Notificações emitidas pelo contador e bus de observadores

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use sajdah_core::prelude::*;
use crate::error::{CounterError, CounterResult};

/// Notificação do contador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CounterEvent {
    /// Sajdah aceita; `value` é 1 ou 2 (nunca 0 no fim do ciclo)
    SajdahProgress { value: u8, timestamp: TimestampMs },
    /// Rakat completo; emitido logo após o progresso 2
    RakatComplete { count: u64, timestamp: TimestampMs },
    /// Contador zerado
    Reset,
}

impl CounterEvent {
    /// Pulso de feedback correspondente
    pub fn feedback(&self) -> FeedbackKind {
        match self {
            CounterEvent::SajdahProgress { .. } => FeedbackKind::Heavy,
            CounterEvent::RakatComplete { .. } => FeedbackKind::Success,
            CounterEvent::Reset => FeedbackKind::Warning,
        }
    }

    pub fn timestamp(&self) -> Option<TimestampMs> {
        match self {
            CounterEvent::SajdahProgress { timestamp, .. }
            | CounterEvent::RakatComplete { timestamp, .. } => Some(*timestamp),
            CounterEvent::Reset => None,
        }
    }
}

/// Tipo de pulso háptico que a apresentação deve disparar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// Impacto forte (sajdah)
    Heavy,
    /// Notificação de sucesso (rakat)
    Success,
    /// Notificação de aviso (reset)
    Warning,
}

/// Handler de eventos (callback)
pub type EventHandler = Arc<dyn Fn(&CounterEvent) + Send + Sync>;

/// Filtro de eventos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    /// Todos os eventos
    All,
    /// Apenas progresso de sajdah
    Progress,
    /// Apenas rakats completos
    Rakat,
    /// Apenas resets
    Reset,
}

impl EventFilter {
    /// Verifica se um evento passa pelo filtro
    pub fn matches(&self, event: &CounterEvent) -> bool {
        matches!(
            (self, event),
            (EventFilter::All, _)
                | (EventFilter::Progress, CounterEvent::SajdahProgress { .. })
                | (EventFilter::Rakat, CounterEvent::RakatComplete { .. })
                | (EventFilter::Reset, CounterEvent::Reset)
        )
    }
}

/// Recebe eventos por canal (polling ou iteração bloqueante)
pub struct Subscription {
    receiver: Receiver<CounterEvent>,
    filter: EventFilter,
}

impl Subscription {
    /// Tenta receber sem bloquear
    pub fn try_recv(&self) -> Option<CounterEvent> {
        self.receiver.try_recv().ok()
    }

    /// Recebe bloqueando
    pub fn recv(&self) -> CounterResult<CounterEvent> {
        self.receiver.recv().map_err(|_| CounterError::Disconnected)
    }

    /// Recebe com timeout
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<CounterEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Drena tudo que já chegou
    pub fn drain(&self) -> Vec<CounterEvent> {
        self.receiver.try_iter().collect()
    }

    pub fn filter(&self) -> EventFilter {
        self.filter
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

struct FilteredSender {
    filter: EventFilter,
    sender: Sender<CounterEvent>,
}

/// Bus de eventos
#[derive(Clone)]
pub struct EventBus {
    /// Handlers em ordem de registro
    handlers: Arc<Mutex<Vec<(EventFilter, EventHandler)>>>,
    /// Subscribers por canal
    senders: Arc<Mutex<Vec<FilteredSender>>>,
    /// Histórico de eventos (limitado)
    history: Arc<Mutex<VecDeque<CounterEvent>>>,
    /// Tamanho máximo do histórico
    max_history: usize,
}

impl EventBus {
    /// Cria novo bus de eventos
    pub fn new() -> Self {
        Self::with_history(100)
    }

    /// Cria com tamanho de histórico customizado
    pub fn with_history(max_history: usize) -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Vec::new())),
            senders: Arc::new(Mutex::new(Vec::new())),
            history: Arc::new(Mutex::new(VecDeque::with_capacity(max_history))),
            max_history,
        }
    }

    /// Registra handler para um filtro.
    ///
    /// Handlers rodam na thread que emite, em ordem de registro,
    /// independentemente do filtro.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> CounterResult<()>
    where
        F: Fn(&CounterEvent) + Send + Sync + 'static,
    {
        self.handlers.lock()?.push((filter, Arc::new(handler)));
        Ok(())
    }

    /// Cria subscription por canal
    pub fn subscribe_channel(&self, filter: EventFilter) -> CounterResult<Subscription> {
        let (sender, receiver) = unbounded();
        self.senders.lock()?.push(FilteredSender { filter, sender });
        Ok(Subscription { receiver, filter })
    }

    /// Remove todos os handlers de um filtro
    pub fn unsubscribe(&self, filter: &EventFilter) -> CounterResult<()> {
        self.handlers.lock()?.retain(|(f, _)| f != filter);
        Ok(())
    }

    /// Emite um evento
    ///
    /// Handlers rodam fora do lock do bus, então podem consultar o histórico.
    /// Um handler que entra em pânico é isolado e registrado em log; os
    /// demais handlers e o chamador seguem normalmente.
    pub fn emit(&self, event: CounterEvent) -> CounterResult<()> {
        if self.max_history > 0 {
            let mut history = self.history.lock()?;
            if history.len() == self.max_history {
                history.pop_front();
            }
            history.push_back(event);
        }

        {
            // Subscriptions descartadas são removidas aqui
            let mut senders = self.senders.lock()?;
            senders.retain(|fs| !fs.filter.matches(&event) || fs.sender.send(event).is_ok());
        }

        let matching: Vec<EventHandler> = {
            let handlers = self.handlers.lock()?;
            handlers
                .iter()
                .filter(|(filter, _)| filter.matches(&event))
                .map(|(_, handler)| handler.clone())
                .collect()
        };

        for handler in matching {
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                tracing::warn!(?event, "event handler panicked");
            }
        }

        Ok(())
    }

    /// Emite vários eventos em ordem
    pub fn emit_all(&self, events: &[CounterEvent]) -> CounterResult<()> {
        for event in events {
            self.emit(*event)?;
        }
        Ok(())
    }

    /// Retorna histórico de eventos
    pub fn history(&self) -> CounterResult<Vec<CounterEvent>> {
        let history = self.history.lock()?;
        Ok(history.iter().copied().collect())
    }

    /// Limpa histórico
    pub fn clear_history(&self) -> CounterResult<()> {
        self.history.lock()?.clear();
        Ok(())
    }

    /// Conta handlers registrados
    pub fn handler_count(&self) -> CounterResult<usize> {
        let handlers = self.handlers.lock()?;
        Ok(handlers.len())
    }

    /// Conta subscriptions por canal ainda ativas
    pub fn subscriber_count(&self) -> CounterResult<usize> {
        Ok(self.senders.lock()?.len())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("max_history", &self.max_history)
            .field("history_len", &self.history.lock().map(|h| h.len()).unwrap_or(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn progress(value: u8, timestamp: TimestampMs) -> CounterEvent {
        CounterEvent::SajdahProgress { value, timestamp }
    }

    #[test]
    fn test_event_bus_new() {
        let bus = EventBus::new();
        assert_eq!(bus.handler_count().unwrap(), 0);
        assert_eq!(bus.subscriber_count().unwrap(), 0);
    }

    #[test]
    fn test_emit_event() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        bus.subscribe(EventFilter::All, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        bus.emit(progress(1, 0)).unwrap();
        bus.emit(CounterEvent::Reset).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_filter_rakat() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        bus.subscribe(EventFilter::Rakat, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        bus.emit(progress(1, 0)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        bus.emit(CounterEvent::RakatComplete { count: 1, timestamp: 1600 }).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_filter_matches() {
        assert!(EventFilter::Progress.matches(&progress(2, 0)));
        assert!(!EventFilter::Progress.matches(&CounterEvent::Reset));
        assert!(EventFilter::Reset.matches(&CounterEvent::Reset));
        assert!(EventFilter::All.matches(&CounterEvent::Reset));
    }

    #[test]
    fn test_history_limit() {
        let bus = EventBus::with_history(2);
        for i in 0..5 {
            bus.emit(progress(1, i)).unwrap();
        }

        let history = bus.history().unwrap();
        assert_eq!(history, vec![progress(1, 3), progress(1, 4)]);

        bus.clear_history().unwrap();
        assert!(bus.history().unwrap().is_empty());
    }

    #[test]
    fn test_history_disabled() {
        let bus = EventBus::with_history(0);
        bus.emit(progress(1, 0)).unwrap();
        assert!(bus.history().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        bus.subscribe(EventFilter::Progress, |_| {}).unwrap();
        bus.subscribe(EventFilter::Progress, |_| {}).unwrap();
        assert_eq!(bus.handler_count().unwrap(), 2);

        bus.unsubscribe(&EventFilter::Progress).unwrap();
        assert_eq!(bus.handler_count().unwrap(), 0);
    }

    #[test]
    fn test_channel_subscription() {
        let bus = EventBus::new();
        let rakats = bus.subscribe_channel(EventFilter::Rakat).unwrap();
        let all = bus.subscribe_channel(EventFilter::All).unwrap();

        bus.emit(progress(1, 0)).unwrap();
        bus.emit(progress(2, 1600)).unwrap();
        bus.emit(CounterEvent::RakatComplete { count: 1, timestamp: 1600 }).unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(
            rakats.drain(),
            vec![CounterEvent::RakatComplete { count: 1, timestamp: 1600 }]
        );
        assert_eq!(rakats.filter(), EventFilter::Rakat);
        assert!(rakats.try_recv().is_none());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let bus = EventBus::new();
        let sub = bus.subscribe_channel(EventFilter::All).unwrap();
        assert_eq!(bus.subscriber_count().unwrap(), 1);

        drop(sub);
        bus.emit(CounterEvent::Reset).unwrap();
        assert_eq!(bus.subscriber_count().unwrap(), 0);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (tag, filter) in [(1, EventFilter::Progress), (2, EventFilter::All), (3, EventFilter::Progress)] {
            let order = order.clone();
            bus.subscribe(filter, move |_| order.lock().unwrap().push(tag)).unwrap();
        }

        bus.emit(progress(1, 0)).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus = EventBus::new();
        let after = Arc::new(AtomicUsize::new(0));
        let after_clone = after.clone();
        let sub = bus.subscribe_channel(EventFilter::All).unwrap();

        bus.subscribe(EventFilter::Rakat, |_| panic!("observer failure")).unwrap();
        bus.subscribe(EventFilter::All, move |_| {
            after_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        assert!(bus.emit(CounterEvent::RakatComplete { count: 1, timestamp: 1600 }).is_ok());
        assert!(bus.emit(CounterEvent::Reset).is_ok());

        assert_eq!(after.load(Ordering::SeqCst), 2);
        assert_eq!(sub.drain().len(), 2);
        assert_eq!(bus.history().unwrap().len(), 2);
    }

    #[test]
    fn test_handler_can_read_history() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let bus_clone = bus.clone();
        let seen_clone = seen.clone();

        bus.subscribe(EventFilter::All, move |_| {
            let len = bus_clone.history().unwrap().len();
            seen_clone.store(len, Ordering::SeqCst);
        })
        .unwrap();

        bus.emit(CounterEvent::Reset).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_feedback_mapping() {
        assert_eq!(progress(1, 0).feedback(), FeedbackKind::Heavy);
        assert_eq!(
            CounterEvent::RakatComplete { count: 3, timestamp: 0 }.feedback(),
            FeedbackKind::Success
        );
        assert_eq!(CounterEvent::Reset.feedback(), FeedbackKind::Warning);
        assert_eq!(CounterEvent::Reset.timestamp(), None);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&progress(2, 1600)).unwrap();
        assert_eq!(json, r#"{"type":"sajdah_progress","value":2,"timestamp":1600}"#);

        let json = serde_json::to_string(&CounterEvent::Reset).unwrap();
        assert_eq!(json, r#"{"type":"reset"}"#);
    }
}
