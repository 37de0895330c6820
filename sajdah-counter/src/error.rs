//! Erros do contador

use thiserror::Error;

pub type CounterResult<T> = Result<T, CounterError>;

/// Erros do contador
///
/// O processamento de eventos em si nunca falha; estes erros vêm apenas da
/// infraestrutura compartilhada (locks, canais).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CounterError {
    /// Lock poison
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Subscriber desconectado
    #[error("Subscriber disconnected")]
    Disconnected,
}

impl<T> From<std::sync::PoisonError<T>> for CounterError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CounterError::LockPoisoned(err.to_string())
    }
}
