//! Erros de sessão

use thiserror::Error;
use sajdah_counter::CounterError;
use sajdah_signal::SignalError;

pub type SessionResult<T> = Result<T, SessionError>;

/// Erros de sessão
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Falha ao ler/escrever arquivo de configuração
    #[error("Config file error: {0}")]
    ConfigFile(String),

    /// Erro de canal
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    /// Erro do contador
    #[error("Counter error: {0}")]
    Counter(#[from] CounterError),

    /// Worker da sessão encerrado
    #[error("Session worker is gone")]
    WorkerGone,

    /// Consulta bloqueante feita de dentro do worker (callback de evento)
    #[error("Session queried from its own worker thread")]
    ReentrantQuery,

    /// Falha ao criar a thread do worker
    #[error("Failed to spawn session worker: {0}")]
    Spawn(String),
}
