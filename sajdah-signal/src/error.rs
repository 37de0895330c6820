//! Erros específicos do condicionamento de sinal

use thiserror::Error;

pub type SignalResult<T> = Result<T, SignalError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid buffer size: {0} (must be between 1 and {max})", max = crate::buffer::MAX_BUFFER_SIZE)]
    InvalidBufferSize(usize),

    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}
