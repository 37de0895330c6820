//! Erros da CLI

use thiserror::Error;
use sajdah_session::SessionError;

pub type ScriptResult<T> = Result<T, ScriptError>;

/// Erros ao ler ou reproduzir um script de amostras
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Linha que não é um registro reconhecido
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Parâmetros de simulação inválidos
    #[error("Invalid simulation: {0}")]
    InvalidSimulation(String),
}
