//! Erros de orquestração

use thiserror::Error;

use ic_core::{ChipFault, InvalidIcError, Location};

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Erros de orquestração
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// Chave de chip já registrada
    #[error("Chip already registered: {0}")]
    DuplicateChip(String),

    /// Família de pinos já registrada
    #[error("Pin set already registered: {0}")]
    DuplicatePinSet(String),

    /// Local já presente no scheduler
    #[error("Location already registered for self-triggering: {0}")]
    AlreadyRegistered(Location),

    /// Local ausente do scheduler
    #[error("Location not registered for self-triggering: {0}")]
    NotRegistered(Location),

    /// Tipo gravado difere do tipo do marcador
    #[error("Broken IC at {location}: expected {expected}, found {}", found.as_deref().unwrap_or("nothing"))]
    BrokenChip {
        location: Location,
        expected: String,
        found: Option<String>,
    },

    /// Erro de criação
    #[error(transparent)]
    InvalidIc(#[from] InvalidIcError),

    /// Falha do chip
    #[error("Chip fault at {location}: {fault}")]
    ChipFault { location: Location, fault: ChipFault },

    #[error("Engine not running")]
    NotRunning,

    #[error("Engine already running")]
    AlreadyRunning,

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Lock poison
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for OrchestrationError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        OrchestrationError::LockPoisoned(err.to_string())
    }
}
