//! Erros do núcleo de ICs

use std::any::Any;
use thiserror::Error;

/// Creation-time fault caused by user input. The creation is vetoed and the
/// message is shown to the creator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidIcError {
    /// Tipo de chip desconhecido
    #[error("Invalid IC type: {0}")]
    UnknownType(String),

    /// Local não suporta um chip
    #[error("Invalid IC site: {0}")]
    InvalidSite(String),

    /// Família de pinos desconhecida
    #[error("Unknown pin set: {0}")]
    UnknownPinSet(String),

    /// Configuração do chip rejeitada
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Runtime fault raised by chip code during `load`, `trigger` or `think`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChipFault {
    #[error("Chip fault: {0}")]
    Fault(String),

    #[error("Chip panicked: {0}")]
    Panicked(String),
}

impl ChipFault {
    /// Converts a payload captured by `catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ChipFault::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InvalidIcError::UnknownType("FOO".into());
        assert_eq!(err.to_string(), "Invalid IC type: FOO");
    }

    #[test]
    fn test_fault_from_panic() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(ChipFault::from_panic(payload), ChipFault::Panicked("boom".into()));

        let payload = std::panic::catch_unwind(|| panic!("{} {}", "formatted", 7)).unwrap_err();
        assert_eq!(
            ChipFault::from_panic(payload),
            ChipFault::Panicked("formatted 7".into())
        );
    }
}
