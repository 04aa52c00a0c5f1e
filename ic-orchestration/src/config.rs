//! Configuração do motor
//!
//! Loaded from TOML; every field has a default. Environment variables
//! (`.env` honoured) override the file:
//!
//! | Variável | Campo |
//! |:---------|:------|
//! | `IC_SELF_TRIGGERING` | `self_triggering` |
//! | `IC_LOAD_DELAY_TICKS` | `load_delay_ticks` |
//! | `IC_DISABLED_CHIPS` | `disabled_chips` (comma separated) |

use std::env;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{OrchestrationError, OrchestrationResult};

static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

pub const ENV_SELF_TRIGGERING: &str = "IC_SELF_TRIGGERING";
pub const ENV_LOAD_DELAY_TICKS: &str = "IC_LOAD_DELAY_TICKS";
pub const ENV_DISABLED_CHIPS: &str = "IC_DISABLED_CHIPS";

/// Configuração do motor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Habilita o scheduler de auto-disparo
    pub self_triggering: bool,
    /// Ticks entre `create` e o `load` adiado (mínimo 1)
    pub load_delay_ticks: u64,
    /// Built-in chips left out of the registry
    pub disabled_chips: Vec<String>,
    /// Capacidade de cada assinatura de eventos (0 = ilimitada)
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            self_triggering: true,
            load_delay_ticks: 1,
            disabled_chips: Vec::new(),
            event_capacity: 1024,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl EngineConfig {
    /// Parses TOML text.
    pub fn from_str(content: &str) -> OrchestrationResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| OrchestrationError::InvalidConfiguration(format!("Failed to parse engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> OrchestrationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrchestrationError::InvalidConfiguration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_str(&content)
    }

    pub fn to_toml_string(&self) -> OrchestrationResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| OrchestrationError::InvalidConfiguration(format!("Failed to serialize engine config: {}", e)))
    }

    /// Defaults plus overrides from the process environment.
    pub fn from_env() -> OrchestrationResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> OrchestrationResult<Self> {
        Lazy::force(&DOTENV_INIT);
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides resolved through `lookup`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> OrchestrationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SELF_TRIGGERING) {
            self.self_triggering = parse_bool(&value).ok_or_else(|| {
                OrchestrationError::InvalidConfiguration(format!("{ENV_SELF_TRIGGERING}: not a boolean: {value}"))
            })?;
        }

        if let Some(value) = lookup(ENV_LOAD_DELAY_TICKS) {
            self.load_delay_ticks = value.trim().parse().map_err(|_| {
                OrchestrationError::InvalidConfiguration(format!("{ENV_LOAD_DELAY_TICKS}: not a tick count: {value}"))
            })?;
        }

        if let Some(value) = lookup(ENV_DISABLED_CHIPS) {
            self.disabled_chips = value
                .split(',')
                .map(str::trim)
                .filter(|chip| !chip.is_empty())
                .map(String::from)
                .collect();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> OrchestrationResult<()> {
        if self.load_delay_ticks == 0 {
            return Err(OrchestrationError::InvalidConfiguration(
                "load_delay_ticks must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
