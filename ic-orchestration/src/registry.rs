//! Registro de tipos de chip e de famílias de pinos

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ic_core::{ChipDefinition, PinSet, Pins3Iso, PinsSiso};
use ic_logic::builtin_definitions;

use crate::docs::IcTableRow;
use crate::error::{OrchestrationError, OrchestrationResult};

/// Normalises lookup text: trimmed and case-folded.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Registro de chips
///
/// Keeps definitions in registration order. Model id, shorthand id and
/// long name all resolve to the definition and share one case-insensitive
/// namespace.
#[derive(Debug, Default)]
pub struct ChipRegistry {
    /// Definições em ordem de registro
    definitions: Vec<Arc<ChipDefinition>>,
    /// Índice por chave normalizada
    index: HashMap<String, usize>,
}

impl ChipRegistry {
    /// Cria registro vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in chip.
    pub fn with_builtins() -> Self {
        Self::with_builtins_except(&[])
    }

    /// Registry holding the built-in chips, skipping any whose model id,
    /// shorthand or name appears in `disabled`.
    pub fn with_builtins_except(disabled: &[String]) -> Self {
        let disabled: Vec<String> = disabled.iter().map(|key| normalize(key)).collect();
        let mut registry = Self::new();
        for definition in builtin_definitions() {
            if definition
                .keys()
                .iter()
                .any(|key| disabled.contains(&normalize(key)))
            {
                continue;
            }
            // Built-in keys are unique.
            let _ = registry.register(definition);
        }
        registry
    }

    /// Registra definição
    ///
    /// Fails if any of its keys is already taken by another definition.
    pub fn register(&mut self, definition: ChipDefinition) -> OrchestrationResult<Arc<ChipDefinition>> {
        if definition.shorthand_id().trim().is_empty() {
            return Err(OrchestrationError::InvalidConfiguration(format!(
                "chip {} has an empty shorthand id",
                definition.model_id()
            )));
        }

        let mut keys: Vec<String> = definition
            .keys()
            .iter()
            .map(|key| normalize(key))
            .filter(|key| !key.is_empty())
            .collect();
        keys.dedup();

        if let Some(taken) = keys.iter().find(|key| self.index.contains_key(*key)) {
            return Err(OrchestrationError::DuplicateChip(taken.clone()));
        }

        let position = self.definitions.len();
        let definition = Arc::new(definition);
        for key in keys {
            self.index.insert(key, position);
        }
        self.definitions.push(Arc::clone(&definition));
        Ok(definition)
    }

    /// Resolves model id, shorthand id or long name.
    pub fn lookup(&self, text: &str) -> Option<Arc<ChipDefinition>> {
        self.index
            .get(&normalize(text))
            .map(|position| Arc::clone(&self.definitions[*position]))
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains_key(&normalize(text))
    }

    /// Definições em ordem de registro
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChipDefinition>> {
        self.definitions.iter()
    }

    pub fn list_all(&self) -> Vec<Arc<ChipDefinition>> {
        self.definitions.clone()
    }

    /// Documentation rows, in registration order.
    pub fn rows(&self) -> Vec<IcTableRow> {
        self.definitions
            .iter()
            .map(|definition| IcTableRow::from_definition(definition))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Registro de famílias de pinos, indexado pelo nome em maiúsculas
#[derive(Debug)]
pub struct PinSetRegistry {
    sets: BTreeMap<String, Arc<dyn PinSet>>,
}

impl PinSetRegistry {
    /// Registro vazio
    pub fn empty() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }

    /// Registry with `SISO` and `3ISO`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        let _ = registry.register(Arc::new(PinsSiso));
        let _ = registry.register(Arc::new(Pins3Iso));
        registry
    }

    pub fn register(&mut self, pin_set: Arc<dyn PinSet>) -> OrchestrationResult<()> {
        let key = pin_set.name().trim().to_uppercase();
        if self.sets.contains_key(&key) {
            return Err(OrchestrationError::DuplicatePinSet(key));
        }
        self.sets.insert(key, pin_set);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PinSet>> {
        self.sets.get(&name.trim().to_uppercase()).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for PinSetRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
