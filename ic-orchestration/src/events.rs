//! # Eventos do motor
//!
//! MPMC fan-out over `crossbeam-channel`. Publishing never blocks: a full
//! subscriber misses the event, a dropped receiver is pruned.
//!
//! ```
//! use ic_core::Location;
//! use ic_orchestration::{EventHub, IcEvent};
//!
//! let mut hub = EventHub::new(16);
//! let rx = hub.subscribe();
//! hub.publish(IcEvent::Destroyed { location: Location::new(0, 64, 0) });
//! assert!(matches!(rx.try_recv(), Ok(IcEvent::Destroyed { .. })));
//! ```

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use serde::Serialize;

use ic_core::Location;

/// Evento do ciclo de vida de um IC
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IcEvent {
    Created { location: Location, chip: String },
    Loaded { location: Location, chip: String, self_triggering: bool },
    Destroyed { location: Location },
    /// Stored type differs from the marker, or the record is uninitialised
    Broken { location: Location, expected: String, found: Option<String> },
    /// Isolated chip fault
    Fault { location: Location, chip: String, message: String },
    OutputChanged { location: Location, pin: usize, level: bool },
}

impl IcEvent {
    pub fn location(&self) -> Location {
        match self {
            IcEvent::Created { location, .. }
            | IcEvent::Loaded { location, .. }
            | IcEvent::Destroyed { location }
            | IcEvent::Broken { location, .. }
            | IcEvent::Fault { location, .. }
            | IcEvent::OutputChanged { location, .. } => *location,
        }
    }
}

/// Distribuidor de eventos
#[derive(Debug)]
pub struct EventHub {
    senders: Vec<Sender<IcEvent>>,
    /// Capacidade por assinante (0 = ilimitada)
    capacity: usize,
    published: u64,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            senders: Vec::new(),
            capacity,
            published: 0,
        }
    }

    /// New receiver for every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<IcEvent> {
        let (sender, receiver) = if self.capacity > 0 {
            bounded(self.capacity)
        } else {
            unbounded()
        };
        self.senders.push(sender);
        receiver
    }

    pub fn publish(&mut self, event: IcEvent) {
        self.published += 1;
        if self.senders.is_empty() {
            return;
        }
        self.senders
            .retain(|sender| !matches!(sender.try_send(event.clone()), Err(TrySendError::Disconnected(_))));
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }

    /// Eventos publicados desde a criação
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(0)
    }
}
