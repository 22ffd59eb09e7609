//! Per-widget event bus.
//!
//! A [`Signal`] maps each [`EventKind`] to an ordered list of callbacks.
//! Emission is isolated per callback: a callback that returns an error or
//! panics is logged and delivery continues with the next one.

use crate::widget::WidgetId;
use kurbo::{Point, Vec2};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use thiserror::Error;

/// The closed set of events a widget can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Clicked,
    ClickedRelease,
    Hovered,
    Disabled,
    Scrolled,
    Dragged,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Clicked,
        EventKind::ClickedRelease,
        EventKind::Hovered,
        EventKind::Disabled,
        EventKind::Scrolled,
        EventKind::Dragged,
    ];

    /// Stable name used for string-keyed registration.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Clicked => "clicked",
            EventKind::ClickedRelease => "clicked_release",
            EventKind::Hovered => "hovered",
            EventKind::Disabled => "disabled",
            EventKind::Scrolled => "scrolled",
            EventKind::Dragged => "dragged",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SignalError::UnknownEventKind(s.to_string()))
    }
}

/// Signal errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),
    #[error("No {kind} callback registered with id {id}")]
    NotFound { kind: EventKind, id: ConnectionId },
}

/// Error returned by a callback to report a failure without aborting delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CallbackError(String);

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Result type for callbacks.
pub type CallbackResult = Result<(), CallbackError>;

/// Data delivered to every callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventPayload {
    /// The widget that emitted the event.
    pub source: WidgetId,
    /// Pointer position at emission time.
    pub position: Point,
    /// Scroll amount for `Scrolled`, drag offset for `Dragged`, zero otherwise.
    pub delta: Vec2,
}

impl EventPayload {
    pub fn new(source: WidgetId, position: Point) -> Self {
        Self {
            source,
            position,
            delta: Vec2::ZERO,
        }
    }

    pub fn with_delta(mut self, delta: Vec2) -> Self {
        self.delta = delta;
        self
    }
}

/// Identifies one registration, used to disconnect it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Callback = Box<dyn FnMut(&EventPayload) -> CallbackResult>;

struct Slot {
    id: ConnectionId,
    callback: Callback,
}

/// Event-kind to callback-list registry owned by a widget.
#[derive(Default)]
pub struct Signal {
    slots: HashMap<EventKind, Vec<Slot>>,
    next_id: u64,
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .slots
            .iter()
            .map(|(kind, slots)| (*kind, slots.len()))
            .collect();
        f.debug_struct("Signal")
            .field("callbacks", &counts)
            .finish()
    }
}

impl Signal {
    /// Create an empty signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback for `kind`. Duplicates are allowed.
    pub fn connect<F>(&mut self, kind: EventKind, callback: F) -> ConnectionId
    where
        F: FnMut(&EventPayload) -> CallbackResult + 'static,
    {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.slots.entry(kind).or_default().push(Slot {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Register a callback by event name, rejecting unknown names.
    pub fn connect_named<F>(&mut self, name: &str, callback: F) -> Result<ConnectionId, SignalError>
    where
        F: FnMut(&EventPayload) -> CallbackResult + 'static,
    {
        match name.parse::<EventKind>() {
            Ok(kind) => Ok(self.connect(kind, callback)),
            Err(e) => {
                log::error!("Cannot connect callback: {}", e);
                Err(e)
            }
        }
    }

    /// Remove the registration `id` from `kind`.
    pub fn disconnect(&mut self, kind: EventKind, id: ConnectionId) -> Result<(), SignalError> {
        let removed = self.slots.get_mut(&kind).and_then(|slots| {
            let index = slots.iter().position(|slot| slot.id == id)?;
            Some(slots.remove(index))
        });

        match removed {
            Some(_) => Ok(()),
            None => {
                let err = SignalError::NotFound { kind, id };
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Invoke every callback registered for `kind`, in registration order.
    ///
    /// Returns how many callbacks completed successfully.
    pub fn emit(&mut self, kind: EventKind, payload: &EventPayload) -> usize {
        let Some(slots) = self.slots.get_mut(&kind) else {
            return 0;
        };

        let mut delivered = 0;
        for slot in slots.iter_mut() {
            let callback = &mut slot.callback;
            match panic::catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    log::error!("{} callback {} failed: {}", kind, slot.id, e);
                }
                Err(panic) => {
                    log::error!(
                        "{} callback {} panicked: {}",
                        kind,
                        slot.id,
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
        delivered
    }

    /// Number of callbacks registered for `kind`.
    pub fn len(&self, kind: EventKind) -> usize {
        self.slots.get(&kind).map_or(0, Vec::len)
    }

    /// Whether no callbacks are registered at all.
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Vec::is_empty)
    }

    /// Drop every callback registered for `kind`.
    pub fn clear(&mut self, kind: EventKind) {
        self.slots.remove(&kind);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
