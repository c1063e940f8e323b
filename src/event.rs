//! Input and event value shapes
//!
//! An `Input` is a unit of intent flowing from a session's reader to the
//! dispatcher; an `Event` is a unit of observable effect flowing from the
//! dispatcher to one recipient session's writer.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::command::Category;
use crate::world::RoomId;

/// Depth of the shared input queue.
pub const INPUT_QUEUE_DEPTH: usize = 64;

/// Depth of each session's event queue. Kept small so a stalled writer
/// back-pressures broadcasts instead of buffering unboundedly.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Why a join request was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("That username is taken")]
    NameTaken,
    #[error("The world has no starting room")]
    NoStartRoom,
}

/// Reply to a join request: the new session's event queue, or a refusal.
pub type JoinReply = Result<mpsc::Receiver<Event>, JoinError>;

/// Intent from a session's reader to the dispatcher.
#[derive(Debug)]
pub enum Input {
    /// Username negotiation. The dispatcher owns the name index, so it
    /// alone can arbitrate uniqueness; it answers over the oneshot.
    Join {
        name: String,
        reply: oneshot::Sender<JoinReply>,
    },
    /// One raw line of command text from a joined player.
    Line { name: String, text: String },
    /// The connection is gone; clean up. Safe to deliver more than once.
    End { name: String },
}

/// An observable effect for one recipient.
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Player who initiated the effect, if any.
    pub origin: Option<String>,
    /// Text appended to the chat section. May be empty.
    pub message: String,
    /// Command category, for output tinting.
    pub category: Option<Category>,
    /// Error events render red regardless of category.
    pub err: bool,
    /// Repaint the location section with this text.
    pub location: Option<String>,
    /// Mark this room visited and retrace the minimap around it.
    pub redraw_map: Option<RoomId>,
    /// Writer-side pause after handling this event, in milliseconds.
    pub delay_ms: u64,
}

impl Event {
    /// A plain chat-section message.
    pub fn message(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            message: text.into(),
            ..Self::default()
        }
    }

    /// A system message with no originating player.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            ..Self::default()
        }
    }

    /// A user-visible error; renders red.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            err: true,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_redraw(mut self, room: RoomId) -> Self {
        self.redraw_map = Some(room);
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}
