//! Per-player presence record, as the dispatcher sees it

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::Event;
use crate::world::{RoomId, ZoneId};

/// Maximum accepted username length.
pub const MAX_NAME_LEN: usize = 20;

/// A connected player. Created by the dispatcher once the username is
/// accepted; dropped (closing the event queue) on disconnect.
#[derive(Debug)]
pub struct Player {
    pub name: String,
    pub room: RoomId,
    pub zone: ZoneId,
    /// Single-producer queue to this player's writer task.
    pub events: mpsc::Sender<Event>,
    pub connected_at: DateTime<Utc>,
}

impl Player {
    pub fn new(name: String, room: RoomId, zone: ZoneId, events: mpsc::Sender<Event>) -> Self {
        Self {
            name,
            room,
            zone,
            events,
            connected_at: Utc::now(),
        }
    }
}

/// Username format rejection, shown verbatim to the client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Your name can't be empty")]
    Empty,
    #[error("Your name must be a single word")]
    Whitespace,
    #[error("Your name can't be longer than 20 characters")]
    TooLong,
}

/// Format check for a proposed username. Uniqueness is the dispatcher's
/// call, not ours.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let mut tokens = name.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (None, _) => Err(NameError::Empty),
        (Some(_), Some(_)) => Err(NameError::Whitespace),
        (Some(word), None) if word != name => Err(NameError::Whitespace),
        (Some(word), None) if word.chars().count() > MAX_NAME_LEN => Err(NameError::TooLong),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert_eq!(validate_name("alice"), Ok(()));
        assert_eq!(validate_name(""), Err(NameError::Empty));
        assert_eq!(validate_name("   "), Err(NameError::Empty));
        assert_eq!(validate_name("two words"), Err(NameError::Whitespace));
        assert_eq!(validate_name(" padded"), Err(NameError::Whitespace));
        assert_eq!(validate_name(&"x".repeat(20)), Ok(()));
        assert_eq!(validate_name(&"x".repeat(21)), Err(NameError::TooLong));
    }
}
