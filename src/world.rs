//! World graph: zones, rooms, exits
//!
//! The world is loaded once at startup and never mutated afterwards, so it
//! is shared between tasks as a plain `Arc<World>` with no locking. Rooms
//! and zones live in arenas keyed by their database ids; every cross-link
//! (room -> zone, exit -> room) is an id rather than a reference.

use std::collections::HashMap;

use thiserror::Error;

/// Room id, as assigned by the world database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub i64);

/// Zone id, as assigned by the world database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub i64);

/// Where every new player starts: the Temple of Midgaard.
pub const START_ROOM: RoomId = RoomId(3001);

/// One of the six exit directions, in room exit-array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North = 0,
    East = 1,
    West = 2,
    South = 3,
    Up = 4,
    Down = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::Up,
        Direction::Down,
    ];

    /// Index into a room's exit array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Direction> {
        Self::ALL.get(idx).copied()
    }

    /// The single-character form used by the exits table.
    pub fn to_char(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::East => 'e',
            Direction::West => 'w',
            Direction::South => 's',
            Direction::Up => 'u',
            Direction::Down => 'd',
        }
    }

    pub fn from_char(c: char) -> Option<Direction> {
        match c.to_ascii_lowercase() {
            'n' => Some(Direction::North),
            'e' => Some(Direction::East),
            'w' => Some(Direction::West),
            's' => Some(Direction::South),
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::West => "west",
            Direction::South => "south",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn from_name(name: &str) -> Option<Direction> {
        Self::ALL.iter().copied().find(|d| d.name() == name)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Grid offset on the minimap plane. Up/Down have no planar offset.
    pub fn offset(self) -> Option<(i32, i32)> {
        match self {
            Direction::North => Some((0, 1)),
            Direction::East => Some((1, 0)),
            Direction::West => Some((-1, 0)),
            Direction::South => Some((0, -1)),
            Direction::Up | Direction::Down => None,
        }
    }
}

/// A directed connection between two rooms.
#[derive(Debug, Clone)]
pub struct Exit {
    pub to: RoomId,
    pub description: String,
}

/// A node in the world graph; the unit of presence.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub zone: ZoneId,
    pub name: String,
    pub description: String,
    /// Indexed by `Direction::index`. A missing exit is `None`.
    pub exits: [Option<Exit>; 6],
}

impl Room {
    pub fn exit(&self, dir: Direction) -> Option<&Exit> {
        self.exits[dir.index()].as_ref()
    }
}

/// A named group of rooms, treated as one area on the minimap.
#[derive(Debug)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub rooms: Vec<RoomId>,
}

/// World-load integrity failure. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("room {0:?} references unknown zone {1:?}")]
    UnknownZone(RoomId, ZoneId),
    #[error("exit references unknown room {0:?}")]
    UnknownRoom(RoomId),
    #[error("exit from {0:?} has unknown direction {1:?}")]
    BadDirection(RoomId, String),
}

/// The immutable room/zone/exit graph.
#[derive(Debug, Default)]
pub struct World {
    zones: HashMap<ZoneId, Zone>,
    rooms: HashMap<RoomId, Room>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&mut self, id: ZoneId, name: impl Into<String>) {
        self.zones.insert(
            id,
            Zone {
                id,
                name: name.into(),
                rooms: Vec::new(),
            },
        );
    }

    /// Attach a room to its zone. The zone must already exist.
    pub fn add_room(
        &mut self,
        id: RoomId,
        zone: ZoneId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), LoadError> {
        let owner = self
            .zones
            .get_mut(&zone)
            .ok_or(LoadError::UnknownZone(id, zone))?;
        owner.rooms.push(id);
        self.rooms.insert(
            id,
            Room {
                id,
                zone,
                name: name.into(),
                description: description.into(),
                exits: Default::default(),
            },
        );
        Ok(())
    }

    /// Link an exit into the source room's exit array. Both rooms must exist.
    pub fn add_exit(
        &mut self,
        from: RoomId,
        to: RoomId,
        dir: Direction,
        description: impl Into<String>,
    ) -> Result<(), LoadError> {
        if !self.rooms.contains_key(&to) {
            return Err(LoadError::UnknownRoom(to));
        }
        let room = self.rooms.get_mut(&from).ok_or(LoadError::UnknownRoom(from))?;
        room.exits[dir.index()] = Some(Exit {
            to,
            description: description.into(),
        });
        Ok(())
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}
