//! World database: the read-only zones/rooms/exits store
//!
//! The schema is three relations — zones(id, name), rooms(id, zone_id,
//! name, description), exits(from_id, to_id, dir, description) — loaded
//! once at startup in that order. Any integrity failure is fatal.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use tracing::info;

use crate::world::{Direction, LoadError, RoomId, World, ZoneId};

/// Open the world database with the standard pragmas. The server never
/// writes to it.
pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path.as_ref())
        .with_context(|| format!("opening database {}", path.as_ref().display()))?;
    conn.busy_timeout(Duration::from_secs(10))
        .context("setting busy timeout")?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("setting journal mode")?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("enabling foreign keys")?;
    Ok(conn)
}

/// Load zones, rooms, and exits in order, linking as we go.
pub fn load(conn: &mut Connection) -> Result<World> {
    let mut world = World::new();
    let tx = conn.transaction().context("starting read transaction")?;
    read_zones(&tx, &mut world).context("reading zones")?;
    read_rooms(&tx, &mut world).context("reading rooms")?;
    read_exits(&tx, &mut world).context("reading exits")?;
    tx.commit().context("committing read transaction")?;
    info!(
        zones = world.zone_count(),
        rooms = world.room_count(),
        "world loaded"
    );
    Ok(world)
}

fn read_zones(tx: &Transaction, world: &mut World) -> Result<()> {
    let mut stmt = tx.prepare("SELECT id, name FROM zones")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (id, name) = row?;
        world.add_zone(ZoneId(id), name);
    }
    Ok(())
}

fn read_rooms(tx: &Transaction, world: &mut World) -> Result<()> {
    let mut stmt = tx.prepare("SELECT id, zone_id, name, description FROM rooms")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;
    for row in rows {
        let (id, zone_id, name, description) = row?;
        world.add_room(RoomId(id), ZoneId(zone_id), name, description)?;
    }
    Ok(())
}

fn read_exits(tx: &Transaction, world: &mut World) -> Result<()> {
    let mut stmt = tx.prepare("SELECT from_id, to_id, dir, description FROM exits")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;
    for row in rows {
        let (from, to, dir, description) = row?;
        let direction = dir
            .chars()
            .next()
            .and_then(Direction::from_char)
            .ok_or_else(|| LoadError::BadDirection(RoomId(from), dir.clone()))?;
        world.add_exit(RoomId(from), RoomId(to), direction, description)?;
    }
    Ok(())
}
