//! Shared server state and the dispatcher
//!
//! The dispatcher is the single consumer of the shared input queue and the
//! only agent that mutates presence state, so world mutations are totally
//! ordered by input arrival. Handlers run synchronously on this task and
//! suspend only to send events to session writers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::command::{default_commands, direction_table, Command, CommandTable, Verb};
use crate::event::{Event, Input, JoinError, JoinReply, EVENT_QUEUE_DEPTH};
use crate::player::Player;
use crate::world::{Direction, RoomId, World, ZoneId, START_ROOM};

/// The server: world handle, command vocabulary, and presence.
pub struct Server {
    pub(crate) world: Arc<World>,
    pub(crate) commands: CommandTable,
    pub(crate) dirs: HashMap<String, &'static str>,
    /// Global name index. A player is here iff their session is live.
    pub(crate) players: HashMap<String, Player>,
    pub(crate) room_players: HashMap<RoomId, Vec<String>>,
    pub(crate) zone_players: HashMap<ZoneId, Vec<String>>,
}

impl Server {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            world,
            commands: default_commands(),
            dirs: direction_table(),
            players: HashMap::new(),
            room_players: HashMap::new(),
            zone_players: HashMap::new(),
        }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// All connected names, sorted.
    pub fn player_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.players.keys().cloned().collect();
        names.sort();
        names
    }

    /// Players in a room, sorted alphabetically.
    pub fn room_roster(&self, room: RoomId) -> &[String] {
        self.room_players.get(&room).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Players in a zone, sorted alphabetically.
    pub fn zone_roster(&self, zone: ZoneId) -> &[String] {
        self.zone_players.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consume the shared input queue until every sender is gone.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Input>) {
        info!("dispatcher running");
        while let Some(input) = rx.recv().await {
            match input {
                Input::Join { name, reply } => self.join(name, reply).await,
                Input::Line { name, text } => self.dispatch(&name, &text).await,
                Input::End { name } => {
                    // Idempotent: a quit may already have cleaned up.
                    if self.players.contains_key(&name) {
                        self.disconnect(&name).await;
                    }
                }
            }
        }
        info!("input queue closed, dispatcher stopping");
    }

    /// Apply one line of input from a joined player.
    pub(crate) async fn dispatch(&mut self, name: &str, text: &str) {
        if !self.players.contains_key(name) {
            // Stale input racing a disconnect
            return;
        }
        let mut words = text.split_whitespace();
        let Some(first) = words.next() else {
            return;
        };
        let args = words.collect::<Vec<_>>().join(" ");
        let Some(&cmd) = self.commands.lookup(&first.to_lowercase()) else {
            self.send_to(name, Event::error("Unrecognized command!")).await;
            return;
        };
        debug!(player = name, command = cmd.name, args = %args, "dispatch");
        self.run_verb(name, cmd, &args).await;
    }

    async fn run_verb(&mut self, name: &str, cmd: Command, args: &str) {
        match cmd.verb {
            Verb::Move(dir) => self.do_move(name, dir).await,
            Verb::Recall => self.do_recall(name).await,
            Verb::Look => self.do_look(name, args).await,
            Verb::Where => self.do_where(name).await,
            Verb::Help => self.do_help(name).await,
            Verb::Gossip => self.do_gossip(name, args).await,
            Verb::Shout => self.do_shout(name, args).await,
            Verb::Say => self.do_say(name, args).await,
            Verb::Tell => self.do_tell(name, args).await,
            Verb::Poke => self.do_poke(name, args).await,
            Verb::Smile => self.do_smile(name, args).await,
            Verb::Scowl => self.do_scowl(name, args).await,
            Verb::Sigh => self.do_sigh(name, args).await,
            Verb::Laugh => self.do_laugh(name, args).await,
            Verb::Think => self.do_think(name, args).await,
            Verb::Quit => self.do_quit(name).await,
        }
    }

    /// Username negotiation and the join procedure.
    pub(crate) async fn join(&mut self, name: String, reply: oneshot::Sender<JoinReply>) {
        if self.players.contains_key(&name) {
            let _ = reply.send(Err(JoinError::NameTaken));
            return;
        }
        let Some(start) = self.world.room(START_ROOM) else {
            let _ = reply.send(Err(JoinError::NoStartRoom));
            return;
        };
        let zone = start.zone;

        let (tx, events) = mpsc::channel(EVENT_QUEUE_DEPTH);
        self.players
            .insert(name.clone(), Player::new(name.clone(), START_ROOM, zone, tx));
        // Reply before the first events so the session can start its writer
        if reply.send(Ok(events)).is_err() {
            // Client vanished mid-negotiation
            self.players.remove(&name);
            return;
        }
        info!(player = %name, "joined the server");

        let entered = format!("{} has entered the room.", name);
        let joined = format!("{} has joined the server.", name);
        self.announce(&name, START_ROOM, &entered, &joined).await;

        self.add_presence(&name, START_ROOM, zone);
        let location = self.location_text(&name);
        self.send_to(
            &name,
            Event::system("Type 'help' or 'cmds' to see all available commands!")
                .with_location(location)
                .with_redraw(START_ROOM),
        )
        .await;
    }

    /// Remove a player: notify observers, clear presence, close the queue.
    pub(crate) async fn disconnect(&mut self, name: &str) {
        let Some(player) = self.players.get(name) else {
            return;
        };
        let (room, zone) = (player.room, player.zone);

        let left_room = format!("{} has left the room.", name);
        let left_server = format!("{} has left the server.", name);
        self.announce(name, room, &left_room, &left_server).await;

        self.remove_presence(name, room, zone);
        // Dropping the record drops the sender, closing the event queue
        self.players.remove(name);
        info!(player = name, "left the server");
    }

    /// Relocate a player, notifying both rooms.
    pub(crate) async fn move_to_room(&mut self, name: &str, dest: RoomId) {
        let Some(player) = self.players.get(name) else {
            return;
        };
        let (from_room, from_zone) = (player.room, player.zone);
        let Some(dest_zone) = self.world.room(dest).map(|r| r.zone) else {
            return;
        };

        self.remove_presence(name, from_room, from_zone);
        let left = format!("{} has left the room.", name);
        self.broadcast_to_room(from_room, name, &left).await;

        let entered = format!("{} has entered the room.", name);
        self.broadcast_to_room(dest, name, &entered).await;

        self.add_presence(name, dest, dest_zone);
        if let Some(p) = self.players.get_mut(name) {
            p.room = dest;
            p.zone = dest_zone;
        }

        let location = self.location_text(name);
        self.send_to(
            name,
            Event::message(name, "")
                .with_category(crate::command::Category::Navigation)
                .with_location(location)
                .with_redraw(dest),
        )
        .await;
    }

    /// Room description for the location section: name, description,
    /// exits, and the other occupants.
    pub(crate) fn location_text(&self, viewer: &str) -> String {
        let Some(room) = self
            .players
            .get(viewer)
            .and_then(|p| self.world.room(p.room))
        else {
            return String::new();
        };
        let mut out = String::new();
        out.push_str(&room.name);
        out.push_str("\n\n");
        out.push_str(room.description.trim_end_matches('\n'));
        out.push_str("\n\nEXITS: [ ");
        for dir in Direction::ALL {
            if room.exit(dir).is_some() {
                out.push(dir.to_char());
                out.push(' ');
            }
        }
        out.push_str("]\n\nPLAYERS: [ ");
        for other in self.room_roster(room.id) {
            if other != viewer {
                out.push_str(other);
                out.push(' ');
            }
        }
        out.push(']');
        out
    }

    pub(crate) fn add_presence(&mut self, name: &str, room: RoomId, zone: ZoneId) {
        let roster = self.room_players.entry(room).or_default();
        roster.push(name.to_string());
        roster.sort();
        let roster = self.zone_players.entry(zone).or_default();
        roster.push(name.to_string());
        roster.sort();
    }

    pub(crate) fn remove_presence(&mut self, name: &str, room: RoomId, zone: ZoneId) {
        if let Some(roster) = self.room_players.get_mut(&room) {
            roster.retain(|n| n != name);
        }
        if let Some(roster) = self.zone_players.get_mut(&zone) {
            roster.retain(|n| n != name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Direction;
    use tokio::sync::mpsc::Receiver;

    /// Two zones: rooms 3001 <-> 3002 east/west in zone 1, room 4001 in
    /// zone 2 east of 3002.
    fn test_world() -> Arc<World> {
        let mut world = World::new();
        world.add_zone(ZoneId(1), "Midgaard");
        world.add_zone(ZoneId(2), "Outlands");
        world
            .add_room(START_ROOM, ZoneId(1), "Temple of Midgaard", "The temple.")
            .unwrap();
        world
            .add_room(RoomId(3002), ZoneId(1), "Temple Square", "A square.")
            .unwrap();
        world
            .add_room(RoomId(4001), ZoneId(2), "Dusty Road", "A road.")
            .unwrap();
        world
            .add_exit(START_ROOM, RoomId(3002), Direction::East, "The square.")
            .unwrap();
        world
            .add_exit(RoomId(3002), START_ROOM, Direction::West, "The temple.")
            .unwrap();
        world
            .add_exit(RoomId(3002), RoomId(4001), Direction::East, "A road east.")
            .unwrap();
        world.add_zone(ZoneId(3), "Empty");
        Arc::new(world)
    }

    async fn join(server: &mut Server, name: &str) -> Receiver<Event> {
        let (tx, rx) = oneshot::channel();
        server.join(name.to_string(), tx).await;
        rx.await.unwrap().unwrap()
    }

    fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn check_presence(server: &Server, name: &str) {
        let player = server.player(name).unwrap();
        let room = server.world.room(player.room).unwrap();
        assert_eq!(room.zone, player.zone, "room/zone mismatch for {name}");
        let in_rooms = server
            .room_players
            .values()
            .filter(|r| r.iter().any(|n| n == name))
            .count();
        let in_zones = server
            .zone_players
            .values()
            .filter(|r| r.iter().any(|n| n == name))
            .count();
        assert_eq!(in_rooms, 1, "{name} should be in exactly one room");
        assert_eq!(in_zones, 1, "{name} should be in exactly one zone");
        assert!(server.room_roster(player.room).iter().any(|n| n == name));
        assert!(server.zone_roster(player.zone).iter().any(|n| n == name));
    }

    #[tokio::test]
    async fn join_places_player_at_the_temple() {
        let mut server = Server::new(test_world());
        let mut rx = join(&mut server, "alice").await;

        check_presence(&server, "alice");
        assert_eq!(server.player("alice").unwrap().room, START_ROOM);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(events[0].message.contains("'help'"));
        assert_eq!(events[0].redraw_map, Some(START_ROOM));
        let location = events[0].location.as_ref().unwrap();
        assert!(location.contains("Temple of Midgaard"));
    }

    #[tokio::test]
    async fn duplicate_username_is_refused() {
        let mut server = Server::new(test_world());
        let _rx = join(&mut server, "alice").await;

        let (tx, rx2) = oneshot::channel();
        server.join("alice".to_string(), tx).await;
        assert_eq!(rx2.await.unwrap().unwrap_err(), JoinError::NameTaken);
        // The original session is unaffected
        check_presence(&server, "alice");
    }

    #[tokio::test]
    async fn unknown_command_is_a_red_event_to_self_only() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        let mut b = join(&mut server, "bob").await;
        drain(&mut a);
        drain(&mut b);

        server.dispatch("alice", "xyzzy").await;

        let events = drain(&mut a);
        assert_eq!(events.len(), 1);
        assert!(events[0].err);
        assert_eq!(events[0].message, "Unrecognized command!");
        assert!(drain(&mut b).is_empty());
        check_presence(&server, "alice");
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        drain(&mut a);
        server.dispatch("alice", "   ").await;
        assert!(drain(&mut a).is_empty());
    }

    #[tokio::test]
    async fn prefix_navigation_moves_and_notifies() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        let mut b = join(&mut server, "bob").await;
        drain(&mut a);
        drain(&mut b);

        // No exit north from the temple
        server.dispatch("alice", "n").await;
        let events = drain(&mut a);
        assert_eq!(events.len(), 1);
        assert!(events[0].err);
        assert_eq!(events[0].message, "You can't go that way...");
        assert!(drain(&mut b).is_empty());

        // East exists; "e" expands to east
        server.dispatch("alice", "e").await;
        assert_eq!(server.player("alice").unwrap().room, RoomId(3002));
        check_presence(&server, "alice");

        let to_b = drain(&mut b);
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_b[0].message, "alice has left the room.");

        let to_a = drain(&mut a);
        assert_eq!(to_a.len(), 1);
        assert_eq!(to_a[0].redraw_map, Some(RoomId(3002)));
        assert!(to_a[0].location.as_ref().unwrap().contains("Temple Square"));
    }

    #[tokio::test]
    async fn move_into_occupied_room_notifies_occupants() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        let mut b = join(&mut server, "bob").await;
        server.dispatch("bob", "east").await;
        drain(&mut a);
        drain(&mut b);

        server.dispatch("alice", "east").await;
        let to_b = drain(&mut b);
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_b[0].message, "alice has entered the room.");
        // The newcomer sees bob in the room
        let to_a = drain(&mut a);
        assert!(to_a[0].location.as_ref().unwrap().contains("bob"));
    }

    #[tokio::test]
    async fn zone_crossing_updates_zone_presence() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        drain(&mut a);

        server.dispatch("alice", "east").await;
        server.dispatch("alice", "east").await;

        let player = server.player("alice").unwrap();
        assert_eq!(player.room, RoomId(4001));
        assert_eq!(player.zone, ZoneId(2));
        check_presence(&server, "alice");
        assert!(server.zone_roster(ZoneId(1)).is_empty());

        let events = drain(&mut a);
        assert_eq!(events.last().unwrap().redraw_map, Some(RoomId(4001)));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_and_clears_presence() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        let mut b = join(&mut server, "bob").await;
        drain(&mut a);
        drain(&mut b);

        server.disconnect("alice").await;
        assert!(server.player("alice").is_none());
        assert!(!server.room_roster(START_ROOM).iter().any(|n| n == "alice"));

        let to_b = drain(&mut b);
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_b[0].message, "alice has left the room.");

        // The queue is closed; the writer would now drain and exit
        assert!(a.recv().await.is_none());

        // A racing end input is ignored
        server.disconnect("alice").await;
        assert!(drain(&mut b).is_empty());
    }

    #[tokio::test]
    async fn stale_line_after_disconnect_is_ignored() {
        let mut server = Server::new(test_world());
        let mut a = join(&mut server, "alice").await;
        let mut b = join(&mut server, "bob").await;
        drain(&mut a);
        drain(&mut b);

        server.disconnect("alice").await;
        drain(&mut b);
        server.dispatch("alice", "say hello").await;
        assert!(drain(&mut b).is_empty());
    }
}
