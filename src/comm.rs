//! Broadcast fan-out: room, zone, and server scopes
//!
//! Each helper takes an originator, a message for the other observers, and
//! a message for the originator. Every send checks that the recipient's
//! event queue is still open and silently skips a closed one, so a racing
//! disconnect never crashes the dispatcher.

use crate::command::Category;
use crate::event::Event;
use crate::server::Server;
use crate::world::RoomId;

impl Server {
    /// Send one event to one player, skipping a closed or vanished queue.
    pub(crate) async fn send_to(&self, target: &str, event: Event) {
        let Some(player) = self.players.get(target) else {
            return;
        };
        if player.events.is_closed() {
            return;
        }
        let _ = player.events.send(event).await;
    }

    /// Everyone in the originator's room; the originator gets `self_msg`.
    pub(crate) async fn room_command(
        &self,
        origin: &str,
        others: &str,
        self_msg: &str,
        category: Option<Category>,
    ) {
        let Some(room) = self.players.get(origin).map(|p| p.room) else {
            return;
        };
        let roster = self.room_roster(room).to_vec();
        self.fan_out(origin, &roster, others, self_msg, category).await;
    }

    /// Everyone in the originator's zone.
    pub(crate) async fn zone_command(
        &self,
        origin: &str,
        others: &str,
        self_msg: &str,
        category: Option<Category>,
    ) {
        let Some(zone) = self.players.get(origin).map(|p| p.zone) else {
            return;
        };
        let roster = self.zone_roster(zone).to_vec();
        self.fan_out(origin, &roster, others, self_msg, category).await;
    }

    /// Everyone on the server.
    pub(crate) async fn server_command(
        &self,
        origin: &str,
        others: &str,
        self_msg: &str,
        category: Option<Category>,
    ) {
        let roster = self.player_names();
        self.fan_out(origin, &roster, others, self_msg, category).await;
    }

    async fn fan_out(
        &self,
        origin: &str,
        roster: &[String],
        others: &str,
        self_msg: &str,
        category: Option<Category>,
    ) {
        for name in roster {
            let text = if name == origin { self_msg } else { others };
            let mut event = Event::message(origin, text);
            event.category = category;
            self.send_to(name, event).await;
        }
    }

    /// A command aimed at one player in the originator's room. Aiming at
    /// yourself earns `err_self`; a name not present earns "No such
    /// player!".
    pub(crate) async fn targeted_room_command(
        &self,
        origin: &str,
        target: &str,
        out_msg: &str,
        self_msg: &str,
        err_self: &str,
        category: Option<Category>,
    ) {
        let Some(room) = self.players.get(origin).map(|p| p.room) else {
            return;
        };
        if !self.room_roster(room).iter().any(|n| n == target) {
            self.send_to(origin, Event::error("No such player!")).await;
            return;
        }
        self.deliver_targeted(origin, target, out_msg, self_msg, err_self, category)
            .await;
    }

    /// A command aimed at one player anywhere on the server.
    pub(crate) async fn targeted_server_command(
        &self,
        origin: &str,
        target: &str,
        out_msg: &str,
        self_msg: &str,
        err_self: &str,
        category: Option<Category>,
    ) {
        if !self.players.contains_key(target) {
            self.send_to(origin, Event::error("No such player!")).await;
            return;
        }
        self.deliver_targeted(origin, target, out_msg, self_msg, err_self, category)
            .await;
    }

    async fn deliver_targeted(
        &self,
        origin: &str,
        target: &str,
        out_msg: &str,
        self_msg: &str,
        err_self: &str,
        category: Option<Category>,
    ) {
        if target == origin {
            self.send_to(origin, Event::error(err_self)).await;
            return;
        }
        let mut event = Event::message(origin, out_msg);
        event.category = category;
        self.send_to(target, event).await;
        let mut event = Event::message(origin, self_msg);
        event.category = category;
        self.send_to(origin, event).await;
    }

    /// Join/leave notifications: the affected room's occupants get
    /// `room_msg`, everyone else gets `server_msg`, the originator gets
    /// nothing.
    pub(crate) async fn announce(
        &self,
        origin: &str,
        room: RoomId,
        room_msg: &str,
        server_msg: &str,
    ) {
        for name in self.player_names() {
            if name == origin {
                continue;
            }
            let in_room = self.room_roster(room).iter().any(|n| n == &name);
            let text = if in_room { room_msg } else { server_msg };
            self.send_to(&name, Event::message(origin, text)).await;
        }
    }

    /// Room-scoped notification to everyone but `skip`. Used when the
    /// subject is mid-move and not on either roster.
    pub(crate) async fn broadcast_to_room(&self, room: RoomId, skip: &str, text: &str) {
        for name in self.room_roster(room).to_vec() {
            if name != skip {
                self.send_to(&name, Event::message(skip, text)).await;
            }
        }
    }
}
