//! Verb implementations
//!
//! One method per command. Handlers never return errors; anything the
//! player should know about goes out as an event, red for failures.

use std::collections::BTreeMap;

use crate::command::Category;
use crate::display::styles::center_text;
use crate::event::Event;
use crate::server::Server;
use crate::world::{Direction, START_ROOM};

/// Column widths for the `where` roster, sized to the chat section.
const WHERE_NAME_COL: usize = 16;
const WHERE_ROOM_COL: usize = 38;

/// Box width for the `help` listing.
const HELP_BOX: usize = 30;

impl Server {
    // Navigation

    pub(crate) async fn do_move(&mut self, name: &str, dir: Direction) {
        let dest = self
            .players
            .get(name)
            .and_then(|p| self.world.room(p.room))
            .and_then(|r| r.exit(dir))
            .map(|e| e.to);
        match dest {
            Some(room) => self.move_to_room(name, room).await,
            None => {
                self.send_to(name, Event::error("You can't go that way...")).await;
            }
        }
    }

    pub(crate) async fn do_recall(&mut self, name: &str) {
        self.send_to(
            name,
            Event::message(name, "You head back to the Temple of Midgard...")
                .with_category(Category::Navigation)
                .with_delay(1000),
        )
        .await;
        self.move_to_room(name, START_ROOM).await;
    }

    // Information

    pub(crate) async fn do_look(&mut self, name: &str, args: &str) {
        if args.is_empty() {
            let location = self.location_text(name);
            self.send_to(name, Event::message(name, "").with_location(location))
                .await;
            return;
        }
        let Some(dir) = self
            .dirs
            .get(&args.to_lowercase())
            .and_then(|full| Direction::from_name(full))
        else {
            self.send_to(
                name,
                Event::error("Usage: look <north|south|east|west|up|down>"),
            )
            .await;
            return;
        };
        let description = self
            .players
            .get(name)
            .and_then(|p| self.world.room(p.room))
            .and_then(|r| r.exit(dir))
            .map(|e| e.description.clone());
        match description {
            Some(text) => self.send_to(name, Event::message(name, text)).await,
            None => {
                self.send_to(name, Event::error("There's nothing there...")).await;
            }
        }
    }

    /// Zone roster: every player in the zone and their room.
    pub(crate) async fn do_where(&mut self, name: &str) {
        let Some(zone) = self
            .players
            .get(name)
            .and_then(|p| self.world.zone(p.zone))
        else {
            return;
        };
        let inner = WHERE_NAME_COL + WHERE_ROOM_COL + 1;
        let mut out = String::new();
        out.push_str(&center_text(&zone.name, inner + 2, ' '));
        out.push('\n');
        out.push_str(&format!("+{}+\n", "-".repeat(inner)));
        out.push_str(&format!(
            "|{}|{}|\n",
            center_text("PLAYER", WHERE_NAME_COL, ' '),
            center_text("ROOM", WHERE_ROOM_COL, ' ')
        ));
        out.push_str(&format!("+{}+\n", "-".repeat(inner)));
        for other in self.zone_roster(zone.id) {
            let room_name = self
                .players
                .get(other)
                .and_then(|p| self.world.room(p.room))
                .map(|r| r.name.as_str())
                .unwrap_or("");
            out.push_str(&format!(
                "|{}|{}|\n",
                center_text(other, WHERE_NAME_COL, ' '),
                center_text(room_name, WHERE_ROOM_COL, ' ')
            ));
        }
        out.push_str(&format!("+{}+", "-".repeat(inner)));
        self.send_to(name, Event::message(name, out)).await;
    }

    /// Command table, grouped by category in precedence order, then
    /// command name, then alias.
    pub(crate) async fn do_help(&mut self, name: &str) {
        // (category, name) -> sorted aliases
        let mut grouped: BTreeMap<(Category, &str), Vec<&str>> = BTreeMap::new();
        for (alias, cmd) in self.commands.iter() {
            grouped.entry((cmd.category, cmd.name)).or_default().push(alias);
        }

        let mut out = String::new();
        out.push_str(&format!("+{}+\n", "-".repeat(HELP_BOX)));
        out.push_str(&format!("|{}|\n", center_text("COMMANDS LIST", HELP_BOX, ' ')));
        out.push_str(&format!("+{}+\n", "-".repeat(HELP_BOX)));

        let mut current: Option<Category> = None;
        for ((category, cmd_name), mut aliases) in grouped {
            if current != Some(category) {
                current = Some(category);
                let label = format!(" {} ", category.name().to_uppercase());
                out.push_str(&format!("\n+{}+\n", center_text(&label, HELP_BOX, '-')));
            }
            aliases.sort_unstable();
            let description = self
                .commands
                .lookup(cmd_name)
                .map(|c| c.description)
                .unwrap_or("");
            for (i, alias) in aliases.iter().enumerate() {
                out.push_str(&format!("| {:<12} --> {:<12} |", alias, cmd_name));
                if i == 0 {
                    out.push_str(&format!(" {}", description));
                }
                out.push('\n');
            }
        }
        out.push_str(&format!("+{}+", "-".repeat(HELP_BOX)));
        self.send_to(name, Event::message(name, out)).await;
    }

    // Communication

    pub(crate) async fn do_gossip(&mut self, name: &str, msg: &str) {
        self.server_command(
            name,
            &format!("{} gossips: {}", name, msg),
            &format!("You gossip: {}", msg),
            Some(Category::Communication),
        )
        .await;
    }

    pub(crate) async fn do_shout(&mut self, name: &str, msg: &str) {
        self.zone_command(
            name,
            &format!("{} shouts: {}", name, msg),
            &format!("You shout: {}", msg),
            Some(Category::Communication),
        )
        .await;
    }

    pub(crate) async fn do_say(&mut self, name: &str, msg: &str) {
        self.room_command(
            name,
            &format!("{} says: {}", name, msg),
            &format!("You say: {}", msg),
            Some(Category::Communication),
        )
        .await;
    }

    pub(crate) async fn do_tell(&mut self, name: &str, args: &str) {
        let mut words = args.split_whitespace();
        let (Some(target), Some(first)) = (words.next(), words.next()) else {
            self.send_to(name, Event::error("Usage: tell <player name> <message>"))
                .await;
            return;
        };
        let mut msg = first.to_string();
        for word in words {
            msg.push(' ');
            msg.push_str(word);
        }
        let target = target.to_string();
        self.targeted_server_command(
            name,
            &target,
            &format!("{} tells you: {}", name, msg),
            &format!("You tell {}: {}", target, msg),
            "You know talking to yourself is a sign of insanity, right?",
            Some(Category::Communication),
        )
        .await;
    }

    pub(crate) async fn do_poke(&mut self, name: &str, args: &str) {
        let mut words = args.split_whitespace();
        let (Some(target), None) = (words.next(), words.next()) else {
            self.send_to(name, Event::error("Usage: poke <player name>")).await;
            return;
        };
        let target = target.to_string();
        self.targeted_room_command(
            name,
            &target,
            &format!("{} poked you!", name),
            &format!("You poke {}", target),
            "Why are you poking yourself...",
            Some(Category::Communication),
        )
        .await;
    }

    // Emotes

    pub(crate) async fn do_smile(&mut self, name: &str, args: &str) {
        self.emote(
            name,
            args,
            &format!("{} smiles happily", name),
            "You smile happily",
            "smiles at you",
            "You smile at",
            "You smile ... at yourself?",
            "Usage: smile <?player name>",
        )
        .await;
    }

    pub(crate) async fn do_scowl(&mut self, name: &str, args: &str) {
        self.emote(
            name,
            args,
            &format!("{} scowls angrily.", name),
            "You scowl angrily",
            "scowls at you",
            "You scowl at",
            "You must really hate yourself...",
            "Usage: scowl <?player name>",
        )
        .await;
    }

    pub(crate) async fn do_sigh(&mut self, name: &str, args: &str) {
        self.emote(
            name,
            args,
            &format!("{} sighs heavily", name),
            "You sigh heavily",
            "sighs at you",
            "You sigh at",
            "Rough day, huh?",
            "Usage: sigh <?player name>",
        )
        .await;
    }

    pub(crate) async fn do_laugh(&mut self, name: &str, args: &str) {
        self.emote(
            name,
            args,
            &format!("{} laughs heartily", name),
            "You laugh heartily",
            "laughs at you",
            "You laugh at",
            "It's always good to be able to laugh at yourself",
            "Usage: laugh <?player name>",
        )
        .await;
    }

    pub(crate) async fn do_think(&mut self, name: &str, args: &str) {
        if !args.trim().is_empty() {
            self.send_to(name, Event::error("Usage: think")).await;
            return;
        }
        self.room_command(
            name,
            &format!("{} is in deep thought", name),
            "You are in deep thought",
            Some(Category::Emotes),
        )
        .await;
    }

    /// Shared shape of the optionally-targeted emotes.
    #[allow(clippy::too_many_arguments)]
    async fn emote(
        &mut self,
        name: &str,
        args: &str,
        plain_others: &str,
        plain_self: &str,
        at_target: &str,
        at_self_prefix: &str,
        err_self: &str,
        usage: &str,
    ) {
        let mut words = args.split_whitespace();
        match (words.next(), words.next()) {
            (None, _) => {
                self.room_command(name, plain_others, plain_self, Some(Category::Emotes))
                    .await;
            }
            (Some(target), None) => {
                let target = target.to_string();
                self.targeted_room_command(
                    name,
                    &target,
                    &format!("{} {}", name, at_target),
                    &format!("{} {}", at_self_prefix, target),
                    err_self,
                    Some(Category::Emotes),
                )
                .await;
            }
            _ => self.send_to(name, Event::error(usage)).await,
        }
    }

    // Special

    pub(crate) async fn do_quit(&mut self, name: &str) {
        self.disconnect(name).await;
    }
}
