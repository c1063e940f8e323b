//! Command vocabulary: verbs, categories, and the alias table
//!
//! Registration auto-inserts every proper prefix of an alias without
//! overwriting, so registration order defines which command wins a shared
//! prefix. Full aliases are always inserted last and authoritatively.

use std::collections::HashMap;

use crate::world::Direction;

/// Command grouping, in precedence (and help display) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Navigation,
    Information,
    Communication,
    Emotes,
    Special,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Navigation,
        Category::Information,
        Category::Communication,
        Category::Emotes,
        Category::Special,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Navigation => "navigation",
            Category::Information => "information",
            Category::Communication => "communication",
            Category::Emotes => "emotes",
            Category::Special => "special",
        }
    }
}

/// What the dispatcher does for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Move(Direction),
    Recall,
    Look,
    Where,
    Help,
    Gossip,
    Shout,
    Say,
    Tell,
    Poke,
    Smile,
    Scowl,
    Sigh,
    Laugh,
    Think,
    Quit,
}

/// One entry of the command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub verb: Verb,
}

/// Alias -> command lookup with prefix expansion.
#[derive(Debug, Default)]
pub struct CommandTable {
    aliases: HashMap<String, Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an alias and all of its proper prefixes. Prefixes never
    /// overwrite an existing binding; the full alias always does.
    pub fn register(&mut self, alias: &str, cmd: Command) {
        for i in 1..alias.len() {
            self.aliases.entry(alias[..i].to_string()).or_insert(cmd);
        }
        self.aliases.insert(alias.to_string(), cmd);
    }

    pub fn lookup(&self, alias: &str) -> Option<&Command> {
        self.aliases.get(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// All (alias, command) bindings, for the help listing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Build the full vocabulary. Commands are registered in order of
/// precedence so navigation wins contested prefixes.
pub fn default_commands() -> CommandTable {
    let mut table = CommandTable::new();

    // Navigation
    for dir in Direction::ALL {
        table.register(
            dir.name(),
            Command {
                name: dir.name(),
                category: Category::Navigation,
                description: match dir {
                    Direction::North => "Move north",
                    Direction::East => "Move east",
                    Direction::West => "Move west",
                    Direction::South => "Move south",
                    Direction::Up => "Move up",
                    Direction::Down => "Move down",
                },
                verb: Verb::Move(dir),
            },
        );
    }
    table.register(
        "recall",
        Command {
            name: "recall",
            category: Category::Navigation,
            description: "Return to the Temple of Midgaard",
            verb: Verb::Recall,
        },
    );

    // Information
    table.register(
        "look",
        Command {
            name: "look",
            category: Category::Information,
            description: "Look around or in a specific direction",
            verb: Verb::Look,
        },
    );
    table.register(
        "where",
        Command {
            name: "where",
            category: Category::Information,
            description: "Display names and locations of all players in current zone",
            verb: Verb::Where,
        },
    );
    let help = Command {
        name: "help",
        category: Category::Information,
        description: "List all commands",
        verb: Verb::Help,
    };
    table.register("help", help);
    table.register("cmds", help);

    // Communication
    table.register(
        "gossip",
        Command {
            name: "gossip",
            category: Category::Communication,
            description: "Speak to all players on the server",
            verb: Verb::Gossip,
        },
    );
    table.register(
        "shout",
        Command {
            name: "shout",
            category: Category::Communication,
            description: "Speak to all players in the current zone",
            verb: Verb::Shout,
        },
    );
    table.register(
        "say",
        Command {
            name: "say",
            category: Category::Communication,
            description: "Speak to all players in the current room",
            verb: Verb::Say,
        },
    );
    table.register(
        "tell",
        Command {
            name: "tell",
            category: Category::Communication,
            description: "Speak privately to a specific player",
            verb: Verb::Tell,
        },
    );
    table.register(
        "poke",
        Command {
            name: "poke",
            category: Category::Communication,
            description: "Poke a player",
            verb: Verb::Poke,
        },
    );

    // Emotes
    table.register(
        "laugh",
        Command {
            name: "laugh",
            category: Category::Emotes,
            description: "Laugh at a player, or in general",
            verb: Verb::Laugh,
        },
    );
    table.register(
        "sigh",
        Command {
            name: "sigh",
            category: Category::Emotes,
            description: "Sigh at a player, or in general",
            verb: Verb::Sigh,
        },
    );
    table.register(
        "smile",
        Command {
            name: "smile",
            category: Category::Emotes,
            description: "Smile at a player, or in general",
            verb: Verb::Smile,
        },
    );
    table.register(
        "scowl",
        Command {
            name: "scowl",
            category: Category::Emotes,
            description: "Scowl at a player, or in general",
            verb: Verb::Scowl,
        },
    );
    table.register(
        "think",
        Command {
            name: "think",
            category: Category::Emotes,
            description: "Put on your thinking cap",
            verb: Verb::Think,
        },
    );

    // Special
    let quit = Command {
        name: "quit",
        category: Category::Special,
        description: "Leave the MUD",
        verb: Verb::Quit,
    };
    table.register("quit", quit);
    table.register("exit", quit);

    table
}

/// Prefix -> full direction name, for `look <dir>`.
pub fn direction_table() -> HashMap<String, &'static str> {
    let mut table = HashMap::new();
    for name in ["north", "south", "east", "west", "up", "down"] {
        for i in 1..name.len() {
            table.entry(name[..i].to_string()).or_insert(name);
        }
        table.insert(name.to_string(), name);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_resolve_by_registration_order() {
        let table = default_commands();
        // Navigation registered first wins the contested single letters
        assert_eq!(table.lookup("n").unwrap().name, "north");
        assert_eq!(table.lookup("s").unwrap().name, "south");
        assert_eq!(table.lookup("e").unwrap().name, "east");
        assert_eq!(table.lookup("w").unwrap().name, "west");
        assert_eq!(table.lookup("u").unwrap().name, "up");
        assert_eq!(table.lookup("d").unwrap().name, "down");
        assert_eq!(table.lookup("r").unwrap().name, "recall");
        // Later categories get the leftovers
        assert_eq!(table.lookup("sh").unwrap().name, "shout");
        assert_eq!(table.lookup("sa").unwrap().name, "say");
        assert_eq!(table.lookup("si").unwrap().name, "sigh");
        assert_eq!(table.lookup("sm").unwrap().name, "smile");
        assert_eq!(table.lookup("sc").unwrap().name, "scowl");
        assert_eq!(table.lookup("t").unwrap().name, "tell");
        assert_eq!(table.lookup("th").unwrap().name, "think");
        assert_eq!(table.lookup("g").unwrap().name, "gossip");
        assert_eq!(table.lookup("q").unwrap().name, "quit");
        // "exit" shares its prefix space with "east"
        assert_eq!(table.lookup("ex").unwrap().name, "quit");
        assert_eq!(table.lookup("exit").unwrap().name, "quit");
        // Both help spellings
        assert_eq!(table.lookup("help").unwrap().name, "help");
        assert_eq!(table.lookup("cmds").unwrap().name, "help");
        assert_eq!(table.lookup("c").unwrap().name, "help");
    }

    #[test]
    fn full_names_are_authoritative() {
        let mut table = CommandTable::new();
        let first = Command {
            name: "north",
            category: Category::Navigation,
            description: "",
            verb: Verb::Move(Direction::North),
        };
        let second = Command {
            name: "note",
            category: Category::Communication,
            description: "",
            verb: Verb::Say,
        };
        table.register("north", first);
        table.register("note", second);
        // "no" stays with the first registration, "note" binds fully
        assert_eq!(table.lookup("no").unwrap().name, "north");
        assert_eq!(table.lookup("note").unwrap().name, "note");
    }

    #[test]
    fn repeated_registration_is_idempotent() {
        let once = default_commands();
        let mut twice = default_commands();
        for dir in Direction::ALL {
            twice.register(
                dir.name(),
                *once.lookup(dir.name()).unwrap(),
            );
        }
        assert_eq!(once.len(), twice.len());
        for (alias, cmd) in once.iter() {
            assert_eq!(twice.lookup(alias).unwrap().name, cmd.name);
        }
    }

    #[test]
    fn every_alias_is_a_prefix_of_its_name_or_a_known_spelling() {
        let table = default_commands();
        for (alias, cmd) in table.iter() {
            let known = [cmd.name, "cmds", "exit"];
            assert!(
                known.iter().any(|n| n.starts_with(alias)),
                "alias {:?} does not prefix {:?}",
                alias,
                cmd.name
            );
        }
    }

    #[test]
    fn direction_prefix_expansion() {
        let dirs = direction_table();
        assert_eq!(dirs.get("n"), Some(&"north"));
        assert_eq!(dirs.get("nor"), Some(&"north"));
        assert_eq!(dirs.get("north"), Some(&"north"));
        assert_eq!(dirs.get("s"), Some(&"south"));
        assert_eq!(dirs.get("u"), Some(&"up"));
        assert_eq!(dirs.get("x"), None);
    }
}
