//! Per-player terminal display
//!
//! One `MudDisplay` per session writer: a single `Screen` tiled into the
//! location panel, the minimap, the chat log, and two static dividers.

pub mod map;
pub mod screen;
pub mod styles;

use self::screen::{Cell, Screen, ScreenError, SectionId};
use self::styles::Color;

pub const LOCATION_WIDTH: usize = 60;
pub const LOCATION_HEIGHT: usize = 20;

pub const MAP_WIDTH: usize = 60;
pub const MAP_HEIGHT: usize = 24;

pub const CHAT_WIDTH: usize = 60;

pub const FULL_HEIGHT: usize = MAP_HEIGHT + LOCATION_HEIGHT + 1;
pub const FULL_WIDTH: usize = MAP_WIDTH + CHAT_WIDTH + 1;

const PROMPT: &str = "\n>>> ";

/// The fixed section layout for one player's terminal.
#[derive(Debug)]
pub struct MudDisplay {
    screen: Screen,
    location: SectionId,
    minimap: SectionId,
    chat: SectionId,
}

impl MudDisplay {
    /// Tile the screen: minimap above the location panel on the left,
    /// chat the full height on the right, dividers between.
    pub fn new() -> Result<Self, ScreenError> {
        let mut screen = Screen::new(FULL_WIDTH, FULL_HEIGHT);
        let minimap = screen.new_section(0, LOCATION_HEIGHT + 1, MAP_WIDTH, MAP_HEIGHT)?;
        screen.new_static_section(
            0,
            LOCATION_HEIGHT,
            LOCATION_WIDTH,
            1,
            &"-".repeat(LOCATION_WIDTH),
        )?;
        let location = screen.new_section(0, 0, LOCATION_WIDTH, LOCATION_HEIGHT)?;
        screen.new_static_section(MAP_WIDTH, 0, 1, FULL_HEIGHT, &"║".repeat(FULL_HEIGHT))?;
        let chat = screen.new_section(MAP_WIDTH + 1, 0, CHAT_WIDTH, FULL_HEIGHT)?;
        Ok(Self {
            screen,
            location,
            minimap,
            chat,
        })
    }

    /// Append a message to the chat log.
    pub fn write_chat(&mut self, text: &str, color: Option<Color>) {
        let _ = self.screen.write(self.chat, text, color);
    }

    /// Replace the location panel, text at the top.
    pub fn write_location(&mut self, text: &str) {
        let mut lines = 0;
        for raw in text.split('\n') {
            let len = raw.chars().count();
            lines += 1 + len.saturating_sub(1) / LOCATION_WIDTH;
        }
        let mut padded = text.to_string();
        for _ in lines..LOCATION_HEIGHT {
            padded.push('\n');
        }
        let _ = self.screen.write(self.location, &padded, None);
    }

    /// Replace the minimap with freshly traced rows.
    pub fn write_minimap(&mut self, rows: Vec<Vec<Cell>>) {
        let rows = if rows.len() < MAP_HEIGHT {
            let mut padded = vec![Vec::new(); MAP_HEIGHT - rows.len()];
            padded.extend(rows);
            padded
        } else {
            rows
        };
        let _ = self.screen.write_cells(self.minimap, &rows);
    }

    /// The full repaint: clear escape, the grid, and a fresh prompt.
    pub fn render_frame(&self) -> String {
        let mut out = self.screen.render();
        out.push_str(PROMPT);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_tiles_the_whole_screen() {
        let display = MudDisplay::new().unwrap();
        let frame = display.render_frame();
        assert!(!frame.contains('@'));
        assert!(!frame.contains('#'));
        assert!(frame.ends_with(PROMPT));
        // Grid rows plus the prompt line
        assert_eq!(frame.lines().count(), FULL_HEIGHT + 1);
    }

    #[test]
    fn location_replaces_rather_than_stacks() {
        let mut display = MudDisplay::new().unwrap();
        display.write_location("First Room\n\nSome description.");
        display.write_location("Second Room");
        let frame = display.render_frame();
        assert!(frame.contains("Second Room"));
        assert!(!frame.contains("First Room"));
    }

    #[test]
    fn chat_accumulates() {
        let mut display = MudDisplay::new().unwrap();
        display.write_chat("first message", None);
        display.write_chat("second message", None);
        let frame = display.render_frame();
        assert!(frame.contains("first message"));
        assert!(frame.contains("second message"));
    }

    #[test]
    fn minimap_shorter_than_the_section_still_replaces() {
        let mut display = MudDisplay::new().unwrap();
        let rows = vec![vec![('A', None); 5]; 3];
        display.write_minimap(rows);
        let rows = vec![vec![('B', None); 5]; 3];
        display.write_minimap(rows);
        let frame = display.render_frame();
        assert!(frame.contains("BBBBB"));
        assert!(!frame.contains("AAAAA"));
    }
}
