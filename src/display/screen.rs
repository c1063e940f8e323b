//! Terminal multiplexing: a screen partitioned into rectangular sections
//!
//! The screen is a `width x height` grid with the origin at the bottom-left
//! (`y` increases upwards). Sections tile the screen without overlapping;
//! each owns a sparse cell map and scrolls independently. Rendering emits
//! the whole grid after a clear-screen escape, so repainting is idempotent.

use std::collections::HashMap;

use thiserror::Error;

use super::styles::{Color, CLEAR_SCREEN, RESET};

/// Absolute screen coordinates.
type Pos = (usize, usize);

/// A styled cell: the drawn character and an optional color.
pub type Cell = (char, Option<Color>);

/// Handle to a section registered on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionId(usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("section out of screen bounds")]
    OutOfBounds,
    #[error("section overlaps an existing section")]
    Overlap,
    #[error("can't write to a static section")]
    StaticWrite,
    #[error("no such section")]
    NoSuchSection,
}

/// An independent rectangular part of the screen.
#[derive(Debug)]
pub struct Section {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    text: HashMap<Pos, char>,
    colors: HashMap<Pos, Color>,
    is_static: bool,
}

impl Section {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Screen row (y-up) of the section row `i`, counted from the top.
    fn row_y(&self, i: usize) -> usize {
        self.y + self.height - 1 - i
    }

    /// Read the section contents as rows, top-down.
    fn rows(&self) -> Vec<Vec<Cell>> {
        (0..self.height)
            .map(|i| {
                let y = self.row_y(i);
                (self.x..self.x + self.width)
                    .map(|x| {
                        (
                            self.text.get(&(x, y)).copied().unwrap_or(' '),
                            self.colors.get(&(x, y)).copied(),
                        )
                    })
                    .collect()
            })
            .collect()
    }

    /// Store rows (top-down) back into the sparse maps.
    fn store_rows(&mut self, rows: &[Vec<Cell>]) {
        for (i, row) in rows.iter().enumerate() {
            let y = self.row_y(i);
            for (j, &(ch, color)) in row.iter().enumerate() {
                let pos = (self.x + j, y);
                self.text.insert(pos, ch);
                match color {
                    Some(c) => {
                        self.colors.insert(pos, c);
                    }
                    None => {
                        self.colors.remove(&pos);
                    }
                }
            }
        }
    }

    /// Scroll `incoming` rows in at the bottom, discarding from the top.
    fn push_rows(&mut self, mut incoming: Vec<Vec<Cell>>) {
        // Keep only what fits
        if incoming.len() > self.height {
            incoming.drain(..incoming.len() - self.height);
        }
        let mut rows = self.rows();
        rows.drain(..incoming.len());
        rows.extend(incoming);
        self.store_rows(&rows);
    }

    /// Split text into width-sized rows: honor embedded newlines, hard-break
    /// long lines, pad everything with spaces to exactly the section width.
    fn layout(&self, text: &str, color: Option<Color>) -> Vec<Vec<Cell>> {
        let mut rows = Vec::new();
        for raw in text.split('\n') {
            let chars: Vec<char> = raw.chars().collect();
            let mut start = 0;
            loop {
                let end = (start + self.width).min(chars.len());
                let mut row: Vec<Cell> = chars[start..end].iter().map(|&ch| (ch, color)).collect();
                row.resize(self.width, (' ', color));
                rows.push(row);
                start = end;
                if start >= chars.len() {
                    break;
                }
            }
        }
        rows
    }
}

/// A partitioned terminal screen.
#[derive(Debug)]
pub struct Screen {
    width: usize,
    height: usize,
    /// Slot map; removal leaves a hole so ids stay stable.
    sections: Vec<Option<Section>>,
    /// Cell -> section slot.
    index: HashMap<Pos, usize>,
}

impl Screen {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sections: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn validate(&self, x: usize, y: usize, width: usize, height: usize) -> Result<(), ScreenError> {
        if x + width > self.width || y + height > self.height {
            return Err(ScreenError::OutOfBounds);
        }
        for section in self.sections.iter().flatten() {
            // AABB overlap
            if x < section.x + section.width
                && x + width > section.x
                && y < section.y + section.height
                && y + height > section.y
            {
                return Err(ScreenError::Overlap);
            }
        }
        Ok(())
    }

    fn register(&mut self, section: Section) -> SectionId {
        let slot = self.sections.len();
        for y in section.y..section.y + section.height {
            for x in section.x..section.x + section.width {
                self.index.insert((x, y), slot);
            }
        }
        self.sections.push(Some(section));
        SectionId(slot)
    }

    /// Create a writable section. Cells start as spaces.
    pub fn new_section(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<SectionId, ScreenError> {
        self.validate(x, y, width, height)?;
        let mut section = Section {
            x,
            y,
            width,
            height,
            text: HashMap::new(),
            colors: HashMap::new(),
            is_static: false,
        };
        let blank = vec![vec![(' ', None); width]; height];
        section.store_rows(&blank);
        Ok(self.register(section))
    }

    /// Create a section that always displays `text` and rejects writes.
    /// Useful for borders.
    pub fn new_static_section(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        text: &str,
    ) -> Result<SectionId, ScreenError> {
        self.validate(x, y, width, height)?;
        let mut section = Section {
            x,
            y,
            width,
            height,
            text: HashMap::new(),
            colors: HashMap::new(),
            is_static: false,
        };
        let blank = vec![vec![(' ', None); width]; height];
        section.store_rows(&blank);
        let rows = section.layout(text, None);
        section.push_rows(rows);
        section.is_static = true;
        Ok(self.register(section))
    }

    fn section_mut(&mut self, id: SectionId) -> Result<&mut Section, ScreenError> {
        self.sections
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ScreenError::NoSuchSection)
    }

    pub fn section(&self, id: SectionId) -> Result<&Section, ScreenError> {
        self.sections
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(ScreenError::NoSuchSection)
    }

    /// Scrolling append: new lines enter at the bottom, old content shifts
    /// up, overflow past the section top is discarded.
    pub fn write(
        &mut self,
        id: SectionId,
        text: &str,
        color: Option<Color>,
    ) -> Result<(), ScreenError> {
        let section = self.section_mut(id)?;
        if section.is_static {
            return Err(ScreenError::StaticWrite);
        }
        let rows = section.layout(text, color);
        section.push_rows(rows);
        Ok(())
    }

    /// Scrolling append of pre-styled rows (the minimap path). Rows are
    /// truncated or padded to the section width.
    pub fn write_cells(&mut self, id: SectionId, rows: &[Vec<Cell>]) -> Result<(), ScreenError> {
        let section = self.section_mut(id)?;
        if section.is_static {
            return Err(ScreenError::StaticWrite);
        }
        let width = section.width;
        let rows: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.truncate(width);
                row.resize(width, (' ', None));
                row
            })
            .collect();
        section.push_rows(rows);
        Ok(())
    }

    /// Detach a section and clear its cells from the index.
    pub fn remove_section(&mut self, id: SectionId) -> Result<(), ScreenError> {
        let section = self
            .sections
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(ScreenError::NoSuchSection)?;
        for y in section.y..section.y + section.height {
            for x in section.x..section.x + section.width {
                self.index.remove(&(x, y));
            }
        }
        Ok(())
    }

    /// Emit the full screen: clear escape, then rows top-down. Unwritten
    /// cells inside a section render as `#`, unmapped cells as `@`; both
    /// indicate a tiling bug.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.width * self.height + 16);
        out.push_str(CLEAR_SCREEN);
        for y in (0..self.height).rev() {
            let mut active: Option<Color> = None;
            for x in 0..self.width {
                let cell = self
                    .index
                    .get(&(x, y))
                    .and_then(|&slot| self.sections[slot].as_ref())
                    .map(|section| {
                        (
                            section.text.get(&(x, y)).copied().unwrap_or('#'),
                            section.colors.get(&(x, y)).copied(),
                        )
                    });
                let (ch, color) = cell.unwrap_or(('@', None));
                if color != active {
                    if active.is_some() {
                        out.push_str(RESET);
                    }
                    if let Some(c) = color {
                        out.push_str(c.code());
                    }
                    active = color;
                }
                out.push(ch);
            }
            if active.is_some() {
                out.push_str(RESET);
            }
            if y != 0 {
                out.push('\n');
            }
        }
        out
    }
}
