//! Minimap tracing: a bounded BFS over the room graph
//!
//! The player's current room sits at grid (0, 0); planar neighbors occupy
//! adjacent cells, up/down render as corner arrows on the current cell.
//! Each traced cell becomes a 5x3 double-line box on a sparse text grid
//! which `render` sweeps into styled rows for the minimap section.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::world::{Direction, Room, RoomId, World};

use super::screen::Cell;
use super::styles::Color;

/// Text-grid cells per room cell, horizontally.
const X_SCALE: i32 = 6;
/// Text-grid cells per room cell, vertically.
const Y_SCALE: i32 = 4;

/// Default exploration bound, in room cells from the origin.
pub const DEFAULT_DEPTH: i32 = 4;

const MAP_BOX: [[char; 5]; 3] = [
    ['╔', '═', '═', '═', '╗'],
    ['║', ' ', ' ', ' ', '║'],
    ['╚', '═', '═', '═', '╝'],
];

/// Marks the player's own room.
const CROSS: char = 'X';

// Arrow glyphs indexed by direction (N E W S U D).
const BI_ARROWS: [char; 6] = ['⭥', '⭤', '⭤', '⭥', '⤢', '⤢'];
const IN_ZONE_ARROWS: [char; 6] = ['⭡', '⭢', '⭠', '⭣', '⭧', '⭩'];
const OUT_ZONE_ARROWS: [char; 6] = ['⭱', '⭲', '⭰', '⭳', '⭷', '⭹'];
const UNKNOWN_ARROWS: [char; 6] = ['🡡', '🡢', '🡠', '🡣', '🡥', '🡧'];

type Pos = (i32, i32);

/// Depth-bounded tracer producing the minimap glyph grid.
#[derive(Debug)]
pub struct MapBuilder {
    depth: i32,
    /// Room-cell coordinates -> room drawn there.
    grid: HashMap<Pos, RoomId>,
    /// Text-grid coordinates -> glyph.
    text: HashMap<Pos, char>,
    /// Text-grid coordinates -> glyph color.
    paint: HashMap<Pos, Color>,
}

impl MapBuilder {
    pub fn new(depth: i32) -> Self {
        Self {
            depth,
            grid: HashMap::new(),
            text: HashMap::new(),
            paint: HashMap::new(),
        }
    }

    /// Rendered line width for this depth.
    pub fn line_width(&self) -> usize {
        (2 * (self.depth * X_SCALE + 3) + 1) as usize
    }

    /// Retrace the map centered on `start`. The whole grid is regenerated.
    pub fn trace(&mut self, world: &World, start: RoomId, visited: &HashSet<RoomId>) {
        self.grid.clear();
        self.text.clear();
        self.paint.clear();

        self.grid.insert((0, 0), start);
        let mut queue: VecDeque<(i32, i32)> = VecDeque::from([(0, 0)]);

        while let Some(here) = queue.pop_front() {
            // The limits of the drawn map
            if here.0.abs() > self.depth || here.1.abs() > self.depth {
                continue;
            }
            let Some(room) = world.room(self.grid[&here]) else {
                continue;
            };
            self.draw_box(here);

            for dir in Direction::ALL {
                let Some(exit) = room.exit(dir) else {
                    continue;
                };
                let target = exit.to;
                let crosses_zone = world.room(target).map(|r| r.zone) != Some(room.zone);

                if crosses_zone {
                    self.draw_exit(here, OUT_ZONE_ARROWS[dir.index()], dir, Color::Magenta);
                } else if !visited.contains(&target) {
                    self.draw_exit(here, UNKNOWN_ARROWS[dir.index()], dir, Color::Cyan);
                } else if let Some((dx, dy)) = dir.offset() {
                    let cell = (here.0 + dx, here.1 + dy);
                    match self.grid.get(&cell).copied() {
                        None => {
                            // First-come placement in BFS order
                            self.grid.insert(cell, target);
                            queue.push_back(cell);
                            self.draw_link(world, room, target, here, dir);
                        }
                        Some(occupant) if occupant == target => {
                            self.draw_link(world, room, target, here, dir);
                        }
                        // A different room got here first
                        Some(_) => {
                            self.draw_exit(here, IN_ZONE_ARROWS[dir.index()], dir, Color::Green);
                        }
                    }
                } else {
                    // Up/down never occupy a planar cell
                    self.draw_link(world, room, target, here, dir);
                }
            }
        }
    }

    /// Bi arrow when the reverse exit leads back, in-zone arrow otherwise.
    fn draw_link(&mut self, world: &World, room: &Room, target: RoomId, here: Pos, dir: Direction) {
        let back = world
            .room(target)
            .and_then(|r| r.exit(dir.opposite()))
            .map(|e| e.to);
        let arrow = if back == Some(room.id) {
            BI_ARROWS[dir.index()]
        } else {
            IN_ZONE_ARROWS[dir.index()]
        };
        self.draw_exit(here, arrow, dir, Color::Green);
    }

    fn draw_box(&mut self, center: Pos) {
        let (x, y) = text_coords(center);
        for (yy, row) in MAP_BOX.iter().enumerate() {
            for (xx, &glyph) in row.iter().enumerate() {
                self.text.insert((x - 2 + xx as i32, y + 1 - yy as i32), glyph);
            }
        }
        if center == (0, 0) {
            self.text.insert((x, y), CROSS);
            self.paint.insert((x, y), Color::Red);
        }
    }

    fn draw_exit(&mut self, center: Pos, arrow: char, dir: Direction, color: Color) {
        let (x, y) = text_coords(center);
        let slot = match dir {
            Direction::North => (x, y + 2),
            Direction::East => (x + 3, y),
            Direction::West => (x - 3, y),
            Direction::South => (x, y - 2),
            Direction::Up => (x + 3, y + 2),
            Direction::Down => (x - 3, y - 2),
        };
        self.text.insert(slot, arrow);
        self.paint.insert(slot, color);
    }

    /// Sweep the text grid into styled rows, top-down. Empty cells are
    /// spaces.
    pub fn render(&self) -> Vec<Vec<Cell>> {
        let mut rows = Vec::new();
        for y in (-self.depth * Y_SCALE - 2..=self.depth * Y_SCALE + 2).rev() {
            let mut row = Vec::with_capacity(self.line_width());
            for x in -self.depth * X_SCALE - 3..=self.depth * X_SCALE + 3 {
                match self.text.get(&(x, y)) {
                    Some(&glyph) => row.push((glyph, self.paint.get(&(x, y)).copied())),
                    None => row.push((' ', None)),
                }
            }
            rows.push(row);
        }
        rows
    }
}

fn text_coords(center: Pos) -> (i32, i32) {
    (center.0 * X_SCALE, center.1 * Y_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ZoneId;

    fn glyph_at(builder: &MapBuilder, x: i32, y: i32) -> Cell {
        let rows = builder.render();
        let row = (builder.depth * Y_SCALE + 2 - y) as usize;
        let col = (x + builder.depth * X_SCALE + 3) as usize;
        rows[row][col]
    }

    fn two_way(world: &mut World, a: RoomId, b: RoomId, dir: Direction) {
        world.add_exit(a, b, dir, "").unwrap();
        world.add_exit(b, a, dir.opposite(), "").unwrap();
    }

    fn small_world() -> World {
        let mut world = World::new();
        world.add_zone(ZoneId(1), "Zone One");
        world.add_zone(ZoneId(2), "Zone Two");
        for (id, zone) in [(1, 1), (2, 1), (3, 1), (4, 1), (5, 2)] {
            world
                .add_room(RoomId(id), ZoneId(zone), format!("Room {}", id), "")
                .unwrap();
        }
        world
    }

    #[test]
    fn origin_box_and_cross() {
        let world = small_world();
        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &HashSet::from([RoomId(1)]));

        assert_eq!(glyph_at(&builder, 0, 0), ('X', Some(Color::Red)));
        assert_eq!(glyph_at(&builder, -2, 1), ('╔', None));
        assert_eq!(glyph_at(&builder, 2, -1), ('╝', None));
    }

    #[test]
    fn bi_arrow_and_neighbor_placement() {
        let mut world = small_world();
        two_way(&mut world, RoomId(1), RoomId(2), Direction::East);
        let visited = HashSet::from([RoomId(1), RoomId(2)]);

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);

        assert_eq!(glyph_at(&builder, 3, 0), ('⭤', Some(Color::Green)));
        // Neighbor box drawn one cell east
        assert_eq!(glyph_at(&builder, X_SCALE - 2, 1), ('╔', None));
    }

    #[test]
    fn one_way_exit_gets_in_zone_arrow() {
        let mut world = small_world();
        world.add_exit(RoomId(1), RoomId(2), Direction::North, "").unwrap();
        let visited = HashSet::from([RoomId(1), RoomId(2)]);

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);

        assert_eq!(glyph_at(&builder, 0, 2), ('⭡', Some(Color::Green)));
    }

    #[test]
    fn unvisited_target_is_unknown() {
        let mut world = small_world();
        two_way(&mut world, RoomId(1), RoomId(2), Direction::East);
        let visited = HashSet::from([RoomId(1)]);

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);

        assert_eq!(glyph_at(&builder, 3, 0), ('🡢', Some(Color::Cyan)));
        // Unknown rooms are not placed
        assert_eq!(glyph_at(&builder, X_SCALE - 2, 1), (' ', None));
    }

    #[test]
    fn cross_zone_exit_is_out_zone() {
        let mut world = small_world();
        two_way(&mut world, RoomId(1), RoomId(5), Direction::West);
        let visited = HashSet::from([RoomId(1), RoomId(5)]);

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);

        assert_eq!(glyph_at(&builder, -3, 0), ('⭰', Some(Color::Magenta)));
    }

    #[test]
    fn vertical_exits_render_corner_arrows() {
        let mut world = small_world();
        two_way(&mut world, RoomId(1), RoomId(2), Direction::Up);
        world.add_exit(RoomId(1), RoomId(3), Direction::Down, "").unwrap();
        let visited = HashSet::from([RoomId(1), RoomId(2), RoomId(3)]);

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);

        assert_eq!(glyph_at(&builder, 3, 2), ('⤢', Some(Color::Green)));
        assert_eq!(glyph_at(&builder, -3, -2), ('⭩', Some(Color::Green)));
    }

    #[test]
    fn occupied_cell_falls_back_to_in_zone_arrow() {
        let mut world = small_world();
        world.add_room(RoomId(6), ZoneId(1), "Room 6", "").unwrap();
        // 3 sits north of 1 and is dequeued before 2 (east of 1), so 3's
        // east exit claims cell (1,1) for 6. 2's north exit to 4 then finds
        // the cell taken by a different room.
        two_way(&mut world, RoomId(1), RoomId(2), Direction::East);
        two_way(&mut world, RoomId(1), RoomId(3), Direction::North);
        two_way(&mut world, RoomId(2), RoomId(4), Direction::North);
        world.add_exit(RoomId(3), RoomId(6), Direction::East, "").unwrap();
        let visited: HashSet<_> = [1, 2, 3, 4, 6].into_iter().map(RoomId).collect();

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);

        // 6's box occupies (1,1)
        assert_eq!(glyph_at(&builder, X_SCALE - 2, Y_SCALE + 1), ('╔', None));
        // 2's north exit falls back to a plain in-zone arrow
        assert_eq!(glyph_at(&builder, X_SCALE, 2), ('⭡', Some(Color::Green)));
    }

    #[test]
    fn trace_is_idempotent() {
        let mut world = small_world();
        two_way(&mut world, RoomId(1), RoomId(2), Direction::East);
        two_way(&mut world, RoomId(1), RoomId(3), Direction::North);
        let visited: HashSet<_> = (1..=3).map(RoomId).collect();

        let mut builder = MapBuilder::new(2);
        builder.trace(&world, RoomId(1), &visited);
        let first = builder.render();
        builder.trace(&world, RoomId(1), &visited);
        assert_eq!(builder.render(), first);
    }

    #[test]
    fn render_dimensions() {
        let builder = MapBuilder::new(2);
        let rows = builder.render();
        assert_eq!(rows.len(), (2 * (2 * Y_SCALE + 2) + 1) as usize);
        for row in rows {
            assert_eq!(row.len(), builder.line_width());
        }
    }
}
