//! Star board geometry with cube coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest absolute value any cube coordinate may take
pub const BOARD_EXTENT: i8 = 8;

/// Side length of the grid backing the board
pub const GRID_SIZE: usize = 2 * BOARD_EXTENT as usize + 1;

/// Fields closer to the center than this are neutral
const CENTER_RADIUS: u16 = 4;

/// Half-width of each arm of the star
const ARM_WIDTH: u16 = 4;

/// Cube coordinates; the third coordinate is w = -u - v
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub u: i8,
    pub v: i8,
}

impl Position {
    pub const fn new(u: i8, v: i8) -> Self {
        Self { u, v }
    }

    /// Implicit third cube coordinate
    pub fn w(&self) -> i8 {
        -self.u - self.v
    }

    /// Check if both stored coordinates fit the backing grid
    pub fn in_range(&self) -> bool {
        self.u.unsigned_abs() <= BOARD_EXTENT as u8 && self.v.unsigned_abs() <= BOARD_EXTENT as u8
    }

    /// Distance from center (0,0)
    pub fn distance_to_center(&self) -> u16 {
        let (tu, tv, tw) = self.abs_coords();
        (tu + tv + tw) / 2
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Position {
        self.offset(direction, 1)
    }

    /// Walk `steps` fields in direction (0-5)
    pub fn offset(&self, direction: usize, steps: i8) -> Position {
        let (du, dv) = DIRECTIONS[direction % 6];
        Position::new(self.u + du * steps, self.v + dv * steps)
    }

    fn abs_coords(&self) -> (u16, u16, u16) {
        let w = -(self.u as i16) - self.v as i16;
        (
            self.u.unsigned_abs() as u16,
            self.v.unsigned_abs() as u16,
            w.unsigned_abs(),
        )
    }

    /// Grid index, or None when outside the backing grid
    fn index(&self) -> Option<(usize, usize)> {
        if !self.in_range() {
            return None;
        }
        Some((
            (self.u + BOARD_EXTENT) as usize,
            (self.v + BOARD_EXTENT) as usize,
        ))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.u, self.v)
    }
}

/// Direction vectors in cube coordinates (du, dv)
pub const DIRECTIONS: [(i8, i8); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Player color; turn order follows the ordinal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red = 1,
    Green = 2,
    Blue = 3,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    /// Ordinal in turn order, starting at 1
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Color> {
        match ordinal {
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Blue),
            _ => None,
        }
    }

    /// This color if a game with `player_count` players uses it.
    /// Red is always laid out.
    fn if_active(self, player_count: usize) -> Option<Color> {
        (self == Color::Red || self.ordinal() <= player_count).then_some(self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
        };
        f.pad(name)
    }
}

/// A field of the star
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    /// Color that must fill this field to win, if any
    pub home_owner: Option<Color>,
    /// Pin currently on the field
    pub occupant: Option<Color>,
}

impl Field {
    const fn new(home_owner: Option<Color>, occupant: Option<Color>) -> Self {
        Self { home_owner, occupant }
    }
}

/// Fields where two triangles meet: (position, home owner, occupant)
const CORNERS: [(Position, Color, Color); 6] = [
    (Position::new(0, -4), Color::Red, Color::Green),
    (Position::new(-4, 0), Color::Blue, Color::Green),
    (Position::new(-4, 4), Color::Blue, Color::Red),
    (Position::new(0, 4), Color::Green, Color::Red),
    (Position::new(4, 0), Color::Green, Color::Blue),
    (Position::new(4, -4), Color::Red, Color::Blue),
];

/// Playing surface: a fixed grid where only fields inside the star exist
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    fields: [[Option<Field>; GRID_SIZE]; GRID_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Board with no fields at all (a game that has not started)
    pub fn empty() -> Self {
        Self {
            fields: [[None; GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Lay out the star for a game with `player_count` players.
    ///
    /// The set of fields is the same for every player count; only the
    /// colors of home triangles and starting pins differ.
    pub fn build(player_count: usize) -> Self {
        let mut board = Self::empty();

        for u in -BOARD_EXTENT..=BOARD_EXTENT {
            for v in -BOARD_EXTENT..=BOARD_EXTENT {
                let pos = Position::new(u, v);
                if let Some(field) = classify(pos, player_count) {
                    board.set(pos, field);
                }
            }
        }

        for (pos, home_owner, occupant) in CORNERS {
            board.set(
                pos,
                Field::new(
                    home_owner.if_active(player_count),
                    occupant.if_active(player_count),
                ),
            );
        }

        board
    }

    /// True iff `pos` is inside the grid and a field exists there
    pub fn is_valid(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// Get field at position
    pub fn get(&self, pos: Position) -> Option<&Field> {
        let (x, y) = pos.index()?;
        self.fields[x][y].as_ref()
    }

    /// Pin on the field, None for empty or missing fields
    pub fn occupant(&self, pos: Position) -> Option<Color> {
        self.get(pos).and_then(|field| field.occupant)
    }

    /// Field exists and has no pin on it
    pub fn is_free(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(field) if field.occupant.is_none())
    }

    /// Field exists and has a pin on it
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupant(pos).is_some()
    }

    /// Iterate existing fields in grid order
    pub fn fields(&self) -> impl Iterator<Item = (Position, &Field)> + '_ {
        self.fields.iter().enumerate().flat_map(|(x, column)| {
            column.iter().enumerate().filter_map(move |(y, field)| {
                field.as_ref().map(|field| {
                    let pos = Position::new(
                        x as i8 - BOARD_EXTENT,
                        y as i8 - BOARD_EXTENT,
                    );
                    (pos, field)
                })
            })
        })
    }

    /// Number of existing fields
    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// Replace the pin on an existing field. Missing fields are ignored.
    pub(crate) fn set_occupant(&mut self, pos: Position, occupant: Option<Color>) {
        if let Some((x, y)) = pos.index() {
            if let Some(field) = self.fields[x][y].as_mut() {
                field.occupant = occupant;
            }
        }
    }

    fn set(&mut self, pos: Position, field: Field) {
        if let Some((x, y)) = pos.index() {
            self.fields[x][y] = Some(field);
        }
    }
}

/// Decide whether `pos` is part of the star and what it initially holds.
/// Corner fields are overwritten afterwards.
fn classify(pos: Position, player_count: usize) -> Option<Field> {
    let (tu, tv, tw) = pos.abs_coords();
    let extent = BOARD_EXTENT as u16;

    let in_star = (tu <= extent && tv <= ARM_WIDTH && tw <= ARM_WIDTH)
        || (tu <= ARM_WIDTH && tv <= extent && tw <= ARM_WIDTH)
        || (tu <= ARM_WIDTH && tv <= ARM_WIDTH && tw <= extent);
    if !in_star {
        return None;
    }

    if pos.distance_to_center() < CENTER_RADIUS {
        return Some(Field::default());
    }

    // The longest axis picks the triangle, its sign picks start or home
    let (color, on_start_side) = if tv >= ARM_WIDTH && tv > tu && tv > tw {
        (Color::Red, pos.v > 0)
    } else if tw >= ARM_WIDTH && tw > tv && tw > tu {
        (Color::Green, pos.w() > 0)
    } else if tu >= ARM_WIDTH && tu > tv && tu > tw {
        (Color::Blue, pos.u > 0)
    } else {
        return Some(Field::default());
    };

    let color = color.if_active(player_count);
    Some(if on_start_side {
        Field::new(None, color)
    } else {
        Field::new(color, None)
    })
}
