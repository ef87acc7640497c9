//! Rectangular grids addressed by signed `(row, col)` positions.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use arrayvec::ArrayVec;

use crate::error::{PuzzleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {Up, Right, Down, Left}

impl Direction {
    /// Exploration order used by every search in the crate.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0), Direction::Down => (1, 0),
            Direction::Left => (0, -1), Direction::Right => (0, 1),
        }
    }

    /// Clockwise quarter turn.
    pub fn turn_right(self) -> Direction {
        match self {
            Direction::Up => Direction::Right, Direction::Right => Direction::Down,
            Direction::Down => Direction::Left, Direction::Left => Direction::Up,
        }
    }

    pub fn from_glyph(glyph: u8) -> Option<Direction> {
        match glyph {
            b'^' => Some(Direction::Up), b'>' => Some(Direction::Right),
            b'v' | b'V' => Some(Direction::Down), b'<' => Some(Direction::Left),
            _ => None
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Direction::Up => '^', Direction::Right => '>',
            Direction::Down => 'v', Direction::Left => '<',
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// One bit per direction, for boundary masks.
    pub fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// The four cardinal offsets followed by the four diagonals.
pub fn eight_way() -> impl Iterator<Item = (isize, isize)> {
    let diagonals = [Direction::Up, Direction::Down].into_iter().flat_map(|vertical|
        [Direction::Left, Direction::Right].into_iter().map(move |horizontal|
            (vertical.delta().0, horizontal.delta().1)
        )
    );
    Direction::ALL.into_iter().map(Direction::delta).chain(diagonals)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pos {
    pub row: isize,
    pub col: isize,
}

impl Pos {
    pub const fn new(row: isize, col: isize) -> Pos {
        Pos {row, col}
    }

    pub fn step(self, dir: Direction) -> Pos {
        self.offset(dir.delta())
    }

    pub fn offset(self, (dr, dc): (isize, isize)) -> Pos {
        Pos::new(self.row + dr, self.col + dc)
    }
}

impl Add for Pos {
    type Output = Pos;
    fn add(self, rhs: Pos) -> Pos {Pos::new(self.row + rhs.row, self.col + rhs.col)}
}

impl Sub for Pos {
    type Output = Pos;
    fn sub(self, rhs: Pos) -> Pos {Pos::new(self.row - rhs.row, self.col - rhs.col)}
}

impl Mul<isize> for Pos {
    type Output = Pos;
    fn mul(self, rhs: isize) -> Pos {Pos::new(self.row * rhs, self.col * rhs)}
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Immutable `height × width` field stored row-major.
///
/// Callers that need per-cell metadata keep a parallel `Vec` indexed by
/// [`Grid::key`] instead of mutating the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    cells: Vec<T>,
    height: usize,
    width: usize,
}

impl<T> Grid<T> {
    /// Builds a grid from equal-length lines, mapping every byte through `cell`.
    pub fn parse(input: &str, mut cell: impl FnMut(u8, Pos) -> Result<T>) -> Result<Self> {
        let mut cells = Vec::with_capacity(input.len());
        let mut width = None;
        let mut height = 0;
        for (row, line) in input.lines().enumerate() {
            let line = line.as_bytes();
            let expected = *width.get_or_insert(line.len());
            if line.len() != expected {
                return Err(PuzzleError::RaggedGrid {line: row + 1, expected, found: line.len()});
            }
            for (col, &byte) in line.iter().enumerate() {
                cells.push(cell(byte, Pos::new(row as isize, col as isize))?);
            }
            height += 1;
        }
        match width {
            Some(width) if width > 0 => Ok(Grid {cells, height, width}),
            _ => Err(PuzzleError::Missing("grid rows"))
        }
    }

    pub fn from_fn(height: usize, width: usize, mut value: impl FnMut(Pos) -> T) -> Self {
        let cells = (0 .. height * width)
            .map(|key| value(Pos::new((key / width) as isize, (key % width) as isize)))
            .collect();
        Grid {cells, height, width}
    }

    pub fn height(&self) -> usize {self.height}
    pub fn width(&self) -> usize {self.width}

    /// `(height, width)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        (0 .. self.height as isize).contains(&pos.row) && (0 .. self.width as isize).contains(&pos.col)
    }

    /// Packed `row * width + col` index, only for positions inside the grid.
    pub fn key(&self, pos: Pos) -> Option<usize> {
        self.contains(pos).then(|| pos.row as usize * self.width + pos.col as usize)
    }

    pub fn pos_of(&self, key: usize) -> Pos {
        Pos::new((key / self.width) as isize, (key % self.width) as isize)
    }

    pub fn value_at(&self, pos: Pos) -> Option<&T> {
        self.key(pos).map(|key| &self.cells[key])
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0 .. self.cells.len()).map(|key| self.pos_of(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        self.cells.iter().enumerate().map(|(key, value)| (self.pos_of(key), value))
    }

    /// In-bounds cardinal neighbours, in [`Direction::ALL`] order.
    pub fn neighbours(&self, pos: Pos) -> ArrayVec<(Direction, Pos), 4> {
        Direction::ALL.into_iter()
            .map(|dir| (dir, pos.step(dir)))
            .filter(|&(_, next)| self.contains(next))
            .collect()
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<Pos> {
        self.cells.iter().position(|value| pred(value)).map(|key| self.pos_of(key))
    }

    /// Draws one character per cell, each row terminated by `'\n'`.
    pub fn render(&self, mut glyph: impl FnMut(Pos, &T) -> char) -> String {
        let mut out = String::with_capacity(self.height * (self.width + 1));
        for (pos, value) in self.iter() {
            out.push(glyph(pos, value));
            if pos.col as usize == self.width - 1 {out.push('\n')}
        }
        out
    }
}

impl Grid<u8> {
    pub fn bytes(input: &str) -> Result<Self> {
        Grid::parse(input, |byte, _| Ok(byte))
    }
}

impl Grid<Option<u8>> {
    /// Heights `0` to `9`; `.` marks an impassable cell.
    pub fn digits(input: &str) -> Result<Self> {
        Grid::parse(input, |byte, pos| match byte {
            b'0' ..= b'9' => Ok(Some(byte - b'0')),
            b'.' => Ok(None),
            _ => Err(PuzzleError::malformed(
                pos.row as usize + 1,
                format!("unexpected {:?} at column {}", byte as char, pos.col + 1),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn turning_four_times_is_identity() {
        for dir in Direction::ALL {
            assert_eq!(dir.turn_right().turn_right().turn_right().turn_right(), dir);
            assert_ne!(dir.turn_right(), dir);
        }
        assert_eq!(Direction::Up.turn_right(), Direction::Right);
        assert_eq!(Direction::Left.turn_right(), Direction::Up);
    }

    #[test]
    fn direction_bits_are_distinct() {
        let mask = Direction::ALL.iter().fold(0, |mask, dir| mask | dir.bit());
        assert_eq!(mask, 0b1111);
    }

    #[test]
    fn eight_way_offsets_are_unique() {
        let offsets = eight_way().collect_vec();
        assert_eq!(offsets.len(), 8);
        assert_eq!(offsets.iter().unique().count(), 8);
        assert!(!offsets.contains(&(0, 0)));
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let err = Grid::bytes("abc\nab\nabc").unwrap_err();
        assert!(matches!(err, PuzzleError::RaggedGrid {line: 2, expected: 3, found: 2}));
        assert!(matches!(Grid::bytes("").unwrap_err(), PuzzleError::Missing(_)));
    }

    #[test]
    fn value_at_is_none_outside() {
        let grid = Grid::bytes("ab\ncd").unwrap();
        assert_eq!(grid.dimensions(), (2, 2));
        assert_eq!(grid.value_at(Pos::new(1, 0)), Some(&b'c'));
        assert_eq!(grid.value_at(Pos::new(-1, 0)), None);
        assert_eq!(grid.value_at(Pos::new(0, 2)), None);
        assert_eq!(grid.key(Pos::new(1, 1)), Some(3));
        assert_eq!(grid.pos_of(3), Pos::new(1, 1));
    }

    #[test]
    fn corner_has_two_neighbours() {
        let grid = Grid::from_fn(3, 3, |_| ());
        assert_eq!(grid.neighbours(Pos::new(0, 0)).len(), 2);
        assert_eq!(grid.neighbours(Pos::new(1, 1)).len(), 4);
        assert_eq!(grid.neighbours(Pos::new(2, 1)).len(), 3);
    }

    #[test]
    fn digits_reject_letters() {
        let grid = Grid::digits("0.\n98").unwrap();
        assert_eq!(grid.value_at(Pos::new(0, 1)), Some(&None));
        assert_eq!(grid.value_at(Pos::new(1, 0)), Some(&Some(9)));
        assert!(matches!(Grid::digits("01\n2x").unwrap_err(), PuzzleError::Malformed {line: 2, ..}));
    }

    #[test]
    fn render_round_trips_bytes() {
        let grid = Grid::bytes("ab\ncd").unwrap();
        assert_eq!(grid.render(|_, &b| b as char), "ab\ncd\n");
    }
}
