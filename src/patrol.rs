//! Step-by-step guard patrol with exact cycle detection.
//!
//! The guard walks forward until the cell ahead is an obstacle, then turns
//! clockwise in place. A patrol ends when the guard would leave the map or
//! when it turns into a `(position, direction)` state it has turned into
//! before, which can only happen on a cycle.

use rustc_hash::FxHashSet;

use crate::error::{PuzzleError, Result};
use crate::grid::{Direction, Grid, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {Running, OutOfBounds, Looped}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guard {
    pub pos: Pos,
    pub dir: Direction,
}

/// The map: `true` cells are obstacles.
#[derive(Debug, Clone)]
pub struct Lab {
    grid: Grid<bool>,
    start: Guard,
}

impl Lab {
    pub fn parse(input: &str) -> Result<Lab> {
        let mut start = None;
        let grid = Grid::parse(input, |byte, pos| match byte {
            b'#' => Ok(true),
            b'.' => Ok(false),
            _ => {
                let line = pos.row as usize + 1;
                let dir = Direction::from_glyph(byte).ok_or_else(||
                    PuzzleError::malformed(line, format!("unexpected {:?} at column {}", byte as char, pos.col + 1))
                )?;
                if let Some(Guard {pos: first, ..}) = start.replace(Guard {pos, dir}) {
                    return Err(PuzzleError::malformed(line, format!("second guard at {}, first at {}", pos, first)));
                }
                Ok(false)
            }
        })?;
        let start = start.ok_or(PuzzleError::Missing("guard"))?;
        Ok(Lab {grid, start})
    }

    pub fn grid(&self) -> &Grid<bool> {
        &self.grid
    }

    pub fn start(&self) -> Guard {
        self.start
    }

    pub fn is_obstacle(&self, pos: Pos) -> bool {
        self.grid.value_at(pos).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct Patrol<'a> {
    lab: &'a Lab,
    extra: Option<Pos>,
    guard: Guard,
    outcome: Outcome,
    steps: usize,
    history: Vec<Guard>,
    turns: FxHashSet<Guard>,
}

impl<'a> Patrol<'a> {
    pub fn new(lab: &'a Lab) -> Self {
        Patrol::resume(lab, None, lab.start)
    }

    /// Patrol with one extra obstacle at `obstacle`, starting from the guard state `from`.
    pub fn with_obstacle(lab: &'a Lab, obstacle: Pos, from: Guard) -> Self {
        Patrol::resume(lab, Some(obstacle), from)
    }

    fn resume(lab: &'a Lab, extra: Option<Pos>, guard: Guard) -> Self {
        Patrol {
            lab, extra, guard,
            outcome: Outcome::Running,
            steps: 0,
            history: vec![guard],
            turns: FxHashSet::default(),
        }
    }

    fn blocked(&self, pos: Pos) -> bool {
        self.extra == Some(pos) || self.lab.is_obstacle(pos)
    }

    /// Advances one step: leave, turn, or move. Terminated patrols stay put.
    pub fn step(&mut self) -> Outcome {
        if self.outcome != Outcome::Running {return self.outcome}
        self.steps += 1;
        let next = self.guard.pos.step(self.guard.dir);
        if !self.lab.grid.contains(next) {
            self.outcome = Outcome::OutOfBounds;
        } else if self.blocked(next) {
            self.guard.dir = self.guard.dir.turn_right();
            self.history.push(self.guard);
            if !self.turns.insert(self.guard) {self.outcome = Outcome::Looped}
        } else {
            self.guard.pos = next;
            self.history.push(self.guard);
        }
        self.outcome
    }

    /// Steps until the patrol ends, handing `observe` the step index and state after every step.
    pub fn run<E>(&mut self, mut observe: impl FnMut(usize, &Self) -> Result<(), E>) -> Result<Outcome, E> {
        loop {
            let outcome = self.step();
            observe(self.steps, self)?;
            if outcome != Outcome::Running {return Ok(outcome)}
        }
    }

    /// Steps until the patrol ends, unobserved.
    pub fn finish(&mut self) -> Outcome {
        while self.step() == Outcome::Running {}
        self.outcome
    }

    pub fn outcome(&self) -> Outcome {self.outcome}
    pub fn guard(&self) -> Guard {self.guard}
    pub fn steps(&self) -> usize {self.steps}

    /// Every state the guard has been in, oldest first.
    pub fn history(&self) -> &[Guard] {
        &self.history
    }

    pub fn visited(&self) -> FxHashSet<Pos> {
        self.history.iter().map(|guard| guard.pos).collect()
    }

    /// Each cell entered after the start, paired with the guard state just before it was first entered.
    pub fn first_visits(&self) -> Vec<(Pos, Guard)> {
        let mut seen = FxHashSet::default();
        seen.insert(self.lab.start.pos);
        self.history.windows(2)
            .filter(|pair| seen.insert(pair[1].pos))
            .map(|pair| (pair[1].pos, pair[0]))
            .collect()
    }

    /// Snapshot of the map with the walked path drawn over it. A guard that
    /// has left the map is not drawn.
    pub fn render(&self) -> String {
        let grid = &self.lab.grid;
        let mut travel = vec![0u8; grid.len()];
        for guard in &self.history {
            if let Some(key) = grid.key(guard.pos) {
                travel[key] |= if guard.dir.is_vertical() {1} else {2};
            }
        }
        grid.render(|pos, &wall| {
            if pos == self.guard.pos && self.outcome != Outcome::OutOfBounds {return self.guard.dir.glyph()}
            if wall {return '#'}
            if self.extra == Some(pos) {return 'O'}
            if pos == self.lab.start.pos {return '@'}
            match grid.key(pos).map(|key| travel[key]) {
                Some(1) => '|', Some(2) => '-', Some(3) => '+',
                _ => '.'
            }
        })
    }
}
