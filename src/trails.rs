//! Exhaustive depth-first path search over a grid.

use rustc_hash::FxHashSet;

use crate::error::{PuzzleError, Result};
use crate::grid::{Grid, Pos};

/// Explores every path from a start cell, stepping only where `successor(from, to)`
/// holds and stopping at cells where `is_end(value)` holds.
pub struct Search<'g, T, S, E> {
    grid: &'g Grid<T>,
    successor: S,
    is_end: E,
}

impl<'g, T, S, E> Search<'g, T, S, E>
where
    S: Fn(&T, &T) -> bool,
    E: Fn(&T) -> bool,
{
    pub fn new(grid: &'g Grid<T>, successor: S, is_end: E) -> Self {
        Search {grid, successor, is_end}
    }

    /// Distinct terminal cells reachable from `start`.
    pub fn endpoints(&self, start: Pos, observe: impl FnMut(&[Pos]) -> Result<()>) -> Result<FxHashSet<Pos>> {
        let mut ends = FxHashSet::default();
        self.walk(start, observe, |end| {ends.insert(end);})?;
        Ok(ends)
    }

    /// Number of distinct paths from `start` to any terminal cell.
    pub fn path_count(&self, start: Pos, observe: impl FnMut(&[Pos]) -> Result<()>) -> Result<usize> {
        let mut count = 0;
        self.walk(start, observe, |_| count += 1)?;
        Ok(count)
    }

    /// `observe` sees the path from `start` to every node as it is entered.
    fn walk(
        &self,
        start: Pos,
        mut observe: impl FnMut(&[Pos]) -> Result<()>,
        mut reach: impl FnMut(Pos),
    ) -> Result<()> {
        let limit = self.grid.len();
        let mut path = Vec::new();
        let mut stack = vec![(start, 0)];
        while let Some((pos, depth)) = stack.pop() {
            if depth >= limit {return Err(PuzzleError::DepthExceeded {limit})}
            path.truncate(depth);
            path.push(pos);
            observe(&path)?;

            let Some(value) = self.grid.value_at(pos) else {continue};
            if (self.is_end)(value) {
                reach(pos);
                continue;
            }
            // reversed so neighbours pop in exploration order
            for &(_, next) in self.grid.neighbours(pos).iter().rev() {
                if self.grid.value_at(next).is_some_and(|next_value| (self.successor)(value, next_value)) {
                    stack.push((next, depth + 1));
                }
            }
        }
        Ok(())
    }
}

/// Hiking trails: each step climbs exactly one, ending at height 9.
pub fn uphill(
    grid: &Grid<Option<u8>>,
) -> Search<'_, Option<u8>, impl Fn(&Option<u8>, &Option<u8>) -> bool, impl Fn(&Option<u8>) -> bool> {
    Search::new(
        grid,
        |from: &Option<u8>, to: &Option<u8>| matches!((from, to), (Some(from), Some(to)) if *to == from + 1),
        |value: &Option<u8>| *value == Some(9),
    )
}

pub fn trailheads(grid: &Grid<Option<u8>>) -> impl Iterator<Item = Pos> + '_ {
    grid.iter().filter(|(_, height)| **height == Some(0)).map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore(_: &[Pos]) -> Result<()> {Ok(())}

    #[test]
    fn paths_are_reported_in_order() {
        let grid = Grid::digits("012\n..3").unwrap();
        let search = Search::new(&grid, |a: &Option<u8>, b: &Option<u8>| *b == a.map(|a| a + 1), |v: &Option<u8>| *v == Some(3));
        let mut seen = Vec::new();
        let count = search.path_count(Pos::new(0, 0), |path| {seen.push(path.to_vec()); Ok(())}).unwrap();
        assert_eq!(count, 1);
        assert_eq!(seen.last().unwrap(), &vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2), Pos::new(1, 2)]);
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn cyclic_predicate_hits_depth_limit() {
        let grid = Grid::bytes("aa\naa").unwrap();
        let search = Search::new(&grid, |_: &u8, _: &u8| true, |_: &u8| false);
        let err = search.path_count(Pos::new(0, 0), ignore).unwrap_err();
        assert!(matches!(err, PuzzleError::DepthExceeded {limit: 4}));
    }

    #[test]
    fn start_outside_grid_finds_nothing() {
        let grid = Grid::digits("09").unwrap();
        let search = uphill(&grid);
        assert!(search.endpoints(Pos::new(5, 5), ignore).unwrap().is_empty());
    }

    #[test]
    fn trailheads_are_row_major() {
        let grid = Grid::digits("10\n0.").unwrap();
        assert_eq!(trailheads(&grid).collect::<Vec<_>>(), vec![Pos::new(0, 1), Pos::new(1, 0)]);
    }
}
