//! Partitioning a grid into 4-connected regions of equal value.

use crate::grid::{Direction, Grid, Pos};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<T> {
    pub value: T,
    /// In flood-fill order, starting with the topmost-leftmost cell.
    pub cells: Vec<Pos>,
    pub perimeter: usize,
    /// Maximal straight runs of fence.
    pub sides: usize,
}

impl<T> Region<T> {
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn price(&self) -> usize {
        self.area() * self.perimeter
    }

    pub fn bulk_price(&self) -> usize {
        self.area() * self.sides
    }
}

pub struct Partition<'g, T> {
    grid: &'g Grid<T>,
    labels: Vec<Option<usize>>,
    masks: Vec<u8>,
    regions: Vec<Region<T>>,
}

impl<'g, T: PartialEq + Clone> Partition<'g, T> {
    pub fn new(grid: &'g Grid<T>) -> Self {
        let mut partition = Partition {
            grid,
            labels: vec![None; grid.len()],
            masks: vec![0; grid.len()],
            regions: Vec::new(),
        };
        for key in 0 .. grid.len() {
            if partition.labels[key].is_none() {
                partition.fill(grid.pos_of(key));
            }
        }
        partition
    }

    fn fill(&mut self, seed: Pos) {
        let grid = self.grid;
        let label = self.regions.len();
        let Some(value) = grid.value_at(seed) else {return};
        let mut cells = Vec::new();
        let mut perimeter = 0;
        let mut stack = vec![seed];
        if let Some(key) = grid.key(seed) {self.labels[key] = Some(label)}
        while let Some(pos) = stack.pop() {
            cells.push(pos);
            let mut mask = 0;
            for dir in Direction::ALL {
                let next = pos.step(dir);
                match grid.key(next) {
                    Some(key) if grid.value_at(next) == Some(value) => {
                        if self.labels[key].is_none() {
                            self.labels[key] = Some(label);
                            stack.push(next);
                        }
                    }
                    _ => mask |= dir.bit()
                }
            }
            perimeter += mask.count_ones() as usize;
            if let Some(key) = grid.key(pos) {self.masks[key] = mask}
        }
        let sides = self.count_sides(label, &cells);
        self.regions.push(Region {value: value.clone(), cells, perimeter, sides});
    }

    /// An edge starts a new side unless the cell before it along the fence
    /// belongs to the same region and carries the same edge.
    fn count_sides(&self, label: usize, cells: &[Pos]) -> usize {
        let mut sides = 0;
        for &pos in cells {
            let mask = self.boundary_mask(pos);
            for dir in Direction::ALL {
                if mask & dir.bit() == 0 {continue}
                let before = if dir.is_vertical() {pos.step(Direction::Left)} else {pos.step(Direction::Up)};
                let continues = self.grid.key(before).is_some_and(|key|
                    self.labels[key] == Some(label) && self.masks[key] & dir.bit() != 0
                );
                if !continues {sides += 1}
            }
        }
        sides
    }

    /// Regions in discovery order: by the row-major position of their first cell.
    pub fn regions(&self) -> &[Region<T>] {
        &self.regions
    }

    pub fn region_of(&self, pos: Pos) -> Option<&Region<T>> {
        let label = self.labels[self.grid.key(pos)?]?;
        self.regions.get(label)
    }

    /// Bits of [`Direction::bit`] for every side of `pos` facing another region or the edge.
    pub fn boundary_mask(&self, pos: Pos) -> u8 {
        self.grid.key(pos).map_or(0, |key| self.masks[key])
    }

    pub fn total_price(&self) -> usize {
        self.regions.iter().map(Region::price).sum()
    }

    pub fn total_bulk_price(&self) -> usize {
        self.regions.iter().map(Region::bulk_price).sum()
    }
}

/// Sides of `pos` that face the grid edge or a different value.
pub fn exposed_edges<T: PartialEq>(grid: &Grid<T>, pos: Pos) -> usize {
    let Some(value) = grid.value_at(pos) else {return 0};
    Direction::ALL.into_iter()
        .filter(|&dir| grid.value_at(pos.step(dir)) != Some(value))
        .count()
}
