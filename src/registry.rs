//! Year/day lookup table and the context every solver runs with.

use crate::error::Result;
use crate::trace::TraceLog;
use crate::{y2023, y2024};

/// `part` is 1 or 2; anything else is rejected before a solver is called.
pub type Solver = fn(part: u8, input: &str, ctx: &mut Context) -> Result<String>;

/// Tunables that individual days read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Blinks for 2024 day 11, per part.
    pub blinks: [usize; 2],
    /// Patrol snapshot cadence for 2024 day 6; `None` picks one from the grid width.
    pub snapshot_every: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {blinks: [25, 75], snapshot_every: None}
    }
}

#[derive(Debug)]
pub struct Context {
    pub trace: TraceLog,
    pub options: Options,
}

impl Context {
    pub fn new(trace: TraceLog, options: Options) -> Self {
        Context {trace, options}
    }

    /// No trace, default options.
    pub fn quiet() -> Self {
        Context::new(TraceLog::disabled(), Options::default())
    }

    /// Runs one part and closes the trace. The trace is written out even when the solver fails.
    pub fn solve(mut self, solver: Solver, part: u8, input: &str) -> Result<String> {
        let answer = solver(part, input, &mut self);
        let closed = self.trace.close();
        let answer = answer?;
        closed?;
        Ok(answer)
    }
}

pub const YEARS: [u16; 2] = [2023, 2024];

pub fn days(year: u16) -> &'static [Solver] {
    match year {
        2023 => &y2023::DAYS,
        2024 => &y2024::DAYS,
        _ => &[]
    }
}

pub fn solver(year: u16, day: u8) -> Option<Solver> {
    days(year).get(usize::from(day).checked_sub(1)?).copied()
}
