use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{parse_at, PuzzleError, Result};
use crate::grid::{eight_way, Grid, Pos};
use crate::registry::{Context, Solver};

pub static DAYS: [Solver; 3] = [day1, day2, day3];

const SPELLED: [&str; 9] = ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine"];

fn day1(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let mut sum = 0;
    for (ln, line) in input.lines().enumerate() {
        let line = line.as_bytes();
        let digits = (0 .. line.len()).filter_map(|at| {
            let rest = &line[at ..];
            match rest[0] {
                digit @ b'0' ..= b'9' => Some(u32::from(digit - b'0')),
                _ if part == 2 => SPELLED.iter()
                    .position(|word| rest.starts_with(word.as_bytes()))
                    .map(|n| n as u32 + 1),
                _ => None
            }
        });
        let mut digits = digits.peekable();
        let Some(&first) = digits.peek() else {
            return Err(PuzzleError::malformed(ln + 1, "no digits"));
        };
        let last = digits.last().unwrap_or(first);
        writeln!(ctx.trace, "{}: {}{}", ln + 1, first, last)?;
        sum += first * 10 + last;
    }
    Ok(sum.to_string())
}

/// Largest count seen per colour, as `[red, green, blue]`.
fn cube_maxima(game: &str, ln: usize) -> Result<[u32; 3]> {
    let mut max = [0; 3];
    for draw in game.split([';', ',']) {
        let (count, colour) = draw.trim().split_once(' ')
            .ok_or_else(|| PuzzleError::malformed(ln, format!("bad draw {:?}", draw)))?;
        let slot = match colour {
            "red" => 0, "green" => 1, "blue" => 2,
            _ => return Err(PuzzleError::malformed(ln, format!("unknown colour {:?}", colour)))
        };
        max[slot] = max[slot].max(parse_at(count, ln)?);
    }
    Ok(max)
}

fn day2(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let mut sum = 0;
    for (ln, line) in input.lines().enumerate() {
        let ln = ln + 1;
        let (id, game) = line.strip_prefix("Game ").and_then(|line| line.split_once(':'))
            .ok_or_else(|| PuzzleError::malformed(ln, "expected \"Game N: ...\""))?;
        let id: u32 = parse_at(id, ln)?;
        let [red, green, blue] = cube_maxima(game, ln)?;
        writeln!(ctx.trace, "game {}: red {} green {} blue {}", id, red, green, blue)?;
        sum += if part == 1 {
            if red <= 12 && green <= 13 && blue <= 14 {id} else {0}
        } else {
            red * green * blue
        };
    }
    Ok(sum.to_string())
}

fn day3(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let grid = Grid::bytes(input)?;
    let is_symbol = |byte: u8| byte != b'.' && !byte.is_ascii_digit();
    let mut parts = 0u64;
    let mut gears: FxHashMap<Pos, Vec<u64>> = FxHashMap::default();

    for row in 0 .. grid.height() as isize {
        let mut col = 0;
        while col < grid.width() as isize {
            let start = Pos::new(row, col);
            if !grid.value_at(start).is_some_and(u8::is_ascii_digit) {
                col += 1;
                continue;
            }
            let mut value = 0u64;
            let mut cells = Vec::new();
            while let Some(&(digit @ b'0' ..= b'9')) = grid.value_at(Pos::new(row, col)) {
                value = value.checked_mul(10).and_then(|v| v.checked_add(u64::from(digit - b'0')))
                    .ok_or(PuzzleError::Overflow("part number"))?;
                cells.push(Pos::new(row, col));
                col += 1;
            }

            let mut symbols: Vec<Pos> = cells.iter()
                .flat_map(|&cell| eight_way().map(move |delta| cell.offset(delta)))
                .filter(|&pos| grid.value_at(pos).is_some_and(|&byte| is_symbol(byte)))
                .collect();
            symbols.sort_unstable();
            symbols.dedup();
            if symbols.is_empty() {continue}

            parts += value;
            for pos in symbols {
                if grid.value_at(pos) == Some(&b'*') {gears.entry(pos).or_default().push(value)}
            }
        }
    }

    if part == 1 {return Ok(parts.to_string())}
    let mut gears = gears.into_iter().collect::<Vec<_>>();
    gears.sort_unstable();
    debug!(stars = gears.len(), "collected stars next to numbers");
    let mut ratio = 0;
    for (pos, numbers) in gears {
        if let [a, b] = numbers[..] {
            writeln!(ctx.trace, "gear at {}: {} * {}", pos, a, b)?;
            ratio += a * b;
        }
    }
    Ok(ratio.to_string())
}
