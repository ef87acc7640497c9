use std::iter::zip;

use bitvec::prelude::*;
use itertools::Itertools;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::{parse_at, PuzzleError, Result};
use crate::grid::{eight_way, Grid, Pos};
use crate::patrol::{Lab, Outcome, Patrol};
use crate::regions::Partition;
use crate::registry::{Context, Solver};
use crate::trace::DATA;
use crate::trails::{trailheads, uphill};

pub static DAYS: [Solver; 13] = [
    day1, day2, day3, day4, day5, day6, day7, day8, day9, day10, day11, day12, day13
];

fn numbers<T>(line: &str, ln: usize) -> Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    line.split_whitespace().map(|token| parse_at(token, ln)).collect()
}

fn day1(part: u8, input: &str, _: &mut Context) -> Result<String> {
    let mut lefts: Vec<i64> = vec![];
    let mut rights: Vec<i64> = vec![];
    for (ln, line) in input.lines().enumerate() {
        let strs: Vec<&str> = line.split_whitespace().collect();
        let [left, right] = strs[..] else {
            return Err(PuzzleError::malformed(ln + 1, format!("expected two numbers, found {}", strs.len())));
        };
        lefts.push(parse_at(left, ln + 1)?);
        rights.push(parse_at(right, ln + 1)?);
    }

    if part == 1 {
        lefts.sort_unstable();
        rights.sort_unstable();
        Ok(zip(lefts, rights).map(|(left, right)| (left - right).abs()).sum::<i64>().to_string())
    } else {
        let counts = rights.iter().counts();
        Ok(lefts.iter().map(|left|
            left * counts.get(left).copied().unwrap_or(0) as i64
        ).sum::<i64>().to_string())
    }
}

/// Strictly monotone with every step between 1 and 3.
fn safe(levels: impl Iterator<Item = i64>) -> bool {
    let diffs = levels.tuple_windows().map(|(x, y)| y - x).collect_vec();
    diffs.iter().all(|d| (1 ..= 3).contains(d)) || diffs.iter().all(|d| (-3 ..= -1).contains(d))
}

fn day2(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let mut count = 0;
    for (ln, line) in input.lines().enumerate() {
        if line.trim().is_empty() {continue}
        let levels: Vec<i64> = numbers(line, ln + 1)?;
        let verdict = if safe(levels.iter().copied()) {
            Some("safe")
        } else if part == 2 {
            (0 .. levels.len()).find(|&skip|
                safe(levels.iter().enumerate().filter(|&(ix, _)| ix != skip).map(|(_, &level)| level))
            ).map(|_| "safe once dampened")
        } else {
            None
        };
        writeln!(ctx.trace, "{}: {}", line, verdict.unwrap_or("unsafe"))?;
        if verdict.is_some() {count += 1}
    }
    Ok(count.to_string())
}

fn day3(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let pattern = Regex::new(r"mul\(([0-9]{1,3}),([0-9]{1,3})\)|do\(\)|don't\(\)").expect("pattern is valid");
    let mut enabled = true;
    let mut sum = 0u64;
    for (ln, line) in input.lines().enumerate() {
        for m in pattern.captures_iter(line) {
            match &m[0] {
                "do()" => enabled = true,
                "don't()" => if part == 2 {enabled = false},
                _ if enabled => {
                    let product = parse_at::<u64>(&m[1], ln + 1)? * parse_at::<u64>(&m[2], ln + 1)?;
                    writeln!(ctx.trace, "{} = {}", &m[0], product)?;
                    sum += product;
                }
                _ => ()
            }
        }
    }
    Ok(sum.to_string())
}

fn day4(part: u8, input: &str, _: &mut Context) -> Result<String> {
    let grid = Grid::bytes(input)?;
    let at = |pos: Pos| grid.value_at(pos).copied();
    if part == 1 {
        Ok(grid.iter().filter(|&(_, &cell)| cell == b'X').map(|(pos, _)| {
            eight_way().filter(|&(dr, dc)| {
                let delta = Pos::new(dr, dc);
                b"MAS".iter().zip(1 ..).all(|(&letter, n)| at(pos + delta * n) == Some(letter))
            }).count()
        }).sum::<usize>().to_string())
    } else {
        let crossed = |a: Pos, b: Pos| matches!((at(a), at(b)), (Some(b'M'), Some(b'S')) | (Some(b'S'), Some(b'M')));
        Ok(grid.iter().filter(|&(pos, &cell)| {
            cell == b'A' &&
            crossed(pos.offset((-1, -1)), pos.offset((1, 1))) &&
            crossed(pos.offset((-1, 1)), pos.offset((1, -1)))
        }).count().to_string())
    }
}

fn day5(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let page = |token: &str, ln: usize| -> Result<usize> {
        let page: usize = parse_at(token, ln)?;
        if page >= 100 {return Err(PuzzleError::malformed(ln, format!("page {} is not two digits", page)))}
        Ok(page)
    };

    let mut lines = input.lines().enumerate();
    let mut rules = bitarr![0; 10000];
    for (ln, line) in lines.by_ref().take_while(|&(_, line)| !line.is_empty()) {
        let Some((x, y)) = line.split_once('|') else {
            return Err(PuzzleError::malformed(ln + 1, "expected a rule \"X|Y\""));
        };
        rules.set(100 * page(x, ln + 1)? + page(y, ln + 1)?, true);
    }

    let mut sum = 0;
    for (ln, line) in lines {
        let update = line.split(',').map(|token| page(token, ln + 1)).collect::<Result<Vec<_>>>()?;
        let ordered = (0 .. update.len()).all(|x|
            (x + 1 .. update.len()).all(|y| !rules[100 * update[y] + update[x]])
        );
        if part == 1 {
            if ordered {sum += update[update.len() / 2]}
            continue;
        }
        if ordered {continue}

        let mut unsorted = update.clone();
        let mut sorted = Vec::with_capacity(unsorted.len());
        while !unsorted.is_empty() {
            let x_at = unsorted.iter().position(|&x|
                unsorted.iter().all(|&y| !rules[100 * y + x])
            ).ok_or_else(|| PuzzleError::Unsupported(format!("rules on line {} order pages {:?} cyclically", ln + 1, unsorted)))?;
            sorted.push(unsorted.swap_remove(x_at));
        }
        writeln!(ctx.trace, "{:?} -> {:?}", update, sorted)?;
        sum += sorted[sorted.len() / 2];
    }
    Ok(sum.to_string())
}

fn day6(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let lab = Lab::parse(input)?;
    let every = ctx.options.snapshot_every
        .unwrap_or(if lab.grid().width() <= 10 {1} else {25})
        .max(1);
    let trace = &mut ctx.trace;

    let mut patrol = Patrol::new(&lab);
    let outcome = patrol.run(|step, patrol| {
        if part == 1 && step % every == 0 {trace.step(|| patrol.render())} else {Ok(())}
    })?;
    if outcome == Outcome::Looped {
        return Err(PuzzleError::Unsupported("the guard never leaves the lab".into()));
    }
    debug!(steps = patrol.steps(), guard = %patrol.guard().pos, "guard left the lab");

    if part == 1 {
        trace.step(|| patrol.render())?;
        return Ok(patrol.visited().len().to_string());
    }

    let candidates = patrol.first_visits();
    debug!(candidates = candidates.len(), "trying obstacle candidates");
    let mut loops = 0;
    for (obstacle, from) in candidates {
        let mut blocked = Patrol::with_obstacle(&lab, obstacle, from);
        if blocked.finish() == Outcome::Looped {
            loops += 1;
            trace.step(|| format!("obstacle {} loops after {} steps\n{}{}", obstacle, blocked.steps(), DATA, blocked.render()))?;
        }
    }
    Ok(loops.to_string())
}

fn day7(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let mut bfs = Vec::new();
    let mut new_bfs = Vec::new();
    let mut sum = 0u64;
    for (ln, line) in input.lines().enumerate() {
        let ln = ln + 1;
        let (goal, bits) = line.split_once(':')
            .ok_or_else(|| PuzzleError::malformed(ln, "expected \"target: operands\""))?;
        let goal: u64 = parse_at(goal, ln)?;
        let bits: Vec<u64> = numbers(bits, ln)?;
        let Some((&first, rest)) = bits.split_first() else {
            return Err(PuzzleError::malformed(ln, "no operands"));
        };

        bfs.clear();
        bfs.push(first);
        for (bi, &bit) in rest.iter().enumerate() {
            // multiplying by a later zero can bring an oversized value back down
            let prune = !rest[bi + 1 ..].contains(&0);
            let decade = 10u64.checked_pow(bit.checked_ilog10().unwrap_or(0) + 1);
            new_bfs.clear();
            for &r in &bfs {
                let mut candidates = [Some(r.checked_add(bit)), Some(r.checked_mul(bit)), None];
                if part > 1 {
                    candidates[2] = Some(decade.and_then(|decade| r.checked_mul(decade)).and_then(|r| r.checked_add(bit)));
                }
                for candidate in candidates.into_iter().flatten() {
                    match candidate {
                        Some(new_r) if !prune || new_r <= goal => new_bfs.push(new_r),
                        Some(_) => (),
                        None if prune => (),
                        None => return Err(PuzzleError::Overflow("calibration value"))
                    }
                }
            }
            std::mem::swap(&mut new_bfs, &mut bfs);
        }

        if bfs.contains(&goal) {
            writeln!(ctx.trace, "{}", line)?;
            sum = sum.checked_add(goal).ok_or(PuzzleError::Overflow("calibration total"))?;
        }
    }
    Ok(sum.to_string())
}

fn day8(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let grid = Grid::parse(input, |cell, pos| match cell {
        b'0' ..= b'9' | b'A' ..= b'Z' | b'a' ..= b'z' => Ok(Some(cell)),
        b'.' | b'#' => Ok(None),
        _ => Err(PuzzleError::malformed(pos.row as usize + 1, format!("unexpected {:?} at column {}", cell as char, pos.col + 1)))
    })?;
    let mut freqs: FxHashMap<u8, Vec<Pos>> = FxHashMap::default();
    for (pos, &cell) in grid.iter() {
        if let Some(freq) = cell {freqs.entry(freq).or_default().push(pos)}
    }

    let mut antinodes = FxHashSet::default();
    for antennas in freqs.values() {
        for (&a, &b) in antennas.iter().tuple_combinations() {
            for (from, step) in [(a, a - b), (b, b - a)] {
                let harmonics = if part == 1 {1 ..= 1} else {0 ..= isize::MAX};
                for n in harmonics {
                    let pos = from + step * n;
                    if !grid.contains(pos) {break}
                    antinodes.insert(pos);
                }
            }
        }
    }

    ctx.trace.step(|| grid.render(|pos, &cell| match cell {
        Some(freq) => freq as char,
        None if antinodes.contains(&pos) => '#',
        None => '.'
    }))?;
    Ok(antinodes.len().to_string())
}

fn render_disk(blocks: &[i32]) -> String {
    blocks.iter()
        .map(|&id| u32::try_from(id).ok().and_then(|id| char::from_digit(id, 10)).unwrap_or('.'))
        .chain(std::iter::once('\n'))
        .collect()
}

/// Moves each whole file, highest id first, into the leftmost gap before it
/// that can hold it. `moved` sees the disk after every move.
fn compact_files(blocks: &mut [i32], mut moved: impl FnMut(&[i32]) -> Result<()>) -> Result<()> {
    let mut files = vec![];
    let mut gaps = vec![];
    let mut ix = 0;
    while ix < blocks.len() {
        let id = blocks[ix];
        let len = blocks[ix ..].iter().take_while(|&&block| block == id).count();
        if id == -1 {gaps.push((ix, len))} else {files.push((ix, len))}
        ix += len;
    }

    // space a file leaves behind lies right of every file still to move
    for &(start, len) in files.iter().rev() {
        let Some(gap) = gaps.iter_mut()
            .take_while(|gap| gap.0 < start)
            .find(|gap| gap.1 >= len)
        else {continue};
        let id = blocks[start];
        blocks[gap.0 ..][.. len].fill(id);
        blocks[start ..][.. len].fill(-1);
        *gap = (gap.0 + len, gap.1 - len);
        moved(blocks)?;
    }
    Ok(())
}

fn day9(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let input = input.trim().as_bytes();
    if input.is_empty() {return Err(PuzzleError::Missing("disk map"))}
    if let Some(col) = input.iter().position(|byte| !byte.is_ascii_digit()) {
        return Err(PuzzleError::malformed(1, format!("unexpected {:?} at column {}", input[col] as char, col + 1)));
    }

    let mut blocks: Vec<i32> = Vec::with_capacity(9 * input.len());
    let mut input = input.iter();
    let mut files = 0;
    for id in 0 .. {
        let Some(&n) = input.next() else {break};
        for _ in 0 .. n - b'0' {blocks.push(id)};
        files += 1;
        let Some(&n) = input.next() else {break};
        for _ in 0 .. n - b'0' {blocks.push(-1)};
    }
    debug!(blocks = blocks.len(), files, "expanded disk map");
    let small = files <= 10;
    if small {ctx.trace.step(|| render_disk(&blocks))?}

    if part == 1 {
        let (mut left, mut right) = (0, blocks.len());
        loop {
            let Some(gap) = (left .. right).find(|&ix| blocks[ix] == -1) else {break};
            let Some(file) = (gap .. right).rfind(|&ix| blocks[ix] != -1) else {break};
            blocks.swap(gap, file);
            (left, right) = (gap + 1, file);
            if small {ctx.trace.step(|| render_disk(&blocks))?}
        }
    } else {
        compact_files(&mut blocks, |blocks| {
            if small {ctx.trace.step(|| render_disk(blocks))?}
            Ok(())
        })?;
    }

    Ok(blocks.iter().enumerate().filter(|&(_, &id)| id != -1)
        .map(|(pos, &id)| pos as u64 * id as u64).sum::<u64>().to_string())
}

/// Side panel with the trailhead and depth, then the heights along `path`.
fn render_path(grid: &Grid<Option<u8>>, path: &[Pos]) -> String {
    let mut frame = format!("trailhead {} depth {}\n{}", path[0], path.len() - 1, DATA);
    frame += &grid.render(|pos, &height| match height {
        Some(height) if path.contains(&pos) => char::from(b'0' + height),
        _ => '.'
    });
    frame
}

fn day10(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let grid = Grid::digits(input)?;
    let search = uphill(&grid);
    let trace = &mut ctx.trace;
    let mut observe = |path: &[Pos]| -> Result<()> {
        trace.step(|| render_path(&grid, path))?;
        Ok(())
    };

    let mut total = 0;
    for head in trailheads(&grid) {
        total += if part == 1 {
            search.endpoints(head, &mut observe)?.len()
        } else {
            search.path_count(head, &mut observe)?
        };
    }
    Ok(total.to_string())
}

fn blink(stones: &FxHashMap<u64, u64>) -> Result<FxHashMap<u64, u64>> {
    let mut next: FxHashMap<u64, u64> = FxHashMap::default();
    for (&stone, &count) in stones {
        let mut add = |stone: u64| -> Result<()> {
            let slot = next.entry(stone).or_default();
            *slot = slot.checked_add(count).ok_or(PuzzleError::Overflow("stone count"))?;
            Ok(())
        };
        if stone == 0 {
            add(1)?;
            continue;
        }
        let digits = stone.ilog10() + 1;
        if digits % 2 == 0 {
            let half = 10u64.pow(digits / 2);
            add(stone / half)?;
            add(stone % half)?;
        } else {
            add(stone.checked_mul(2024).ok_or(PuzzleError::Overflow("stone engraving"))?)?;
        }
    }
    Ok(next)
}

fn stone_total(stones: &FxHashMap<u64, u64>) -> Result<u64> {
    stones.values().try_fold(0u64, |sum, &count| sum.checked_add(count))
        .ok_or(PuzzleError::Overflow("stone count"))
}

fn day11(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let mut stones: FxHashMap<u64, u64> = FxHashMap::default();
    for stone in numbers::<u64>(input.trim(), 1)? {
        *stones.entry(stone).or_default() += 1;
    }
    let blinks = ctx.options.blinks[usize::from(part) - 1];
    for round in 1 ..= blinks {
        stones = blink(&stones)?;
        if ctx.trace.is_active() {
            writeln!(ctx.trace, "blink {}: {} stones, {} distinct", round, stone_total(&stones)?, stones.len())?;
        }
    }
    Ok(stone_total(&stones)?.to_string())
}

fn day12(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let grid = Grid::bytes(input)?;
    let partition = Partition::new(&grid);
    debug!(regions = partition.regions().len(), "partitioned garden");
    for region in partition.regions() {
        writeln!(
            ctx.trace, "{} at {}: area {} perimeter {} sides {}",
            region.value as char, region.cells[0], region.area(), region.perimeter, region.sides,
        )?;
    }
    let total = if part == 1 {partition.total_price()} else {partition.total_bulk_price()};
    Ok(total.to_string())
}

type Vector = (i64, i64);

/// Cheapest `3a + b` with `a·A + b·B = prize`, if any whole solution exists.
fn cheapest(a: Vector, b: Vector, prize: Vector, limit: Option<i64>) -> Result<Option<i64>> {
    let det = a.0 * b.1 - a.1 * b.0;
    if det == 0 {
        return Err(PuzzleError::Unsupported(format!("buttons {:?} and {:?} are colinear", a, b)));
    }
    let presses_a = prize.0 * b.1 - prize.1 * b.0;
    let presses_b = a.0 * prize.1 - a.1 * prize.0;
    if presses_a % det != 0 || presses_b % det != 0 {return Ok(None)}
    let (presses_a, presses_b) = (presses_a / det, presses_b / det);
    if presses_a < 0 || presses_b < 0 {return Ok(None)}
    if limit.is_some_and(|limit| presses_a > limit || presses_b > limit) {return Ok(None)}
    Ok(Some(3 * presses_a + presses_b))
}

fn day13(part: u8, input: &str, ctx: &mut Context) -> Result<String> {
    let pattern = Regex::new(
        r"^Button A: X\+(\d+), Y\+(\d+)\nButton B: X\+(\d+), Y\+(\d+)\nPrize: X=(\d+), Y=(\d+)$"
    ).expect("pattern is valid");
    let (offset, limit) = if part == 1 {(0, Some(100))} else {(10_000_000_000_000, None)};

    let lines = input.lines().enumerate().collect_vec();
    let mut total = 0;
    for block in lines.split(|(_, line)| line.trim().is_empty()).filter(|block| !block.is_empty()) {
        let ln = block[0].0 + 1;
        let text = block.iter().map(|(_, line)| line.trim()).join("\n");
        let m = pattern.captures(&text)
            .ok_or_else(|| PuzzleError::malformed(ln, "expected a claw machine"))?;
        let field = |ix: usize| parse_at::<i64>(&m[ix], ln);
        let (a, b) = ((field(1)?, field(2)?), (field(3)?, field(4)?));
        let prize = (field(5)? + offset, field(6)? + offset);
        let cost = cheapest(a, b, prize, limit)?;
        writeln!(ctx.trace, "machine at line {}: {:?}", ln, cost)?;
        total += cost.unwrap_or(0);
    }
    Ok(total.to_string())
}
