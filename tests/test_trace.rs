use std::sync::atomic::{AtomicUsize, Ordering};

use advent::error::PuzzleError;
use advent::registry::{self, Context, Options};
use advent::replay::parse_frames;
use advent::trace::{TraceLog, DATA, STEP};
use indoc::indoc;
use proptest::prelude::*;

const LAB: &str = indoc! {"
    ....#.....
    .........#
    ..........
    ..#.......
    .......#..
    ..........
    .#..^.....
    ........#.
    #.........
    ......#...
"};

fn temp_path(tag: &str) -> std::path::PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("advent-{}-{}-{}.txt", tag, std::process::id(), n))
}

fn traced(year: u16, day: u8, part: u8, input: &str) -> String {
    let solver = registry::solver(year, day).unwrap();
    let mut ctx = Context::new(TraceLog::in_memory(), Options::default());
    solver(part, input, &mut ctx).unwrap();
    ctx.trace.contents().to_owned()
}

#[test]
fn traces_are_deterministic() {
    for part in [1, 2] {
        let first = traced(2024, 6, part, LAB);
        assert!(!first.is_empty());
        assert_eq!(first, traced(2024, 6, part, LAB));
    }
    let garden = "AAAA\nBBCD\nBBCC\nEEEC";
    assert_eq!(traced(2024, 12, 1, garden), traced(2024, 12, 1, garden));
}

#[test]
fn patrol_trace_replays_as_full_frames() {
    let log = traced(2024, 6, 1, LAB);
    let frames = parse_frames(&log).unwrap();
    assert_eq!(frames.len(), log.matches(STEP).count());
    assert!(frames.iter().all(|frame| frame.data.lines().count() == 10 && frame.meta.is_empty()));
    let last = &frames[frames.len() - 1].data;
    assert_eq!(last.matches(['|', '-', '+', '@']).count(), 41);
}

#[test]
fn loop_frames_carry_a_side_panel() {
    let log = traced(2024, 6, 2, LAB);
    let frames = parse_frames(&log).unwrap();
    assert_eq!(frames.len(), 6);
    assert_eq!(log.matches(DATA).count(), 6);
    assert!(frames.iter().all(|frame| frame.meta.starts_with("obstacle") && frame.data.contains('O')));
}

#[test]
fn file_trace_matches_memory_trace() {
    let path = temp_path("patrol");
    let mut ctx = Context::new(TraceLog::to_file(&path, 512).unwrap(), Options::default());
    registry::solver(2024, 6).unwrap()(1, LAB, &mut ctx).unwrap();
    ctx.trace.close().unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, traced(2024, 6, 1, LAB));
}

#[test]
fn failing_run_still_writes_its_trace() {
    let path = temp_path("failing");
    let ctx = Context::new(TraceLog::to_file(&path, 1 << 20).unwrap(), Options::default());
    let result = ctx.solve(registry::solver(2024, 2).unwrap(), 1, "1 2 3\n7 x 9");
    assert!(matches!(result, Err(PuzzleError::Malformed {line: 2, ..})));
    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, "1 2 3: safe\n");
}

#[test]
fn quiet_context_writes_nothing() {
    let mut ctx = Context::quiet();
    registry::solver(2024, 6).unwrap()(1, LAB, &mut ctx).unwrap();
    assert_eq!(ctx.trace.contents(), "");
}

proptest! {
    #[test]
    fn flushing_preserves_every_byte(
        chunks in proptest::collection::vec("[a-z=\n]{0,40}", 0 .. 20),
        flush_at in 0usize .. 100,
    ) {
        let path = temp_path("chunks");
        let mut trace = TraceLog::to_file(&path, flush_at).unwrap();
        for chunk in &chunks {
            trace.write_str(chunk).unwrap();
        }
        trace.close().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        prop_assert_eq!(written, chunks.concat());
    }
}
