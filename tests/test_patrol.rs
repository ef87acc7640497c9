use advent::grid::{Direction, Pos};
use advent::patrol::{Lab, Outcome, Patrol};
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

fn open_lab(height: usize, width: usize, guard: Pos, dir: Direction) -> String {
    (0 .. height as isize).map(|row|
        (0 .. width as isize)
            .map(|col| if Pos::new(row, col) == guard {dir.glyph()} else {'.'})
            .collect::<String>()
    ).collect::<Vec<_>>().join("\n")
}

proptest! {
    #[test]
    fn clear_path_exits_quickly(
        height in 1usize .. 12,
        width in 1usize .. 12,
        row in 0usize .. 12,
        col in 0usize .. 12,
        dir in proptest::sample::select(Direction::ALL.to_vec()),
    ) {
        let guard = Pos::new((row % height) as isize, (col % width) as isize);
        let lab = Lab::parse(&open_lab(height, width, guard, dir)).unwrap();
        let mut patrol = Patrol::new(&lab);
        prop_assert_eq!(patrol.finish(), Outcome::OutOfBounds);
        prop_assert!(patrol.steps() <= height + width);
    }
}

#[test]
fn example_lab_visits_forty_one_cells() {
    let lab = Lab::parse(LAB).unwrap();
    assert_eq!(lab.start().pos, Pos::new(6, 4));
    let mut patrol = Patrol::new(&lab);
    assert_eq!(patrol.finish(), Outcome::OutOfBounds);
    assert_eq!(patrol.visited().len(), 41);
    assert_eq!(patrol.first_visits().len(), 40);
}

#[test]
fn obstacle_next_to_start_loops() {
    let lab = Lab::parse(LAB).unwrap();
    let start = lab.start();
    let obstacle = Pos::new(6, 3);
    let mut plain = Patrol::new(&lab);
    plain.finish();
    let from = plain.first_visits().into_iter()
        .find(|&(pos, _)| pos == obstacle)
        .map(|(_, from)| from)
        .unwrap();

    let mut blocked = Patrol::with_obstacle(&lab, obstacle, from);
    assert_eq!(blocked.finish(), Outcome::Looped);
    assert!(!lab.is_obstacle(obstacle));
    assert!(blocked.render().contains('O'));
    assert_ne!(from, start);
}

#[test]
fn observer_sees_every_step_in_order() {
    let lab = Lab::parse(LAB).unwrap();
    let mut patrol = Patrol::new(&lab);
    let mut seen = Vec::new();
    let outcome = patrol.run(|step, patrol| -> Result<(), ()> {
        seen.push((step, patrol.guard()));
        Ok(())
    }).unwrap();
    assert_eq!(outcome, Outcome::OutOfBounds);
    assert_eq!(seen.len(), patrol.steps());
    assert!(seen.iter().enumerate().all(|(ix, &(step, _))| step == ix + 1));
    assert_eq!(seen.last().map(|&(_, guard)| guard), Some(patrol.guard()));
}

#[test]
fn observer_errors_stop_the_patrol() {
    let lab = Lab::parse(LAB).unwrap();
    let mut patrol = Patrol::new(&lab);
    let err = patrol.run(|step, _| if step == 3 {Err("stop")} else {Ok(())}).unwrap_err();
    assert_eq!(err, "stop");
    assert_eq!(patrol.steps(), 3);
    assert_eq!(patrol.outcome(), Outcome::Running);
}
