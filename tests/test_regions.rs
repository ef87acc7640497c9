use advent::grid::{Grid, Pos};
use advent::regions::{exposed_edges, Partition};
use proptest::prelude::*;

fn garden() -> impl Strategy<Value = String> {
    (1usize .. 8, 1usize .. 8).prop_flat_map(|(height, width)| {
        proptest::collection::vec(proptest::sample::select(b"ABC".to_vec()), height * width)
            .prop_map(move |cells| {
                cells.chunks(width)
                    .map(|row| String::from_utf8_lossy(row).into_owned())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
    })
}

proptest! {
    #[test]
    fn regions_cover_the_grid_once(map in garden()) {
        let grid = Grid::bytes(&map).unwrap();
        let partition = Partition::new(&grid);
        let total: usize = partition.regions().iter().map(|region| region.area()).sum();
        prop_assert_eq!(total, grid.len());
        for pos in grid.positions() {
            let region = partition.region_of(pos).unwrap();
            prop_assert!(region.cells.contains(&pos));
            prop_assert_eq!(Some(&region.value), grid.value_at(pos));
        }
    }

    #[test]
    fn both_perimeter_strategies_agree(map in garden()) {
        let grid = Grid::bytes(&map).unwrap();
        let partition = Partition::new(&grid);
        for region in partition.regions() {
            let counted: usize = region.cells.iter().map(|&pos| exposed_edges(&grid, pos)).sum();
            let masked: usize = region.cells.iter().map(|&pos| partition.boundary_mask(pos).count_ones() as usize).sum();
            prop_assert_eq!(counted, region.perimeter);
            prop_assert_eq!(masked, region.perimeter);
        }
    }

    #[test]
    fn sides_are_even_and_bounded(map in garden()) {
        let grid = Grid::bytes(&map).unwrap();
        for region in Partition::new(&grid).regions() {
            prop_assert!(region.sides >= 4);
            prop_assert!(region.sides <= region.perimeter);
            prop_assert_eq!(region.sides % 2, 0);
        }
    }
}

#[test]
fn isolated_cell_is_fenced_on_all_sides() {
    let grid = Grid::bytes("ABA\nBAB\nABA").unwrap();
    let partition = Partition::new(&grid);
    let centre = Pos::new(1, 1);
    let region = partition.region_of(centre).unwrap();
    assert_eq!((region.area(), region.perimeter, region.sides), (1, 4, 4));
    assert_eq!(partition.boundary_mask(centre), 0b1111);
    assert_eq!(partition.regions().len(), 9);
}

#[test]
fn small_garden_prices() {
    let grid = Grid::bytes("AAAA\nBBCD\nBBCC\nEEEC").unwrap();
    let partition = Partition::new(&grid);
    let prices: Vec<(u8, usize)> = partition.regions().iter().map(|region| (region.value, region.price())).collect();
    assert_eq!(prices, vec![(b'A', 40), (b'B', 32), (b'C', 40), (b'D', 4), (b'E', 24)]);
    assert_eq!(partition.total_price(), 140);
    assert_eq!(partition.total_bulk_price(), 80);
}
