use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wave_defence_core::{CellCoord, PlacementError};
use wave_defence_world::GridMap;

const SEED: u64 = 0x5eed_da7a;

fn random_grid(rng: &mut ChaCha8Rng) -> GridMap {
    let columns = rng.gen_range(2..=8_u32);
    let rows = rng.gen_range(2..=8_u32);
    let cells: Vec<Vec<i32>> = (0..rows)
        .map(|_| {
            (0..columns)
                .map(|_| match rng.gen_range(0..10) {
                    0..=2 => 1,
                    3 => 2,
                    _ => 0,
                })
                .collect()
        })
        .collect();

    let start = CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
    let goal = CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
    GridMap::from_rows(&cells, start, goal, 32.0).expect("generated grid is rectangular")
}

fn bfs_length(grid: &GridMap) -> Option<usize> {
    if !grid.is_walkable(grid.start()) || !grid.is_walkable(grid.goal()) {
        return None;
    }

    let width = grid.columns() as usize;
    let mut distance = vec![None; width * grid.rows() as usize];
    let mut queue = VecDeque::new();
    let start = grid.start();
    distance[start.row() as usize * width + start.column() as usize] = Some(1);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        let current = distance[cell.row() as usize * width + cell.column() as usize]
            .expect("queued cells have a distance");
        if cell == grid.goal() {
            return Some(current);
        }

        let column = cell.column() as i64;
        let row = cell.row() as i64;
        for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nc, nr) = (column + dc, row + dr);
            if nc < 0 || nr < 0 {
                continue;
            }
            let neighbor = CellCoord::new(nc as u32, nr as u32);
            if !grid.is_walkable(neighbor) {
                continue;
            }
            let slot = &mut distance[neighbor.row() as usize * width + neighbor.column() as usize];
            if slot.is_none() {
                *slot = Some(current + 1);
                queue.push_back(neighbor);
            }
        }
    }

    None
}

#[test]
fn astar_matches_breadth_first_search_on_random_grids() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    for round in 0..400 {
        let grid = random_grid(&mut rng);
        let path = grid.find_path();

        assert_eq!(
            path.as_ref().map(Vec::len),
            bfs_length(&grid),
            "round {round}: path length differs from breadth-first search"
        );

        if let Some(path) = path {
            assert_eq!(path.first(), Some(&grid.start()));
            assert_eq!(path.last(), Some(&grid.goal()));
            for pair in path.windows(2) {
                assert_eq!(pair[0].manhattan_distance(pair[1]), 1, "round {round}");
            }
            assert!(path.iter().all(|cell| grid.is_walkable(*cell)));
        }
    }
}

#[test]
fn rejected_placements_leave_the_grid_untouched() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 0xff);
    let mut rejections = 0;

    for _ in 0..400 {
        let mut grid = random_grid(&mut rng);
        let had_path = grid.find_path().is_some();
        let cell = CellCoord::new(
            rng.gen_range(0..grid.columns() + 1),
            rng.gen_range(0..grid.rows() + 1),
        );
        let before = grid.clone();

        match grid.try_place_tower(cell) {
            Ok(()) => {
                assert!(grid.find_path().is_some(), "accepted placement sealed the goal");
                assert!(!grid.is_walkable(cell));
            }
            Err(reason) => {
                rejections += 1;
                assert_eq!(grid.codes(), before.codes(), "rejection {reason:?} mutated the grid");
                if !had_path && grid.is_buildable(cell) {
                    assert_eq!(reason, PlacementError::BlocksPath);
                }
            }
        }
    }

    assert!(rejections > 0, "expected at least one rejection");
}

#[test]
fn corridor_accepts_side_cells_and_rejects_the_corridor() {
    let rows = vec![
        vec![1, 0, 1, 0, 1],
        vec![1, 0, 1, 0, 1],
        vec![0, 0, 0, 0, 0],
        vec![1, 1, 1, 1, 1],
        vec![1, 1, 1, 1, 1],
    ];
    let mut grid = GridMap::from_rows(&rows, CellCoord::new(0, 2), CellCoord::new(4, 2), 64.0)
        .expect("valid corridor");

    assert_eq!(grid.try_place_tower(CellCoord::new(1, 0)), Ok(()));
    assert_eq!(grid.try_place_tower(CellCoord::new(3, 1)), Ok(()));
    for column in 0..5 {
        assert_eq!(
            grid.try_place_tower(CellCoord::new(column, 2)),
            Err(PlacementError::BlocksPath)
        );
    }
    assert_eq!(grid.find_path().map(|path| path.len()), Some(5));
}
