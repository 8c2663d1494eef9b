//! A* search over the terrain grid.

use std::{cmp::Reverse, collections::BinaryHeap};

use wave_defence_core::CellCoord;

/// Finds a shortest 4-connected path from `start` to `goal`.
///
/// Moves cost one unit and the Manhattan heuristic steers the search. Open
/// entries with equal f-scores pop in insertion order, which only decides
/// between equally short paths. The returned path includes both endpoints.
pub(crate) fn find_path<F>(
    width: u32,
    height: u32,
    start: CellCoord,
    goal: CellCoord,
    mut is_blocked: F,
) -> Option<Vec<CellCoord>>
where
    F: FnMut(CellCoord) -> bool,
{
    let width_usize = usize::try_from(width).ok()?;
    let height_usize = usize::try_from(height).ok()?;
    let cell_count = width_usize.checked_mul(height_usize)?;
    if cell_count == 0 {
        return None;
    }

    if !contains(width, height, start) || !contains(width, height, goal) {
        return None;
    }

    if is_blocked(start) || is_blocked(goal) {
        return None;
    }

    let start_index = index(width_usize, start)?;
    let goal_index = index(width_usize, goal)?;

    let mut g_score = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut open: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    g_score[start_index] = 0;
    open.push(Reverse(OpenEntry {
        f_score: start.manhattan_distance(goal),
        sequence,
        g_score: 0,
        cell: start,
    }));

    while let Some(Reverse(entry)) = open.pop() {
        let current_index = index(width_usize, entry.cell)?;
        if current_index == goal_index {
            return Some(reconstruct(width, &came_from, goal_index));
        }

        if entry.g_score > g_score[current_index] {
            continue;
        }

        let tentative = entry.g_score + 1;
        for neighbor in neighbors(entry.cell, width, height) {
            if is_blocked(neighbor) {
                continue;
            }

            let Some(neighbor_index) = index(width_usize, neighbor) else {
                continue;
            };

            if tentative >= g_score[neighbor_index] {
                continue;
            }

            g_score[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(current_index);
            sequence += 1;
            open.push(Reverse(OpenEntry {
                f_score: tentative + neighbor.manhattan_distance(goal),
                sequence,
                g_score: tentative,
                cell: neighbor,
            }));
        }
    }

    None
}

/// Open-set entry ordered by f-score, then by insertion sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f_score: u32,
    sequence: u64,
    g_score: u32,
    cell: CellCoord,
}

fn reconstruct(width: u32, came_from: &[Option<usize>], goal_index: usize) -> Vec<CellCoord> {
    let mut path = vec![coord(width, goal_index)];
    let mut current = goal_index;
    while let Some(previous) = came_from.get(current).copied().flatten() {
        path.push(coord(width, previous));
        current = previous;
    }
    path.reverse();
    path
}

// East, west, south, north.
fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn contains(width: u32, height: u32, cell: CellCoord) -> bool {
    cell.column() < width && cell.row() < height
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord(width: u32, index: usize) -> CellCoord {
    let width = u64::from(width.max(1));
    let index = index as u64;
    CellCoord::new((index % width) as u32, (index / width) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_path_has_manhattan_length() {
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(3, 2);
        let path = find_path(4, 3, start, goal, |_| false).expect("path exists");

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn walls_force_a_detour() {
        let wall = [CellCoord::new(1, 0), CellCoord::new(1, 1)];
        let path = find_path(3, 3, CellCoord::new(0, 0), CellCoord::new(2, 0), |cell| {
            wall.contains(&cell)
        })
        .expect("detour exists");

        assert_eq!(path.len(), 7);
        assert!(path.iter().all(|cell| !wall.contains(cell)));
    }

    #[test]
    fn consecutive_cells_are_adjacent() {
        let path = find_path(5, 5, CellCoord::new(4, 4), CellCoord::new(0, 1), |cell| {
            cell == CellCoord::new(2, 2)
        })
        .expect("path exists");

        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn sealed_goal_has_no_path() {
        let goal = CellCoord::new(2, 2);
        let path = find_path(3, 3, CellCoord::new(0, 0), goal, |cell| {
            cell == CellCoord::new(1, 2) || cell == CellCoord::new(2, 1)
        });

        assert!(path.is_none());
    }

    #[test]
    fn blocked_endpoints_have_no_path() {
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(2, 0);
        assert!(find_path(3, 1, start, goal, |cell| cell == start).is_none());
        assert!(find_path(3, 1, start, goal, |cell| cell == goal).is_none());
    }

    #[test]
    fn start_equal_to_goal_is_a_single_cell_path() {
        let cell = CellCoord::new(1, 1);
        assert_eq!(find_path(2, 2, cell, cell, |_| false), Some(vec![cell]));
    }

    #[test]
    fn out_of_bounds_endpoints_have_no_path() {
        assert!(find_path(2, 2, CellCoord::new(0, 0), CellCoord::new(5, 0), |_| false).is_none());
        assert!(find_path(0, 0, CellCoord::new(0, 0), CellCoord::new(0, 0), |_| false).is_none());
    }
}
