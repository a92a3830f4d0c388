use std::collections::{HashMap, VecDeque};

use crate::grid::{Adjacency, Pos};

/// Route from `start` toward `goal` over `adjacency`, truncated to the first
/// `moves` steps (`start` included, so at most `moves + 1` cells). `None`
/// returns the whole route.
///
/// The frontier is a FIFO queue, but each expansion enqueues its unvisited
/// neighbors sorted by Manhattan distance to `goal`, which pulls the search
/// toward the goal rather than fanning out evenly. The search stops on the
/// first expandable cell next to `goal`; `goal` itself is usually occupied
/// and is never part of the route. When nothing is reachable the route ends
/// on the last cell examined.
pub fn find_path(start: Pos, goal: Pos, adjacency: &Adjacency, moves: Option<u32>) -> Vec<Pos> {
    let mut frontier = VecDeque::from([start]);
    let mut came_from: HashMap<Pos, Pos> = HashMap::new();
    let mut current = start;

    while let Some(cell) = frontier.pop_front() {
        current = cell;
        let mut open: Vec<Pos> = adjacency
            .neighbors(cell)
            .iter()
            .copied()
            .filter(|n| !came_from.contains_key(n))
            .collect();
        if open.is_empty() {
            continue;
        }
        if cell.manhattan(goal) == 1 {
            break;
        }
        for n in &open {
            came_from.insert(*n, cell);
        }
        // stable: ties keep neighbor order
        open.sort_by_key(|n| n.manhattan(goal));
        frontier.extend(open);
    }

    let mut path = vec![current];
    while current != start {
        match came_from.get(&current) {
            Some(prev) => {
                current = *prev;
                path.push(current);
            }
            None => break,
        }
    }
    path.reverse();

    if let Some(moves) = moves {
        path.truncate(moves as usize + 1);
    }
    path
}

/// The cell a mover reaches after spending up to `moves` steps toward `goal`.
pub fn step_toward(start: Pos, goal: Pos, adjacency: &Adjacency, moves: u32) -> Pos {
    find_path(start, goal, adjacency, Some(moves))
        .last()
        .copied()
        .unwrap_or(start)
}
