use crate::domain::platform::Platform;
use crate::domain::point::Point;
use std::collections::{HashSet, VecDeque};

/// Offsets explored for every dequeued cell, in fixed priority order:
/// up, left, down, right. BFS guarantees shortest length; this ordering
/// fixes which shortest path wins a tie, so it must not be reordered.
const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Stateless breadth-first connectivity checker over a platform.
/// 4-directional adjacency only, restricted to intact in-bounds tiles.
#[derive(Debug, Default)]
pub struct Pathfinder;

impl Pathfinder {
    pub fn new() -> Self {
        Self
    }

    /// Returns the first shortest path from `start` to `end`, both ends
    /// included. `[start]` when the two coincide; empty when no path exists
    /// or either endpoint is out of bounds. Never fails.
    pub fn find_path(&self, platform: &Platform, start: Point, end: Point) -> Vec<Point> {
        if !platform.is_within_range(start) || !platform.is_within_range(end) {
            return Vec::new();
        }

        let mut queue: VecDeque<Vec<Point>> = VecDeque::new();
        queue.push_back(vec![start]);

        let mut visited: HashSet<Point> = HashSet::new();
        visited.insert(start);

        while let Some(path) = queue.pop_front() {
            let current = path[path.len() - 1];
            if current == end {
                return path;
            }

            for (dx, dy) in DIRECTIONS {
                let next = Point::new(current.x + dx, current.y + dy);
                if platform.is_within_range(next)
                    && platform.is_tile_present(next).unwrap_or(false)
                    && !visited.contains(&next)
                {
                    visited.insert(next);
                    let mut extended = path.clone();
                    extended.push(next);
                    queue.push_back(extended);
                }
            }
        }

        Vec::new()
    }

    /// A path "is available" only when it actually goes somewhere: the
    /// trivial single-element self-path does not count. Movement is one full
    /// repositioning per turn gated only by connectivity, never hop-limited.
    pub fn is_path_available(&self, platform: &Platform, start: Point, end: Point) -> bool {
        self.find_path(platform, start, end).len() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 wide, 5 tall; tiles[x][y] layout.
    fn board_with_gaps() -> Platform {
        let mut platform = Platform::new(3, 5);
        for (x, y) in [(0, 1), (1, 1), (1, 3), (1, 4)] {
            platform.destroy_tile(Point::new(x, y)).unwrap();
        }
        platform
    }

    // A center tile fully walled off by destroyed tiles.
    fn board_without_path() -> Platform {
        let mut platform = Platform::new(3, 5);
        for (x, y) in [(0, 2), (1, 1), (1, 3), (2, 2)] {
            platform.destroy_tile(Point::new(x, y)).unwrap();
        }
        platform
    }

    #[test]
    fn finds_shortest_path_across_intact_board() {
        let platform = Platform::new(3, 5);
        let path = Pathfinder::new().find_path(&platform, Point::new(0, 0), Point::new(2, 4));

        let expected = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(2, 3),
            Point::new(2, 4),
        ];
        assert_eq!(path, expected);
    }

    #[test]
    fn routes_around_destroyed_tiles() {
        let platform = board_with_gaps();
        let path = Pathfinder::new().find_path(&platform, Point::new(0, 3), Point::new(2, 4));

        let expected = vec![
            Point::new(0, 3),
            Point::new(0, 2),
            Point::new(1, 2),
            Point::new(2, 2),
            Point::new(2, 3),
            Point::new(2, 4),
        ];
        assert_eq!(path, expected);
    }

    #[test]
    fn same_start_and_end_yields_single_element_path() {
        let platform = board_with_gaps();
        let path = Pathfinder::new().find_path(&platform, Point::new(0, 0), Point::new(0, 0));
        assert_eq!(path, vec![Point::new(0, 0)]);
    }

    #[test]
    fn returns_empty_when_disconnected() {
        let platform = board_without_path();
        let finder = Pathfinder::new();
        let start = Point::new(1, 2);
        let unreachable = [
            Point::new(0, 0),
            Point::new(0, 1),
            Point::new(0, 3),
            Point::new(0, 4),
            Point::new(1, 0),
            Point::new(1, 4),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 3),
            Point::new(2, 4),
        ];

        for end in unreachable {
            assert_eq!(finder.find_path(&platform, start, end), Vec::new());
        }
    }

    #[test]
    fn returns_empty_for_out_of_bounds_endpoints() {
        let platform = Platform::new(3, 5);
        let finder = Pathfinder::new();
        assert!(finder
            .find_path(&platform, Point::new(-1, 0), Point::new(2, 4))
            .is_empty());
        assert!(finder
            .find_path(&platform, Point::new(0, 0), Point::new(3, 5))
            .is_empty());
    }

    #[test]
    fn availability_requires_an_actual_move() {
        let platform = Platform::new(3, 5);
        let finder = Pathfinder::new();
        assert!(finder.is_path_available(&platform, Point::new(0, 0), Point::new(1, 0)));
        // Standing still is not an available path.
        assert!(!finder.is_path_available(&platform, Point::new(0, 0), Point::new(0, 0)));
    }

    #[test]
    fn availability_is_false_when_disconnected() {
        let platform = board_without_path();
        let finder = Pathfinder::new();
        assert!(!finder.is_path_available(&platform, Point::new(1, 2), Point::new(0, 0)));
    }
}
