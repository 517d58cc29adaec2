use crate::domain::errors::SessionError;
use crate::domain::point::Point;

/// Per-player destructible tile board. `tiles[x][y]` is `true` while the
/// tile is intact. Dimensions are fixed at construction; tiles only ever
/// transition intact -> destroyed, never back.
#[derive(Debug, Clone)]
pub struct Platform {
    width: i32,
    height: i32,
    tiles: Vec<Vec<bool>>,
}

impl Platform {
    pub fn new(width: i32, height: i32) -> Self {
        let tiles = vec![vec![true; height as usize]; width as usize];
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bounds check. Total; never fails.
    pub fn is_within_range(&self, position: Point) -> bool {
        position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height
    }

    pub fn is_tile_present(&self, position: Point) -> Result<bool, SessionError> {
        self.ensure_range(position)?;
        Ok(self.tiles[position.x as usize][position.y as usize])
    }

    /// Destroying an already-destroyed tile is a no-op, not an error.
    pub fn destroy_tile(&mut self, position: Point) -> Result<(), SessionError> {
        self.ensure_range(position)?;
        self.tiles[position.x as usize][position.y as usize] = false;
        Ok(())
    }

    /// Defensive copy; mutating the result does not affect the platform.
    pub fn tiles(&self) -> Vec<Vec<bool>> {
        self.tiles.clone()
    }

    fn ensure_range(&self, position: Point) -> Result<(), SessionError> {
        if self.is_within_range(position) {
            Ok(())
        } else {
            Err(SessionError::OutOfRange)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> Platform {
        Platform::new(3, 5)
    }

    #[test]
    fn all_tiles_start_intact() {
        let platform = platform();
        for x in 0..3 {
            for y in 0..5 {
                assert_eq!(platform.is_tile_present(Point::new(x, y)), Ok(true));
            }
        }
    }

    #[test]
    fn bounds_check_covers_all_edges() {
        let platform = platform();
        assert!(platform.is_within_range(Point::new(0, 0)));
        assert!(platform.is_within_range(Point::new(2, 4)));
        assert!(!platform.is_within_range(Point::new(3, 0)));
        assert!(!platform.is_within_range(Point::new(0, 5)));
        assert!(!platform.is_within_range(Point::new(-1, 0)));
        assert!(!platform.is_within_range(Point::new(0, -1)));
    }

    #[test]
    fn destroy_marks_tile_absent() {
        let mut platform = platform();
        platform.destroy_tile(Point::new(1, 2)).unwrap();
        assert_eq!(platform.is_tile_present(Point::new(1, 2)), Ok(false));
        // Neighbours untouched.
        assert_eq!(platform.is_tile_present(Point::new(1, 1)), Ok(true));
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut platform = platform();
        platform.destroy_tile(Point::new(0, 0)).unwrap();
        assert_eq!(platform.destroy_tile(Point::new(0, 0)), Ok(()));
        assert_eq!(platform.is_tile_present(Point::new(0, 0)), Ok(false));
    }

    #[test]
    fn out_of_range_operations_fail() {
        let mut platform = platform();
        assert_eq!(
            platform.is_tile_present(Point::new(3, 0)),
            Err(SessionError::OutOfRange)
        );
        assert_eq!(
            platform.destroy_tile(Point::new(0, 5)),
            Err(SessionError::OutOfRange)
        );
    }

    #[test]
    fn tiles_returns_a_defensive_copy() {
        let platform = platform();
        let mut copy = platform.tiles();
        copy[0][0] = false;
        assert_eq!(platform.is_tile_present(Point::new(0, 0)), Ok(true));
    }
}
