use serde::{Deserialize, Serialize};

/// Grid coordinate. 0-indexed; carries no bounds of its own, bounds are a
/// property of the platform it is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
