use serde::{Deserialize, Serialize};

use crate::*;

/// Keyboard focus on the board, always kept inside its bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    bounds: Coord2,
    position: Option<Coord2>,
}

impl Cursor {
    /// Cursor for a new board, starting at its centre.
    pub fn centered(bounds: Coord2) -> Self {
        Self {
            bounds,
            position: Some(center(bounds)),
        }
    }

    pub const fn position(&self) -> Option<Coord2> {
        self.position
    }

    pub fn place(&mut self, coords: Coord2) -> Result<()> {
        if !in_bounds(coords, self.bounds) {
            return Err(GameError::InvalidCoords);
        }
        self.position = Some(coords);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.position = None;
    }

    /// Moves one cell, stopping at the edges. An absent cursor reappears at the centre.
    /// Returns the previous and new positions when the cursor actually moved.
    pub fn step(&mut self, direction: Direction) -> Option<(Option<Coord2>, Coord2)> {
        if self.bounds.0 == 0 || self.bounds.1 == 0 {
            return None;
        }
        let previous = self.position;
        let next = match previous {
            Some(coords) => direction.step(coords, self.bounds)?,
            None => center(self.bounds),
        };
        self.position = Some(next);
        Some((previous, next))
    }
}

const fn center((width, height): Coord2) -> Coord2 {
    (width / 2, height / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_center() {
        assert_eq!(Cursor::centered((9, 9)).position(), Some((4, 4)));
        assert_eq!(Cursor::centered((30, 16)).position(), Some((15, 8)));
        assert_eq!(Cursor::centered((1, 2)).position(), Some((0, 1)));
    }

    #[test]
    fn clamps_at_edges() {
        let mut cursor = Cursor::centered((3, 2));
        cursor.place((0, 0)).unwrap();

        assert_eq!(cursor.step(Direction::Up), None);
        assert_eq!(cursor.step(Direction::Left), None);
        assert_eq!(cursor.position(), Some((0, 0)));

        assert_eq!(cursor.step(Direction::Right), Some((Some((0, 0)), (1, 0))));
        assert_eq!(cursor.step(Direction::Right), Some((Some((1, 0)), (2, 0))));
        assert_eq!(cursor.step(Direction::Right), None);
        assert_eq!(cursor.step(Direction::Down), Some((Some((2, 0)), (2, 1))));
        assert_eq!(cursor.step(Direction::Down), None);
        assert_eq!(cursor.position(), Some((2, 1)));
    }

    #[test]
    fn random_walk_never_leaves_board() {
        use Direction::*;
        let bounds = (5, 3);
        let mut cursor = Cursor::centered(bounds);
        let pattern = [Up, Up, Up, Left, Left, Left, Left, Down, Right, Down, Down, Down];

        for direction in pattern.iter().cycle().take(500) {
            cursor.step(*direction);
            let (x, y) = cursor.position().unwrap();
            assert!(x < bounds.0 && y < bounds.1);
        }
    }

    #[test]
    fn cleared_cursor_reappears_at_center() {
        let mut cursor = Cursor::centered((4, 4));
        cursor.place((0, 3)).unwrap();
        cursor.clear();

        assert_eq!(cursor.step(Direction::Left), Some((None, (2, 2))));
    }

    #[test]
    fn place_rejects_outside() {
        let mut cursor = Cursor::centered((4, 4));
        assert_eq!(cursor.place((4, 0)), Err(GameError::InvalidCoords));
        assert_eq!(cursor.position(), Some((2, 2)));
    }
}
