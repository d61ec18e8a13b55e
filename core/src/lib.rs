#![no_std]

extern crate alloc;

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use cursor::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use generator::*;
pub use types::*;

mod cell;
mod cursor;
mod engine;
mod error;
mod event;
mod generator;
mod types;

pub const MIN_DIMENSION: Coord = 1;
pub const MAX_DIMENSION: Coord = Coord::MAX;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    Easy,
    Normal,
    Expert,
    Custom,
}

/// Board dimensions and mine count for one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    pub kind: LevelKind,
}

impl Level {
    pub const EASY: Self = Self::preset(9, 9, 10, LevelKind::Easy);
    pub const NORMAL: Self = Self::preset(16, 16, 40, LevelKind::Normal);
    pub const EXPERT: Self = Self::preset(30, 16, 99, LevelKind::Expert);

    const fn preset(width: Coord, height: Coord, mines: CellCount, kind: LevelKind) -> Self {
        Self {
            width,
            height,
            mines,
            kind,
        }
    }

    pub fn custom(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let level = Self::preset(width, height, mines, LevelKind::Custom);
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<()> {
        let dims = MIN_DIMENSION..=MAX_DIMENSION;
        if !dims.contains(&self.width) || !dims.contains(&self.height) {
            return Err(GameError::InvalidLevel);
        }
        if self.mines == 0 || self.mines >= self.total_cells() {
            return Err(GameError::InvalidLevel);
        }
        Ok(())
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

/// Serialised as its bare mine mask, the count is always recomputed on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<bool>", into = "Array2<bool>")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (x, y) = mine_mask.dim();
        if x > usize::from(MAX_DIMENSION) || y > usize::from(MAX_DIMENSION) {
            return Err(GameError::InvalidBoardShape);
        }
        // at most 255 * 255 cells, fits in CellCount
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Ok(Self {
            mine_mask,
            mine_count,
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn size(&self) -> Coord2 {
        let (x, y) = self.mine_mask.dim();
        (x as Coord, y as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // never more than 8 neighbours
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }

    /// Whether this layout can be played on `level`.
    pub fn matches(&self, level: &Level) -> bool {
        self.size() == level.size() && self.mine_count == level.mines
    }

    pub(crate) fn into_cells(self) -> Array2<Cell> {
        Array2::from_shape_fn(self.mine_mask.dim(), |(x, y)| {
            let coords = (x as Coord, y as Coord);
            Cell::with_mine(self[coords], self.adjacent_mine_count(coords))
        })
    }
}

impl TryFrom<Array2<bool>> for MineLayout {
    type Error = GameError;

    fn try_from(mine_mask: Array2<bool>) -> Result<Self> {
        Self::from_mine_mask(mine_mask)
    }
}

impl From<MineLayout> for Array2<bool> {
    fn from(layout: MineLayout) -> Self {
        layout.mine_mask
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }

    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::HitMine | Self::Won)
    }
}

/// Used to merge outcomes when revealing several cells in one action
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for level in [Level::EASY, Level::NORMAL, Level::EXPERT] {
            assert_eq!(level.validate(), Ok(()));
        }
        assert_eq!(Level::EXPERT.size(), (30, 16));
        assert_eq!(Level::EXPERT.safe_cell_count(), 480 - 99);
    }

    #[test]
    fn custom_level_rejects_bad_input() {
        assert_eq!(Level::custom(0, 5, 1), Err(GameError::InvalidLevel));
        assert_eq!(Level::custom(5, 0, 1), Err(GameError::InvalidLevel));
        assert_eq!(Level::custom(5, 5, 0), Err(GameError::InvalidLevel));
        assert_eq!(Level::custom(5, 5, 25), Err(GameError::InvalidLevel));
        assert_eq!(Level::custom(1, 1, 1), Err(GameError::InvalidLevel));
        assert!(Level::custom(5, 5, 24).is_ok());
        assert!(Level::custom(255, 255, 1).is_ok());
    }

    #[test]
    fn level_loads_from_config_json() {
        let level: Level =
            serde_json::from_str(r#"{"width":12,"height":8,"mines":20,"kind":"Custom"}"#).unwrap();
        assert_eq!(level, Level::custom(12, 8, 20).unwrap());

        let json = serde_json::to_string(&Level::EASY).unwrap();
        assert_eq!(json, r#"{"width":9,"height":9,"mines":10,"kind":"Easy"}"#);
    }

    #[test]
    fn layout_counts_neighbours() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((0, 2)), 0);
        assert_eq!(layout.adjacent_mine_count((1, 0)), 1);
        assert!(layout.contains_mine((2, 2)));
        assert!(layout.matches(&Level::custom(3, 3, 2).unwrap()));
    }

    #[test]
    fn layout_rejects_out_of_bounds_mines() {
        assert_eq!(
            MineLayout::from_mine_coords((3, 3), &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn layout_loads_count_from_mask() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();
        let json = serde_json::to_value(&layout).unwrap();

        let loaded: MineLayout = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(loaded.mine_count(), 2);
        assert_eq!(loaded, layout);

        // a stored count that disagrees with the mask is not accepted
        let stale = serde_json::json!({ "mine_mask": json, "mine_count": 1 });
        assert!(serde_json::from_value::<MineLayout>(stale).is_err());
    }

    #[test]
    fn layout_rejects_oversized_mask() {
        let json = serde_json::to_string(&Array2::<bool>::default([256, 1])).unwrap();
        assert!(serde_json::from_str::<MineLayout>(&json).is_err());
    }

    #[test]
    fn reveal_outcomes_merge_by_priority() {
        use RevealOutcome::*;
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(Revealed | Won, Won);
        assert_eq!(Won | HitMine, HitMine);
        assert_eq!(NoChange | NoChange, NoChange);
    }
}
