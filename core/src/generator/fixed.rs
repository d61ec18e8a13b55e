use super::*;

/// Replays a predetermined layout, ignoring where the first reveal lands.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinefieldGenerator {
    layout: MineLayout,
}

impl FixedMinefieldGenerator {
    pub fn new(layout: MineLayout) -> Self {
        Self { layout }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        MineLayout::from_mine_coords(size, mine_coords).map(Self::new)
    }

    /// Level matching the layout, for starting a game with it.
    pub fn level(&self) -> Result<Level> {
        let (width, height) = self.layout.size();
        Level::custom(width, height, self.layout.mine_count())
    }
}

impl MinefieldGenerator for FixedMinefieldGenerator {
    fn generate(&mut self, level: &Level, start: Coord2) -> Result<MineLayout> {
        if !self.layout.matches(level) {
            return Err(GameError::InvalidBoardShape);
        }
        if self.layout.contains_mine(start) {
            log::debug!("Fixed layout has a mine on the start cell {:?}", start);
        }
        Ok(self.layout.clone())
    }
}
