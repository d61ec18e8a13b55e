use crate::*;
use serde::{Deserialize, Serialize};
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

/// Produces the mine layout once the first cell of a game is revealed.
pub trait MinefieldGenerator {
    fn generate(&mut self, level: &Level, start: Coord2) -> Result<MineLayout>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartCell {
    Random,
    SimpleSafe,
    /// The first cell and all of its neighbours are mine-free.
    #[default]
    AlwaysZero,
}
