use alloc::vec::Vec;
use rand::prelude::*;

use super::*;

/// Generation strategy that can optionally try to make the starting cell zero or at least safe, but other than that is
/// purely random.
#[derive(Clone, Debug)]
pub struct RandomMinefieldGenerator {
    rng: SmallRng,
    start_cell: StartCell,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start_cell: StartCell) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            start_cell,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(seed, StartCell::default())
    }

    fn effective_start_cell(&self, level: &Level, start: Coord2) -> StartCell {
        use StartCell::*;

        let total_cells = level.total_cells();
        // the start cell plus its clipped neighbourhood
        let zone = 1 + NeighborIter::new(start, level.size()).count() as CellCount;

        match self.start_cell {
            Random => Random,
            SimpleSafe | AlwaysZero if level.mines + 1 > total_cells => {
                log::warn!("Cannot make start cell safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if level.mines + zone > total_cells => {
                log::warn!(
                    "Cannot make start cell zero with {} mines on {} cells, fallback to simple safe",
                    level.mines,
                    total_cells
                );
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(&mut self, level: &Level, start: Coord2) -> Result<MineLayout> {
        level.validate()?;
        if !in_bounds(start, level.size()) {
            return Err(GameError::InvalidCoords);
        }

        let start_cell = self.effective_start_cell(level, start);
        let excluded = |coords: Coord2| match start_cell {
            StartCell::Random => false,
            StartCell::SimpleSafe => coords == start,
            StartCell::AlwaysZero => {
                coords.0.abs_diff(start.0) <= 1 && coords.1.abs_diff(start.1) <= 1
            }
        };

        let (width, height) = level.size();
        let mut eligible: Vec<Coord2> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&coords| !excluded(coords))
            .collect();

        // partial Fisher-Yates, the first `mines` entries end up a uniform sample
        let mines = usize::from(level.mines).min(eligible.len());
        for k in 0..mines {
            let pick = self.rng.random_range(k..eligible.len());
            eligible.swap(k, pick);
        }

        let layout = MineLayout::from_mine_coords(level.size(), &eligible[..mines])?;
        if layout.mine_count() != level.mines {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                level.mines
            );
        }
        log::debug!(
            "Generated {}x{} minefield with {} mines, start at {:?} ({:?})",
            width,
            height,
            layout.mine_count(),
            start,
            start_cell
        );
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(level: Level, start: Coord2, seed: u64) -> MineLayout {
        RandomMinefieldGenerator::from_seed(seed)
            .generate(&level, start)
            .unwrap()
    }

    #[test]
    fn places_exact_mine_count() {
        for seed in 0..32 {
            let layout = generate(Level::EXPERT, (5, 5), seed);
            assert_eq!(layout.mine_count(), 99);
            assert_eq!(layout.size(), (30, 16));
        }
    }

    #[test]
    fn start_zone_is_mine_free() {
        for seed in 0..64 {
            for start in [(0, 0), (8, 8), (4, 0), (3, 5)] {
                let layout = generate(Level::EASY, start, seed);
                assert!(!layout.contains_mine(start));
                assert_eq!(layout.adjacent_mine_count(start), 0, "seed {seed}");
            }
        }
    }

    #[test]
    fn same_seed_same_layout() {
        assert_eq!(
            generate(Level::NORMAL, (3, 3), 42),
            generate(Level::NORMAL, (3, 3), 42)
        );
        assert_ne!(
            generate(Level::NORMAL, (3, 3), 42),
            generate(Level::NORMAL, (3, 3), 43)
        );
    }

    #[test]
    fn consecutive_games_differ() {
        let mut generator = RandomMinefieldGenerator::from_seed(7);
        let first = generator.generate(&Level::NORMAL, (0, 0)).unwrap();
        let second = generator.generate(&Level::NORMAL, (0, 0)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn dense_level_falls_back_to_simple_safe() {
        // 3x3 with 8 mines leaves room only for the start cell
        let level = Level::custom(3, 3, 8).unwrap();
        for start in [(0, 0), (1, 1), (2, 1)] {
            let layout = generate(level, start, 1);
            assert_eq!(layout.mine_count(), 8);
            assert!(!layout.contains_mine(start));
        }
    }

    #[test]
    fn zone_is_clipped_at_corners() {
        // corner zone is 4 cells, so 5 mines still fit around it on 3x3
        let level = Level::custom(3, 3, 5).unwrap();
        let layout = generate(level, (0, 0), 3);
        assert_eq!(layout.adjacent_mine_count((0, 0)), 0);
        assert!(layout.contains_mine((2, 2)));
    }

    #[test]
    fn rejects_start_outside_board() {
        let mut generator = RandomMinefieldGenerator::from_seed(0);
        assert_eq!(
            generator.generate(&Level::EASY, (9, 0)),
            Err(GameError::InvalidCoords)
        );
    }
}
