use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Notification for the presentation layer, queued by the engine and drained by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A new grid was allocated, everything must be redrawn.
    GridReset { size: Coord2 },
    /// Mines were just placed, the game clock should start.
    FirstMoveMade,
    CellsChanged(BTreeSet<Coord2>),
    MinesRemainingChanged(isize),
    StateChanged(GameState),
    GameOver { won: bool },
}

/// Collects what one action changed so that each event kind fires at most once.
#[derive(Debug, Default)]
pub(crate) struct EventBatch {
    grid_reset: Option<Coord2>,
    first_move: bool,
    changed: BTreeSet<Coord2>,
    mines_remaining: Option<isize>,
    state: Option<GameState>,
    game_over: Option<bool>,
}

impl EventBatch {
    pub fn grid_reset(&mut self, size: Coord2) {
        self.grid_reset = Some(size);
    }

    pub fn first_move(&mut self) {
        self.first_move = true;
    }

    pub fn cell_changed(&mut self, coords: Coord2) {
        self.changed.insert(coords);
    }

    pub fn mines_remaining(&mut self, before: isize, after: isize) {
        if before != after {
            self.mines_remaining = Some(after);
        }
    }

    pub fn state_changed(&mut self, state: GameState) {
        self.state = Some(state);
    }

    pub fn game_over(&mut self, won: bool) {
        self.game_over = Some(won);
    }

    pub fn flush_into(self, queue: &mut Vec<EngineEvent>) {
        if let Some(size) = self.grid_reset {
            queue.push(EngineEvent::GridReset { size });
        }
        if self.first_move {
            queue.push(EngineEvent::FirstMoveMade);
        }
        if !self.changed.is_empty() {
            queue.push(EngineEvent::CellsChanged(self.changed));
        }
        if let Some(count) = self.mines_remaining {
            queue.push(EngineEvent::MinesRemainingChanged(count));
        }
        if let Some(state) = self.state {
            queue.push(EngineEvent::StateChanged(state));
        }
        if let Some(won) = self.game_over {
            queue.push(EngineEvent::GameOver { won });
        }
    }
}
