use alloc::collections::VecDeque;
use alloc::vec::{Drain, Vec};
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::event::EventBatch;
use crate::*;

/// Valid transitions:
/// - Stopped -> Playing (start/restart)
/// - Playing <-> Paused
/// - Playing -> GameOver (mine revealed or all safe cells revealed)
/// - Playing/Paused -> Stopped
/// - GameOver -> Playing (start/restart)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Stopped,
    Playing,
    Paused,
    GameOver { won: bool },
}

impl GameState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver { .. })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Whether marking cycles through an uncertain `?` mark after the flag.
    pub uncertain_marks: bool,
    /// Debug mode, mines are visible while playing.
    pub show_mines: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            uncertain_marks: true,
            show_mines: false,
        }
    }
}

/// Grid and counters of one playthrough.
#[derive(Clone, Debug, PartialEq)]
struct Session {
    level: Level,
    board: Array2<Cell>,
    first_move_done: bool,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
}

impl Session {
    fn new(level: Level) -> Self {
        Self {
            level,
            board: Array2::default(level.size().to_nd_index()),
            first_move_done: false,
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
        }
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.level.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn cell(&self, coords: Coord2) -> Cell {
        self.board[coords.to_nd_index()]
    }

    fn mines_remaining(&self) -> isize {
        (self.level.mines as isize) - (self.flagged_count.0 as isize)
    }

    fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.board.iter_neighbors(coords)
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.cell(pos).is_flagged())
            .count() as u8
    }

    /// Swaps in the generated layout, keeping marks placed before the first reveal.
    fn place_mines(&mut self, layout: MineLayout) -> Result<()> {
        if !layout.matches(&self.level) {
            return Err(GameError::InvalidBoardShape);
        }
        let mut board = layout.into_cells();
        for (cell, previous) in board.iter_mut().zip(self.board.iter()) {
            cell.set_mark(previous.mark());
        }
        self.board = board;
        self.first_move_done = true;
        Ok(())
    }

    fn set_mark(&mut self, coords: Coord2, mark: MarkState) {
        let cell = &mut self.board[coords.to_nd_index()];
        if cell.is_flagged() {
            self.flagged_count -= 1;
        }
        cell.set_mark(mark);
        if cell.is_flagged() {
            self.flagged_count += 1;
        }
    }

    fn uncover(&mut self, coords: Coord2, events: &mut EventBatch) {
        self.board[coords.to_nd_index()].uncover();
        self.revealed_count += 1;
        events.cell_changed(coords);
    }

    /// Reveals a single cell, flood filling from zero cells, and reports how the game ended if it did.
    fn reveal_cell(&mut self, coords: Coord2, events: &mut EventBatch) -> RevealOutcome {
        let cell = self.cell(coords);
        if !cell.is_revealable() {
            return RevealOutcome::NoChange;
        }

        if cell.is_mine() {
            self.board[coords.to_nd_index()].explode();
            events.cell_changed(coords);
            self.mark_errors(events);
            return RevealOutcome::HitMine;
        }

        self.uncover(coords, events);
        log::debug!(
            "Open cell at {:?}, mine count: {}",
            coords,
            cell.neighbour_mines()
        );
        if cell.neighbour_mines() == 0 {
            self.flood_fill(coords, events);
        }

        if self.revealed_count.0 == self.level.safe_cell_count() {
            self.flag_remaining_mines(events);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Uncovers the connected zero region around the already open zero cell `start` plus its
    /// numbered border. Cells are uncovered as they are queued, so each is visited once.
    fn flood_fill(&mut self, start: Coord2, events: &mut EventBatch) {
        let mut to_visit = VecDeque::from([start]);
        log::trace!("Starting flood-fill from {:?}", start);

        while let Some(visit_coords) = to_visit.pop_front() {
            // flags are a barrier, a neighbour of a zero cell is never a mine
            let neighbors: SmallVec<[Coord2; 8]> = self
                .iter_neighbors(visit_coords)
                .filter(|&pos| self.cell(pos).is_revealable())
                .collect();

            for pos in neighbors {
                self.uncover(pos, events);
                let count = self.cell(pos).neighbour_mines();
                log::trace!("Flood opened cell at {:?}, mine count: {}", pos, count);
                if count == 0 {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    /// End of game summary after a loss: wrong flags and mines left unflagged.
    fn mark_errors(&mut self, events: &mut EventBatch) {
        for ((x, y), cell) in self.board.indexed_iter_mut() {
            let wrong_flag = cell.is_flagged() && !cell.is_mine();
            let missed_mine = cell.is_mine() && cell.is_revealable();
            if wrong_flag || missed_mine {
                cell.set_error();
                events.cell_changed((x as Coord, y as Coord));
            }
        }
    }

    fn flag_remaining_mines(&mut self, events: &mut EventBatch) {
        for ((x, y), cell) in self.board.indexed_iter_mut() {
            if cell.is_mine() && cell.is_revealable() {
                cell.set_mark(MarkState::Flagged);
                self.flagged_count += 1;
                events.cell_changed((x as Coord, y as Coord));
            }
        }
    }
}

/// Minesweeper game engine, from level selection to game over.
///
/// Every command runs to completion and queues its notifications, which the caller collects with
/// [`MinefieldEngine::drain_events`].
#[derive(Clone, Debug)]
pub struct MinefieldEngine<G = RandomMinefieldGenerator> {
    generator: G,
    options: EngineOptions,
    state: GameState,
    session: Option<Session>,
    cursor: Cursor,
    events: Vec<EngineEvent>,
}

impl MinefieldEngine<RandomMinefieldGenerator> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            RandomMinefieldGenerator::from_seed(seed),
            EngineOptions::default(),
        )
    }
}

impl<G: MinefieldGenerator> MinefieldEngine<G> {
    pub fn new(generator: G, options: EngineOptions) -> Self {
        Self {
            generator,
            options,
            state: GameState::Stopped,
            session: None,
            cursor: Cursor::default(),
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn level(&self) -> Option<Level> {
        self.session.as_ref().map(|session| session.level)
    }

    /// Board size, `(0, 0)` before the first game.
    pub fn size(&self) -> Coord2 {
        self.level().map_or((0, 0), |level| level.size())
    }

    pub fn total_mines(&self) -> CellCount {
        self.level().map_or(0, |level| level.mines)
    }

    /// Mines not accounted for by flags, negative when over-flagged.
    pub fn mines_remaining(&self) -> isize {
        self.session.as_ref().map_or(0, Session::mines_remaining)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.session
            .as_ref()
            .map_or(0, |session| session.revealed_count.0)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.session
            .as_ref()
            .map_or(0, |session| session.flagged_count.0)
    }

    pub fn first_move_done(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.first_move_done)
    }

    pub fn cursor(&self) -> Option<Coord2> {
        self.cursor.position()
    }

    /// Raw state of a cell, including whether it holds a mine. Callers outside the engine go
    /// through [`MinefieldEngine::cell_view`].
    pub(crate) fn cell(&self, coords: Coord2) -> Result<Cell> {
        let session = self.session()?;
        session.validate_coords(coords).map(|coords| session.cell(coords))
    }

    /// What should be drawn for a cell, mines stay hidden until the game is over.
    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        Ok(self.cell(coords)?.view(self.mines_visible()))
    }

    /// All cells in column-major order, for full redraws.
    pub fn cells(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        let show_mines = self.mines_visible();
        self.session.iter().flat_map(move |session| {
            session
                .board
                .indexed_iter()
                .map(move |((x, y), cell)| ((x as Coord, y as Coord), cell.view(show_mines)))
        })
    }

    /// Covered, unflagged neighbours of a numbered cell, which a chord on it would reveal.
    pub fn chord_hint(&self, coords: Coord2) -> Result<SmallVec<[Coord2; 8]>> {
        let session = self.session()?;
        let coords = session.validate_coords(coords)?;
        let cell = session.cell(coords);
        if cell.cover() != CoverState::Uncovered || cell.neighbour_mines() == 0 {
            return Err(GameError::IllegalCellState);
        }
        Ok(session
            .iter_neighbors(coords)
            .filter(|&pos| session.cell(pos).is_revealable())
            .collect())
    }

    /// Notifications queued since the last call.
    pub fn drain_events(&mut self) -> Drain<'_, EngineEvent> {
        self.events.drain(..)
    }

    pub fn set_uncertain_marks(&mut self, uncertain_marks: bool) {
        self.options.uncertain_marks = uncertain_marks;
    }

    pub fn set_show_mines(&mut self, show_mines: bool) {
        let before = self.mines_visible();
        self.options.show_mines = show_mines;
        let after = self.mines_visible();
        if before == after {
            return;
        }

        let mut events = EventBatch::default();
        for (coords, cell) in self.iter_cells() {
            if cell.view(before) != cell.view(after) {
                events.cell_changed(coords);
            }
        }
        events.flush_into(&mut self.events);
    }

    pub fn start(&mut self, level: Level) -> Result<()> {
        level.validate()?;

        let session = Session::new(level);
        log::debug!(
            "Starting {:?} game, {}x{} with {} mines",
            level.kind,
            level.width,
            level.height,
            level.mines
        );
        self.session = Some(session);
        self.state = GameState::Playing;
        self.cursor = Cursor::centered(level.size());

        let mut events = EventBatch::default();
        events.grid_reset(level.size());
        events.flush_into(&mut self.events);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        let level = self.level().ok_or(GameError::InvalidLevel)?;
        self.start(level)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.check_playing()?;
        self.change_state(GameState::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != GameState::Paused {
            return Err(GameError::NotPaused);
        }
        self.change_state(GameState::Playing);
        Ok(())
    }

    /// Locks the board without discarding it.
    pub fn stop(&mut self) -> Result<()> {
        if !matches!(self.state, GameState::Playing | GameState::Paused) {
            return Err(GameError::NotPlaying);
        }
        self.change_state(GameState::Stopped);
        Ok(())
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let cell = self.checked_cell(coords)?;
        if !cell.is_covered() {
            return Err(GameError::IllegalCellState);
        }
        if cell.is_flagged() {
            return Ok(RevealOutcome::NoChange);
        }

        let mut events = EventBatch::default();
        let mines_before = self.mines_remaining();
        self.ensure_mines_placed(coords, &mut events)?;
        let outcome = self.session_mut()?.reveal_cell(coords, &mut events);
        Ok(self.finish(outcome, mines_before, events))
    }

    /// Cycles the mark of a covered cell and returns the new mark.
    pub fn flag(&mut self, coords: Coord2) -> Result<MarkState> {
        let cell = self.checked_cell(coords)?;
        if !cell.is_covered() {
            return Err(GameError::IllegalCellState);
        }

        let mark = cell.mark().cycle(self.options.uncertain_marks);
        let mut events = EventBatch::default();
        let mines_before = self.mines_remaining();
        self.session_mut()?.set_mark(coords, mark);
        events.cell_changed(coords);
        self.finish(RevealOutcome::NoChange, mines_before, events);
        Ok(mark)
    }

    /// Chord: reveals the unflagged neighbours of a numbered cell once enough flags surround it.
    pub fn auto_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let cell = self.checked_cell(coords)?;
        if cell.cover() != CoverState::Uncovered || cell.neighbour_mines() == 0 {
            return Err(GameError::IllegalCellState);
        }

        let mines_before = self.mines_remaining();
        let session = self.session_mut()?;
        if session.count_flagged_neighbors(coords) != cell.neighbour_mines() {
            return Ok(RevealOutcome::NoChange);
        }

        let mut events = EventBatch::default();
        let neighbors: SmallVec<[Coord2; 8]> = session.iter_neighbors(coords).collect();
        let mut outcome = RevealOutcome::NoChange;
        for pos in neighbors {
            outcome = outcome | session.reveal_cell(pos, &mut events);
            if outcome.is_game_over() {
                break;
            }
        }
        Ok(self.finish(outcome, mines_before, events))
    }

    /// Moves the keyboard cursor one cell, clamped to the board.
    pub fn move_cursor(&mut self, direction: Direction) -> Option<Coord2> {
        if let Some((previous, next)) = self.cursor.step(direction) {
            let mut events = EventBatch::default();
            if let Some(previous) = previous {
                events.cell_changed(previous);
            }
            events.cell_changed(next);
            events.flush_into(&mut self.events);
        }
        self.cursor.position()
    }

    pub fn place_cursor(&mut self, coords: Coord2) -> Result<()> {
        let previous = self.cursor.position();
        self.cursor.place(coords)?;
        if previous != Some(coords) {
            let mut events = EventBatch::default();
            previous
                .into_iter()
                .chain([coords])
                .for_each(|pos| events.cell_changed(pos));
            events.flush_into(&mut self.events);
        }
        Ok(())
    }

    pub fn clear_cursor(&mut self) {
        if let Some(previous) = self.cursor.position() {
            self.cursor.clear();
            let mut events = EventBatch::default();
            events.cell_changed(previous);
            events.flush_into(&mut self.events);
        }
    }

    pub fn reveal_at_cursor(&mut self) -> Result<RevealOutcome> {
        let coords = self.cursor_position()?;
        self.reveal(coords)
    }

    pub fn flag_at_cursor(&mut self) -> Result<MarkState> {
        let coords = self.cursor_position()?;
        self.flag(coords)
    }

    pub fn auto_reveal_at_cursor(&mut self) -> Result<RevealOutcome> {
        let coords = self.cursor_position()?;
        self.auto_reveal(coords)
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(GameError::NotPlaying)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(GameError::NotPlaying)
    }

    fn cursor_position(&self) -> Result<Coord2> {
        self.cursor.position().ok_or(GameError::NoCursor)
    }

    fn mines_visible(&self) -> bool {
        self.options.show_mines || self.state.is_game_over()
    }

    fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.session.iter().flat_map(|session| {
            session
                .board
                .indexed_iter()
                .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
        })
    }

    fn check_playing(&self) -> Result<()> {
        if self.state.is_playing() {
            Ok(())
        } else {
            Err(GameError::NotPlaying)
        }
    }

    /// Cell at validated coordinates of a game being played.
    fn checked_cell(&self, coords: Coord2) -> Result<Cell> {
        let cell = self.cell(coords)?;
        self.check_playing()?;
        Ok(cell)
    }

    fn ensure_mines_placed(&mut self, start: Coord2, events: &mut EventBatch) -> Result<()> {
        let session = self.session.as_mut().ok_or(GameError::NotPlaying)?;
        if session.first_move_done {
            return Ok(());
        }

        let layout = self.generator.generate(&session.level, start)?;
        session.place_mines(layout)?;
        log::debug!("First move at {:?}, mines placed", start);
        events.first_move();
        Ok(())
    }

    fn change_state(&mut self, state: GameState) {
        log::debug!("State change {:?} -> {:?}", self.state, state);
        self.state = state;
        let mut events = EventBatch::default();
        events.state_changed(state);
        events.flush_into(&mut self.events);
    }

    fn finish(
        &mut self,
        outcome: RevealOutcome,
        mines_before: isize,
        mut events: EventBatch,
    ) -> RevealOutcome {
        match outcome {
            RevealOutcome::HitMine | RevealOutcome::Won => {
                let won = outcome == RevealOutcome::Won;
                log::debug!("Game over, won: {}", won);
                self.state = GameState::GameOver { won };
                events.game_over(won);
                // mines become visible, unflagged ones are already in the batch
            }
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
        events.mines_remaining(mines_before, self.mines_remaining());
        events.flush_into(&mut self.events);
        outcome
    }
}
