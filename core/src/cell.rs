use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverState {
    #[default]
    Covered,
    Uncovered,
    Exploded,
}

/// Player annotation on a covered cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkState {
    #[default]
    None,
    Flagged,
    Uncertain,
}

impl MarkState {
    /// Next mark in the cycle, `Uncertain` is skipped when `uncertain_marks` is off.
    pub const fn cycle(self, uncertain_marks: bool) -> Self {
        match self {
            Self::None => Self::Flagged,
            Self::Flagged if uncertain_marks => Self::Uncertain,
            Self::Flagged => Self::None,
            Self::Uncertain => Self::None,
        }
    }
}

/// Canonical state of one board position as stored by the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    mine: bool,
    cover: CoverState,
    mark: MarkState,
    error: bool,
    neighbour_mines: u8,
}

impl Cell {
    pub(crate) const fn with_mine(mine: bool, neighbour_mines: u8) -> Self {
        Self {
            mine,
            cover: CoverState::Covered,
            mark: MarkState::None,
            error: false,
            neighbour_mines,
        }
    }

    pub const fn is_mine(self) -> bool {
        self.mine
    }

    pub const fn cover(self) -> CoverState {
        self.cover
    }

    pub const fn mark(self) -> MarkState {
        self.mark
    }

    pub const fn has_error(self) -> bool {
        self.error
    }

    /// Cached count of adjacent mines, zero until mines are placed.
    pub const fn neighbour_mines(self) -> u8 {
        self.neighbour_mines
    }

    pub const fn is_covered(self) -> bool {
        matches!(self.cover, CoverState::Covered)
    }

    pub const fn is_flagged(self) -> bool {
        self.is_covered() && matches!(self.mark, MarkState::Flagged)
    }

    /// Covered and not protected by a flag.
    pub const fn is_revealable(self) -> bool {
        self.is_covered() && !matches!(self.mark, MarkState::Flagged)
    }

    pub(crate) fn uncover(&mut self) {
        self.cover = CoverState::Uncovered;
        self.mark = MarkState::None;
    }

    pub(crate) fn explode(&mut self) {
        self.cover = CoverState::Exploded;
        self.mark = MarkState::None;
    }

    pub(crate) fn set_mark(&mut self, mark: MarkState) {
        self.mark = mark;
    }

    pub(crate) fn set_error(&mut self) {
        self.error = true;
    }

    /// What a presentation layer should draw for this cell.
    pub const fn view(self, show_mines: bool) -> CellView {
        use CellView::*;
        match (self.cover, self.mark) {
            (CoverState::Exploded, _) => Exploded,
            (CoverState::Uncovered, _) => Open(self.neighbour_mines),
            (CoverState::Covered, MarkState::Flagged) if self.error => IncorrectFlag,
            (CoverState::Covered, MarkState::Flagged) => Flagged,
            (CoverState::Covered, _) if self.mine && show_mines => Mine,
            (CoverState::Covered, MarkState::Uncertain) => Uncertain,
            (CoverState::Covered, MarkState::None) => Covered,
        }
    }
}

/// Renderable state of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Covered,
    Open(u8),
    Flagged,
    Uncertain,
    Exploded,
    Mine,
    IncorrectFlag,
}

impl CellView {
    /// Whether the cell is visually closed.
    pub const fn is_closed(self) -> bool {
        use CellView::*;
        match self {
            Covered => true,
            Open(_) => false,
            Flagged => true,
            Uncertain => true,
            Exploded => false,
            Mine => false,
            IncorrectFlag => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_cycle_with_and_without_uncertain() {
        assert_eq!(MarkState::None.cycle(true), MarkState::Flagged);
        assert_eq!(MarkState::Flagged.cycle(true), MarkState::Uncertain);
        assert_eq!(MarkState::Uncertain.cycle(true), MarkState::None);

        assert_eq!(MarkState::None.cycle(false), MarkState::Flagged);
        assert_eq!(MarkState::Flagged.cycle(false), MarkState::None);
        // leftover mark from before the option was switched off
        assert_eq!(MarkState::Uncertain.cycle(false), MarkState::None);
    }

    #[test]
    fn uncover_clears_mark() {
        let mut cell = Cell::with_mine(false, 2);
        cell.set_mark(MarkState::Uncertain);
        cell.uncover();

        assert_eq!(cell.cover(), CoverState::Uncovered);
        assert_eq!(cell.mark(), MarkState::None);
        assert_eq!(cell.view(false), CellView::Open(2));
    }

    #[test]
    fn mines_only_visible_when_requested() {
        let mine = Cell::with_mine(true, 0);
        assert_eq!(mine.view(false), CellView::Covered);
        assert_eq!(mine.view(true), CellView::Mine);

        let mut flagged_mine = mine;
        flagged_mine.set_mark(MarkState::Flagged);
        assert_eq!(flagged_mine.view(true), CellView::Flagged);
        assert!(!flagged_mine.is_revealable());
    }

    #[test]
    fn wrong_flag_is_rendered_as_error() {
        let mut cell = Cell::with_mine(false, 1);
        cell.set_mark(MarkState::Flagged);
        cell.set_error();

        assert_eq!(cell.view(true), CellView::IncorrectFlag);
        assert!(cell.view(true).is_closed());
    }
}
