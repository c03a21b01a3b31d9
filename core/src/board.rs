use std::collections::{HashSet, VecDeque};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::types::nd;
use crate::*;

/// Lifecycle of a single board.
///
/// `NotStarted` becomes `InProgress` on the first interaction; `Won` and
/// `Lost` are absorbing, every later mutation is a silent no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_not_started(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl PlayOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// One minesweeper round from first reveal to win or loss.
///
/// Mines are not placed at construction: the first revealed cell anchors the
/// safe zone and the layout is drawn from the stored seed, so the opening
/// move can never lose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    difficulty: Difficulty,
    config: GameConfig,
    seed: Option<u64>,
    safe_start: SafeStart,
    mines: Option<MineLayout>,
    counts: Array2<u8>,
    states: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    status: GameStatus,
    triggered_mine: Option<Coord2>,
}

impl Board {
    /// Fresh deferred board with an entropy seed.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_seed(difficulty, rand::random())
    }

    /// Deterministic variant of [`Board::new`]: the seed and the first played
    /// cell fully determine the mine layout.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        let config = difficulty.config();
        let shape = [config.rows as usize, config.columns as usize];
        Self {
            difficulty,
            config,
            seed: Some(seed),
            safe_start: SafeStart::Neighborhood,
            mines: None,
            counts: Array2::default(shape),
            states: Array2::default(shape),
            revealed_count: 0,
            flagged_count: 0,
            status: GameStatus::NotStarted,
            triggered_mine: None,
        }
    }

    /// Board over a fixed, already-placed layout, for replays and tests.
    ///
    /// Deferred placement is skipped, so playing a mine cell directly is
    /// possible and loses the game.
    pub fn with_layout(layout: MineLayout) -> Self {
        let (rows, columns) = layout.size();
        let config = GameConfig::new_unchecked(rows, columns, layout.mine_count());
        let mut board = Self {
            difficulty: Difficulty::Custom(config),
            config,
            seed: None,
            safe_start: SafeStart::Neighborhood,
            mines: None,
            counts: Array2::default([rows as usize, columns as usize]),
            states: Array2::default([rows as usize, columns as usize]),
            revealed_count: 0,
            flagged_count: 0,
            status: GameStatus::NotStarted,
            triggered_mine: None,
        };
        board.adopt_layout(layout);
        board
    }

    pub fn with_safe_start(mut self, safe_start: SafeStart) -> Self {
        self.safe_start = safe_start;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Seed driving deferred placement; `None` for fixed-layout boards.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn rows(&self) -> Coord {
        self.config.rows
    }

    pub fn columns(&self) -> Coord {
        self.config.columns
    }

    pub fn size(&self) -> Coord2 {
        (self.config.rows, self.config.columns)
    }

    pub fn total_cells(&self) -> CellCount {
        self.config.total_cells()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// Mine budget minus placed flags; negative once the player overflags.
    pub fn remaining_mines(&self) -> isize {
        self.total_mines() as isize - self.flagged_count as isize
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Cell that lost the game, if any.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.in_bounds(coords)
            && self
                .mines
                .as_ref()
                .is_some_and(|layout| layout.contains_mine(coords))
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.validate(coords)?;
        Ok(self.view(coords))
    }

    /// Row-major snapshot of every cell.
    pub fn cells(&self) -> impl Iterator<Item = CellView> + '_ {
        self.states
            .indexed_iter()
            .map(|((row, column), _)| self.view((row as Coord, column as Coord)))
    }

    /// Marks the first interaction; public so orchestration layers can start
    /// flag-first games. No-op unless the board is `NotStarted`.
    pub fn mark_started(&mut self) {
        if matches!(self.status, GameStatus::NotStarted) {
            self.status = GameStatus::InProgress;
        }
    }

    /// Reveals `coords`, placing mines first if this is the opening move.
    ///
    /// Flagged and already-revealed targets are silent no-ops, and so is any
    /// play once the game is over. Out-of-range coordinates fail fast.
    pub fn play(&mut self, coords: Coord2) -> Result<PlayOutcome> {
        let coords = self.validate(coords)?;

        if self.status.is_terminal() {
            log::debug!("Play at {:?} ignored, game is already over", coords);
            return Ok(PlayOutcome::NoChange);
        }

        match self.states[nd(coords)] {
            CellState::Flagged | CellState::Revealed => Ok(PlayOutcome::NoChange),
            CellState::Hidden => {
                if self.mines.is_none() {
                    self.place_mines(coords);
                }
                self.mark_started();
                Ok(self.reveal_cell(coords))
            }
        }
    }

    /// Toggles the flag on a hidden cell.
    ///
    /// Never places mines and never moves the status out of `NotStarted`;
    /// orchestration layers call [`Board::mark_started`] for flag-first
    /// games.
    pub fn flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate(coords)?;

        if self.status.is_terminal() {
            log::debug!("Flag at {:?} ignored, game is already over", coords);
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.states[nd(coords)] {
            CellState::Hidden => {
                self.states[nd(coords)] = CellState::Flagged;
                self.flagged_count += 1;
                FlagOutcome::Flagged
            }
            CellState::Flagged => {
                self.states[nd(coords)] = CellState::Hidden;
                self.flagged_count -= 1;
                FlagOutcome::Unflagged
            }
            CellState::Revealed => FlagOutcome::NoChange,
        })
    }

    /// Reveals every mine cell so the player can see the full board after a
    /// loss. Idempotent; the status is left untouched. A flagged mine loses
    /// its flag so that `remaining_mines` stays truthful.
    pub fn reveal_all_mines(&mut self) {
        let Some(layout) = self.mines.as_ref() else {
            return;
        };

        for ((row, column), state) in self.states.indexed_iter_mut() {
            if !layout.contains_mine((row as Coord, column as Coord)) || state.is_revealed() {
                continue;
            }
            if state.is_flagged() {
                self.flagged_count -= 1;
            }
            *state = CellState::Revealed;
        }
    }

    fn place_mines(&mut self, start: Coord2) {
        let Some(seed) = self.seed else {
            return;
        };
        let placer = RandomMinePlacer::new(seed, self.safe_start);
        let layout = placer.place(self.config, start);
        log::debug!(
            "Placed {} mines after the first reveal at {:?}",
            layout.mine_count(),
            start
        );
        self.adopt_layout(layout);
    }

    fn adopt_layout(&mut self, layout: MineLayout) {
        for ((row, column), count) in self.counts.indexed_iter_mut() {
            *count = layout.adjacent_mine_count((row as Coord, column as Coord));
        }
        self.mines = Some(layout);
    }

    fn reveal_cell(&mut self, coords: Coord2) -> PlayOutcome {
        if self.has_mine_at(coords) {
            self.states[nd(coords)] = CellState::Revealed;
            self.triggered_mine = Some(coords);
            self.status = GameStatus::Lost;
            log::debug!("Mine hit at {:?}", coords);
            PlayOutcome::Exploded
        } else {
            self.reveal_safe(coords);
            if self.all_safe_revealed() {
                self.status = GameStatus::Won;
                log::debug!("All safe cells revealed, game won");
                PlayOutcome::Won
            } else {
                PlayOutcome::Revealed
            }
        }
    }

    /// Reveals a safe cell and, when it has no adjacent mines, cascades
    /// through the connected zero region plus its numbered border. Flagged
    /// cells are skipped and act as barriers.
    fn reveal_safe(&mut self, start: Coord2) {
        let bounds = self.size();
        let before = self.revealed_count;

        self.states[nd(start)] = CellState::Revealed;
        self.revealed_count += 1;

        if self.counts[nd(start)] != 0 {
            return;
        }

        let mut visited = HashSet::from([start]);
        let mut to_visit: VecDeque<Coord2> = neighbors(start, bounds).collect();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if !matches!(self.states[nd(coords)], CellState::Hidden) {
                continue;
            }

            self.states[nd(coords)] = CellState::Revealed;
            self.revealed_count += 1;

            if self.counts[nd(coords)] == 0 {
                to_visit.extend(neighbors(coords, bounds).filter(|pos| !visited.contains(pos)));
            }
        }

        log::trace!(
            "Cascade from {:?} revealed {} cells",
            start,
            self.revealed_count - before
        );
    }

    fn all_safe_revealed(&self) -> bool {
        self.mines
            .as_ref()
            .is_some_and(|layout| self.revealed_count == layout.safe_cell_count())
    }

    fn view(&self, coords: Coord2) -> CellView {
        let state = self.states[nd(coords)];
        CellView {
            row: coords.0,
            column: coords.1,
            revealed: state.is_revealed(),
            flagged: state.is_flagged(),
            mine: self
                .mines
                .as_ref()
                .is_some_and(|layout| layout.contains_mine(coords)),
            adjacent_mines: self.counts[nd(coords)],
        }
    }

    fn in_bounds(&self, coords: Coord2) -> bool {
        coords.0 < self.config.rows && coords.1 < self.config.columns
    }

    fn validate(&self, coords: Coord2) -> Result<Coord2> {
        if self.in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfRange(coords))
        }
    }
}
