use bitflags::bitflags;

use crate::*;

/// Timer seam owned by the host platform.
///
/// The host decides the tick cadence (nominally one second) and calls
/// [`GameController::tick`] while the timer runs. Starting a running timer
/// and stopping a stopped one are no-ops.
pub trait GameTimer {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Timer for hosts that drive ticks themselves, and for tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualTimer {
    running: bool,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameTimer for ManualTimer {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

bitflags! {
    /// View properties whose values changed during a controller call.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Changed: u16 {
        const ITEMS = 1;
        const ROWS = 1 << 1;
        const COLUMNS = 1 << 2;
        const MINES = 1 << 3;
        const REMAINING_MINES = 1 << 4;
        const GAME_TIME = 1 << 5;
        const STATUS = 1 << 6;
        const DIFFICULTY = 1 << 7;
    }
}

/// Scalar board properties mirrored for the view between calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    rows: Coord,
    columns: Coord,
    mines: CellCount,
    remaining_mines: isize,
    status: GameStatus,
    difficulty: Difficulty,
}

impl Snapshot {
    fn of(board: &Board) -> Self {
        Self {
            rows: board.rows(),
            columns: board.columns(),
            mines: board.total_mines(),
            remaining_mines: board.remaining_mines(),
            status: board.status(),
            difficulty: board.difficulty(),
        }
    }

    fn diff(&self, next: &Self) -> Changed {
        let mut changed = Changed::empty();
        if self.rows != next.rows {
            changed |= Changed::ROWS;
        }
        if self.columns != next.columns {
            changed |= Changed::COLUMNS;
        }
        if self.mines != next.mines {
            changed |= Changed::MINES;
        }
        if self.remaining_mines != next.remaining_mines {
            changed |= Changed::REMAINING_MINES;
        }
        if self.status != next.status {
            changed |= Changed::STATUS;
        }
        if self.difficulty != next.difficulty {
            changed |= Changed::DIFFICULTY;
        }
        changed
    }
}

/// Presentation-facing wrapper around [`Board`].
///
/// Mutating calls return the [`Changed`] set so pull-model views know what
/// to refresh. The first interaction of either kind starts the timer and the
/// game; a terminal transition stops the timer and, on a loss, uncovers the
/// full minefield. After [`GameController::dispose`] every mutation is a
/// logged no-op and reads come back empty.
#[derive(Debug)]
pub struct GameController<T: GameTimer> {
    board: Option<Board>,
    timer: Option<T>,
    snapshot: Snapshot,
    game_time: u32,
}

impl<T: GameTimer> GameController<T> {
    pub fn new(difficulty: Difficulty, timer: T) -> Self {
        Self::with_board(Board::new(difficulty), timer)
    }

    /// Controller over a prepared board, for replays and tests.
    pub fn with_board(board: Board, timer: T) -> Self {
        let snapshot = Snapshot::of(&board);
        Self {
            board: Some(board),
            timer: Some(timer),
            snapshot,
            game_time: 0,
        }
    }

    /// Discards the current board and starts over at `difficulty`.
    pub fn new_game(&mut self, difficulty: Difficulty) -> Changed {
        if self.is_disposed() {
            log::warn!("New game requested on a disposed controller, ignoring");
            return Changed::empty();
        }

        if let Some(timer) = self.timer.as_mut() {
            timer.stop();
        }
        let board = self.board.insert(Board::new(difficulty));
        self.snapshot = Snapshot::of(board);
        self.game_time = 0;
        log::debug!(
            "New {:?} game: {}x{} with {} mines",
            difficulty,
            self.snapshot.rows,
            self.snapshot.columns,
            self.snapshot.mines
        );
        Changed::all()
    }

    pub fn play(&mut self, coords: Coord2) -> Result<Changed> {
        let Some(board) = self.board.as_mut() else {
            log::warn!("Play at {:?} on a disposed controller, ignoring", coords);
            return Ok(Changed::empty());
        };

        // reject out-of-range before the first-move bootstrap runs
        board.cell_at(coords)?;
        if board.status().is_not_started() {
            board.mark_started();
            if let Some(timer) = self.timer.as_mut() {
                timer.start();
            }
        }

        let outcome = board.play(coords)?;
        let mut changed = self.sync();
        if outcome.has_update() {
            changed |= Changed::ITEMS;
        }
        Ok(changed)
    }

    pub fn flag(&mut self, coords: Coord2) -> Result<Changed> {
        let Some(board) = self.board.as_mut() else {
            log::warn!("Flag at {:?} on a disposed controller, ignoring", coords);
            return Ok(Changed::empty());
        };

        board.cell_at(coords)?;
        if board.status().is_not_started() {
            board.mark_started();
            if let Some(timer) = self.timer.as_mut() {
                timer.start();
            }
        }

        let outcome = board.flag(coords)?;
        let mut changed = self.sync();
        if outcome.has_update() {
            changed |= Changed::ITEMS;
        }
        Ok(changed)
    }

    /// Advances the elapsed-time counter by one timer period.
    pub fn tick(&mut self) -> Changed {
        if self.is_disposed() {
            return Changed::empty();
        }

        let running = self.timer.as_ref().is_some_and(|timer| timer.is_running());
        if running && matches!(self.snapshot.status, GameStatus::InProgress) {
            self.game_time += 1;
            Changed::GAME_TIME
        } else {
            Changed::empty()
        }
    }

    /// Stops the timer and drops the board; later calls are logged no-ops.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }

        if let Some(timer) = self.timer.as_mut() {
            timer.stop();
        }
        self.timer = None;
        self.board = None;
        log::debug!("Game controller disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.board.is_none()
    }

    /// Row-major cell snapshots; empty once disposed.
    pub fn items(&self) -> Vec<CellView> {
        self.board
            .as_ref()
            .map(|board| board.cells().collect())
            .unwrap_or_default()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn timer(&self) -> Option<&T> {
        self.timer.as_ref()
    }

    pub fn rows(&self) -> Coord {
        self.snapshot.rows
    }

    pub fn columns(&self) -> Coord {
        self.snapshot.columns
    }

    pub fn total_mines(&self) -> CellCount {
        self.snapshot.mines
    }

    pub fn remaining_mines(&self) -> isize {
        self.snapshot.remaining_mines
    }

    pub fn status(&self) -> GameStatus {
        self.snapshot.status
    }

    pub fn difficulty(&self) -> Difficulty {
        self.snapshot.difficulty
    }

    /// Whole timer periods elapsed since the first interaction.
    pub fn game_time(&self) -> u32 {
        self.game_time
    }

    /// Applies terminal reactions and refreshes the scalar mirror.
    fn sync(&mut self) -> Changed {
        let Some(board) = self.board.as_mut() else {
            return Changed::empty();
        };

        let status = board.status();
        if status != self.snapshot.status && status.is_terminal() {
            if let Some(timer) = self.timer.as_mut() {
                timer.stop();
            }
            if matches!(status, GameStatus::Lost) {
                board.reveal_all_mines();
            }
            log::debug!("Game over: {:?} after {}s", status, self.game_time);
        }

        let next = Snapshot::of(board);
        let changed = self.snapshot.diff(&next);
        self.snapshot = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(size: Coord2, mines: &[Coord2]) -> GameController<ManualTimer> {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        GameController::with_board(Board::with_layout(layout), ManualTimer::new())
    }

    fn timer_running<T: GameTimer>(controller: &GameController<T>) -> bool {
        controller.timer().is_some_and(|timer| timer.is_running())
    }

    #[test]
    fn first_play_starts_timer_and_game() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);
        assert!(!timer_running(&game));

        let changed = game.play((0, 0)).unwrap();

        assert!(changed.contains(Changed::STATUS));
        assert!(changed.contains(Changed::ITEMS));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(timer_running(&game));
    }

    #[test]
    fn first_flag_also_starts_timer_and_game() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);

        let changed = game.flag((1, 1)).unwrap();

        assert!(changed.contains(Changed::STATUS));
        assert!(changed.contains(Changed::REMAINING_MINES));
        assert!(changed.contains(Changed::ITEMS));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(timer_running(&game));
        assert_eq!(game.remaining_mines(), 1);
    }

    #[test]
    fn out_of_range_does_not_bootstrap() {
        let mut game = controller((3, 3), &[(0, 2)]);

        let result = game.play((9, 9));

        assert_eq!(result, Err(GameError::OutOfRange((9, 9))));
        assert_eq!(game.status(), GameStatus::NotStarted);
        assert!(!timer_running(&game));
    }

    #[test]
    fn tick_counts_only_while_in_progress() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);

        assert_eq!(game.tick(), Changed::empty());
        assert_eq!(game.game_time(), 0);

        game.play((0, 0)).unwrap();
        assert_eq!(game.tick(), Changed::GAME_TIME);
        assert_eq!(game.tick(), Changed::GAME_TIME);
        assert_eq!(game.game_time(), 2);
    }

    #[test]
    fn unflagging_restores_remaining_mines() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);

        game.flag((1, 1)).unwrap();
        let changed = game.flag((1, 1)).unwrap();

        assert!(changed.contains(Changed::REMAINING_MINES));
        assert!(changed.contains(Changed::ITEMS));
        assert!(!changed.contains(Changed::STATUS));
        assert_eq!(game.remaining_mines(), 2);
    }

    #[test]
    fn flagging_the_whole_board_never_wins() {
        let mut game = GameController::new(Difficulty::Easy, ManualTimer::new());

        for row in 0..9 {
            for column in 0..9 {
                game.flag((row, column)).unwrap();
            }
        }

        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.remaining_mines(), -71);
        assert!(timer_running(&game));

        // unflag one cell and open it, the first reveal must still be safe
        game.flag((4, 4)).unwrap();
        let changed = game.play((4, 4)).unwrap();

        assert!(changed.contains(Changed::ITEMS));
        assert_eq!(game.status(), GameStatus::InProgress);
        let opened = game.board().unwrap().cell_at((4, 4)).unwrap();
        assert!(opened.revealed);
        assert!(!opened.mine);
    }

    #[test]
    fn loss_stops_timer_and_uncovers_the_minefield() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);

        let changed = game.play((0, 2)).unwrap();

        assert!(changed.contains(Changed::STATUS));
        assert!(changed.contains(Changed::ITEMS));
        assert_eq!(game.status(), GameStatus::Lost);
        assert!(!timer_running(&game));
        let mines_shown = game
            .items()
            .iter()
            .filter(|cell| cell.mine && cell.revealed)
            .count();
        assert_eq!(mines_shown, 2);
        assert_eq!(game.tick(), Changed::empty());
    }

    #[test]
    fn win_stops_the_timer() {
        let mut game = controller((2, 1), &[(0, 0)]);

        let changed = game.play((1, 0)).unwrap();

        assert!(changed.contains(Changed::STATUS));
        assert_eq!(game.status(), GameStatus::Won);
        assert!(!timer_running(&game));
    }

    #[test]
    fn new_game_resets_the_whole_view() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);
        game.flag((1, 1)).unwrap();
        game.play((0, 0)).unwrap();
        game.tick();

        let changed = game.new_game(Difficulty::Easy);

        assert_eq!(changed, Changed::all());
        assert_eq!(game.status(), GameStatus::NotStarted);
        assert_eq!(game.difficulty(), Difficulty::Easy);
        assert_eq!(game.rows(), 9);
        assert_eq!(game.columns(), 9);
        assert_eq!(game.remaining_mines(), 10);
        assert_eq!(game.game_time(), 0);
        assert_eq!(game.items().len(), 81);
        assert!(!timer_running(&game));
    }

    #[test]
    fn new_game_discards_the_old_board() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);
        game.play((0, 0)).unwrap();
        let before = game.board().cloned().unwrap();

        game.new_game(Difficulty::Custom(GameConfig::new_unchecked(3, 3, 2)));

        // same difficulty, but a brand new unplaced board
        let after = game.board().unwrap();
        assert_eq!(after.difficulty(), before.difficulty());
        assert_ne!(*after, before);
        assert_eq!(after.status(), GameStatus::NotStarted);
        assert_eq!(after.revealed_count(), 0);
        assert_eq!(before.revealed_count(), 4);
    }

    #[test]
    fn controller_runs_a_fresh_deferred_board() {
        let mut game = GameController::new(Difficulty::Easy, ManualTimer::new());
        assert_eq!(game.rows(), 9);
        assert_eq!(game.remaining_mines(), 10);

        let changed = game.play((4, 4)).unwrap();

        assert!(changed.contains(Changed::ITEMS));
        assert!(changed.contains(Changed::STATUS));
        assert_ne!(game.status(), GameStatus::Lost);
    }

    #[test]
    fn items_are_row_major() {
        let game = controller((2, 3), &[(1, 2)]);

        let items = game.items();

        assert_eq!(items.len(), 6);
        assert_eq!((items[0].row, items[0].column), (0, 0));
        assert_eq!((items[1].row, items[1].column), (0, 1));
        assert_eq!((items[4].row, items[4].column), (1, 1));
    }

    #[test]
    fn dispose_turns_every_call_into_a_noop() {
        let mut game = controller((3, 3), &[(0, 2), (2, 0)]);
        game.play((0, 0)).unwrap();

        game.dispose();

        assert!(game.is_disposed());
        assert!(game.board().is_none());
        assert!(game.timer().is_none());
        assert!(game.items().is_empty());
        assert_eq!(game.play((0, 1)).unwrap(), Changed::empty());
        assert_eq!(game.flag((0, 1)).unwrap(), Changed::empty());
        assert_eq!(game.new_game(Difficulty::Easy), Changed::empty());
        assert_eq!(game.tick(), Changed::empty());

        // scalar mirror keeps serving the last known values
        assert_eq!(game.rows(), 3);
        assert_eq!(game.status(), GameStatus::InProgress);

        game.dispose();
        assert!(game.is_disposed());
    }
}
