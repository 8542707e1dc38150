use tracing::{debug, info, warn};

use crate::board::{Board, BoardView};
use crate::error::{CheckersError, CheckersResult};
use crate::pending::PendingMoves;
use crate::rules::Rules;
use crate::types::{Color, GameResult, GameState, Move, Outcome, Perspective, PlayerId, ViewMode};
use crate::validator::MoveValidator;

/// One checkers game between two seated players.
///
/// Moves are proposed one at a time into a pending queue and only touch the
/// board on `commit`. Callers must serialize mutating calls on one game.
#[derive(Debug, Clone)]
pub struct Game {
    red_player: PlayerId,
    white_player: PlayerId,
    board: Board,
    pending: PendingMoves,
    validator: MoveValidator,
    active: Color,
    turn_changed: bool,
    winner: Option<Color>,
}

impl Game {
    /// `red` moves first.
    pub fn new(red: PlayerId, white: PlayerId) -> Self {
        Self::with_rules(red, white, Rules::default())
    }

    pub fn with_rules(red: PlayerId, white: PlayerId, rules: Rules) -> Self {
        Self {
            red_player: red,
            white_player: white,
            board: Board::new(),
            pending: PendingMoves::new(),
            validator: MoveValidator::new(rules),
            active: Color::Red,
            turn_changed: false,
            winner: None,
        }
    }

    pub fn red_player(&self) -> PlayerId {
        self.red_player
    }

    pub fn white_player(&self) -> PlayerId {
        self.white_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pending(&self) -> &PendingMoves {
        &self.pending
    }

    pub fn rules(&self) -> Rules {
        self.validator.rules()
    }

    pub fn active_color(&self) -> Color {
        self.active
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if player == self.red_player {
            Some(Color::Red)
        } else if player == self.white_player {
            Some(Color::White)
        } else {
            None
        }
    }

    /// The other seated player, or `None` for a spectator.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.color_of(player).map(|color| match color {
            Color::Red => self.white_player,
            Color::White => self.red_player,
        })
    }

    pub fn is_active_player(&self, player: PlayerId) -> bool {
        self.color_of(player) == Some(self.active)
    }

    pub fn view_mode(&self, player: PlayerId) -> ViewMode {
        if self.color_of(player).is_some() {
            ViewMode::Play
        } else {
            ViewMode::Spectator
        }
    }

    /// White sees its own home rows at the bottom; everyone else sees red's.
    pub fn perspective_for(&self, player: PlayerId) -> Perspective {
        match self.color_of(player) {
            Some(Color::White) => Perspective::WhiteBottom,
            _ => Perspective::RedBottom,
        }
    }

    pub fn board_view(&self, perspective: Perspective) -> BoardView {
        self.board.view(perspective)
    }

    /// Validates `mv` for the side to move and queues it when legal.
    /// A refused move leaves the game untouched.
    pub fn propose_move(&mut self, mv: Move) -> CheckersResult<()> {
        if self.winner.is_some() {
            return Err(CheckersError::GameOver);
        }

        match self
            .validator
            .validate(&self.board, self.active, &self.pending, mv)
        {
            Ok(()) => {
                self.pending.append(mv);
                debug!(mv = %mv, color = %self.active, queued = self.pending.len(), "move queued");
                Ok(())
            }
            Err(err) => {
                debug!(mv = %mv, color = %self.active, reason = err.code(), "move refused");
                Err(err)
            }
        }
    }

    /// Drops the most recently queued move. The board is not touched since
    /// queued moves are only applied on commit.
    pub fn undo_last(&mut self) -> CheckersResult<Move> {
        let mv = self.pending.pop_last().ok_or(CheckersError::NothingToUndo)?;
        debug!(mv = %mv, color = %self.active, queued = self.pending.len(), "move undone");
        Ok(mv)
    }

    /// Applies the queued moves and passes the turn.
    /// Returns `false` without changing anything when nothing is queued.
    pub fn commit(&mut self) -> bool {
        if self.winner.is_some() || self.pending.is_empty() {
            return false;
        }

        let moves = self.pending.take();
        for mv in &moves {
            self.apply_move(mv);
        }

        info!(color = %self.active, moves = moves.len(), "turn committed");
        self.active = self.active.opponent();
        self.turn_changed = true;

        if let Some(winner) = self.detect_winner() {
            self.winner = Some(winner);
            info!(winner = %winner, "game over");
        }
        true
    }

    /// Scans the board and records the winner once one side has no pieces.
    pub fn is_over(&mut self) -> bool {
        if self.winner.is_none() {
            self.winner = self.detect_winner();
        }
        self.winner.is_some()
    }

    /// Same answer as `is_over` without recording anything.
    pub fn outcome(&self) -> Outcome {
        let winner = self.winner.or_else(|| self.detect_winner());
        Outcome {
            over: winner.is_some(),
            winner,
        }
    }

    /// Ends the game in the opponent's favour. Returns the winning color.
    pub fn resign(&mut self, player: PlayerId) -> CheckersResult<Color> {
        let color = self
            .color_of(player)
            .ok_or(CheckersError::NotAParticipant)?;
        if self.winner.is_some() {
            return Err(CheckersError::GameOver);
        }

        let winner = color.opponent();
        self.pending.clear();
        self.winner = Some(winner);
        info!(resigned = %color, winner = %winner, "player resigned");
        Ok(winner)
    }

    /// Forgets the uncommitted turn. Committed state is unchanged.
    pub fn reload(&mut self) {
        if !self.pending.is_empty() {
            debug!(color = %self.active, dropped = self.pending.len(), "pending turn discarded");
        }
        self.pending.clear();
    }

    /// True when a turn was committed since the flag was last taken.
    pub fn turn_changed(&self) -> bool {
        self.turn_changed
    }

    pub fn take_turn_changed(&mut self) -> bool {
        std::mem::take(&mut self.turn_changed)
    }

    pub fn to_game_state(&self) -> GameState {
        let (red_count, white_count) = self.board.count();
        let outcome = self.outcome();
        GameState {
            board: self.board.to_array().to_vec(),
            active_color: self.active,
            red_count,
            white_count,
            is_game_over: outcome.over,
            winner: outcome.winner,
            pending: self.pending.moves().to_vec(),
            fingerprint: self.board.fingerprint(),
        }
    }

    pub fn to_game_result(&self) -> GameResult {
        let (red_count, white_count) = self.board.count();
        GameResult {
            winner: self.outcome().winner,
            red_count,
            white_count,
        }
    }

    fn apply_move(&mut self, mv: &Move) {
        if mv.is_jump()
            && let Some(jumped) = mv.midpoint()
        {
            self.board.remove(jumped);
        }

        let Some(piece) = self.board.remove(mv.start) else {
            warn!(mv = %mv, "queued move starts on an empty square");
            return;
        };
        if !self.board.place(mv.end, piece) {
            warn!(mv = %mv, "queued move lands on an occupied square");
            self.board.place(mv.start, piece);
            return;
        }
        if mv.end.row == piece.color.crowning_row() && self.board.promote(mv.end) {
            debug!(at = %mv.end, color = %piece.color, "piece crowned");
        }
    }

    fn detect_winner(&self) -> Option<Color> {
        match self.board.count() {
            (0, _) => Some(Color::White),
            (_, 0) => Some(Color::Red),
            _ => None,
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, active: Color) {
        self.board = board;
        self.active = active;
        self.pending.clear();
        self.turn_changed = false;
        self.winner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::ChainKind;
    use crate::types::{Piece, Position};

    const RED: PlayerId = PlayerId(1);
    const WHITE: PlayerId = PlayerId(2);

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn mv(from: (u8, u8), to: (u8, u8)) -> Move {
        Move::new(pos(from.0, from.1), pos(to.0, to.1))
    }

    fn game_with(pieces: &[((u8, u8), Piece)], active: Color) -> Game {
        let mut board = Board::empty();
        for &((row, col), piece) in pieces {
            assert!(board.place(pos(row, col), piece));
        }
        let mut game = Game::new(RED, WHITE);
        game.set_board_for_test(board, active);
        game
    }

    #[test]
    fn initial_state_is_correct() {
        let game = Game::new(RED, WHITE);
        let state = game.to_game_state();

        assert_eq!(state.active_color, Color::Red);
        assert_eq!(state.red_count, 12);
        assert_eq!(state.white_count, 12);
        assert!(!state.is_game_over);
        assert!(state.pending.is_empty());
        assert!(!game.turn_changed());
    }

    #[test]
    fn commit_without_moves_keeps_turn() {
        let mut game = Game::new(RED, WHITE);

        assert!(!game.commit());
        assert_eq!(game.active_color(), Color::Red);
        assert!(!game.turn_changed());
    }

    #[test]
    fn propose_then_undo_leaves_game_as_it_was() {
        let mut game = Game::new(RED, WHITE);
        let before = *game.board();

        game.propose_move(mv((5, 2), (4, 3))).unwrap();
        assert_eq!(game.undo_last(), Ok(mv((5, 2), (4, 3))));

        assert!(game.pending().is_empty());
        assert_eq!(game.pending().chain(), ChainKind::None);
        assert_eq!(*game.board(), before);
        assert_eq!(game.active_color(), Color::Red);
        assert_eq!(game.undo_last(), Err(CheckersError::NothingToUndo));
    }

    #[test]
    fn refused_move_changes_nothing() {
        let mut game = Game::new(RED, WHITE);

        assert_eq!(
            game.propose_move(mv((5, 2), (3, 2))),
            Err(CheckersError::InvalidGeometry)
        );
        assert!(game.pending().is_empty());
    }

    #[test]
    fn commit_moves_piece_and_passes_turn() {
        let mut game = Game::new(RED, WHITE);

        game.propose_move(mv((5, 2), (4, 3))).unwrap();
        assert!(game.commit());

        assert_eq!(game.board().piece_at(pos(4, 3)), Some(Piece::single(Color::Red)));
        assert_eq!(game.board().piece_at(pos(5, 2)), None);
        assert_eq!(game.active_color(), Color::White);
        assert!(game.take_turn_changed());
        assert!(!game.take_turn_changed());
        assert!(game.pending().is_empty());
    }

    #[test]
    fn jump_removes_captured_piece_on_commit_only() {
        let mut game = game_with(
            &[
                ((5, 2), Piece::single(Color::Red)),
                ((4, 3), Piece::single(Color::White)),
                ((0, 7), Piece::single(Color::White)),
            ],
            Color::Red,
        );

        game.propose_move(mv((5, 2), (3, 4))).unwrap();
        assert!(game.board().piece_at(pos(4, 3)).is_some());

        assert!(game.commit());
        assert_eq!(game.board().piece_at(pos(4, 3)), None);
        assert_eq!(game.board().piece_at(pos(3, 4)), Some(Piece::single(Color::Red)));
        assert_eq!(game.board().count(), (1, 1));
    }

    #[test]
    fn double_jump_is_applied_in_order() {
        let mut game = game_with(
            &[
                ((5, 2), Piece::single(Color::Red)),
                ((4, 3), Piece::single(Color::White)),
                ((2, 5), Piece::single(Color::White)),
                ((0, 1), Piece::single(Color::White)),
            ],
            Color::Red,
        );

        game.propose_move(mv((5, 2), (3, 4))).unwrap();
        assert_eq!(
            game.propose_move(mv((3, 4), (2, 3))),
            Err(CheckersError::ForcedJumpAvailable)
        );
        game.propose_move(mv((3, 4), (1, 6))).unwrap();
        assert!(game.commit());

        assert_eq!(game.board().count(), (1, 1));
        assert_eq!(game.board().piece_at(pos(1, 6)), Some(Piece::single(Color::Red)));
    }

    #[test]
    fn promotion_happens_on_commit_not_on_propose() {
        let mut game = game_with(
            &[
                ((1, 2), Piece::single(Color::Red)),
                ((6, 1), Piece::single(Color::White)),
            ],
            Color::Red,
        );

        game.propose_move(mv((1, 2), (0, 1))).unwrap();
        assert_eq!(game.board().piece_at(pos(1, 2)), Some(Piece::single(Color::Red)));

        game.commit();
        assert_eq!(game.board().piece_at(pos(0, 1)), Some(Piece::king(Color::Red)));

        game.propose_move(mv((6, 1), (7, 0))).unwrap();
        game.commit();
        assert_eq!(game.board().piece_at(pos(7, 0)), Some(Piece::king(Color::White)));
    }

    #[test]
    fn capturing_last_piece_ends_game() {
        let mut game = game_with(
            &[
                ((5, 2), Piece::single(Color::Red)),
                ((4, 3), Piece::single(Color::White)),
            ],
            Color::Red,
        );

        game.propose_move(mv((5, 2), (3, 4))).unwrap();
        assert!(game.commit());

        assert!(game.is_over());
        assert!(game.is_over());
        assert_eq!(game.winner(), Some(Color::Red));
        assert_eq!(game.to_game_result().winner, Some(Color::Red));
        assert_eq!(
            game.propose_move(mv((3, 4), (2, 3))),
            Err(CheckersError::GameOver)
        );
        assert!(!game.commit());
    }

    #[test]
    fn is_over_records_winner_found_by_scan() {
        let mut game = game_with(&[((2, 1), Piece::single(Color::White))], Color::Red);

        assert_eq!(game.outcome().winner, Some(Color::White));
        assert_eq!(game.winner(), None);
        assert!(game.is_over());
        assert_eq!(game.winner(), Some(Color::White));
    }

    #[test]
    fn commit_keeps_piece_when_landing_is_taken() {
        let mut game = game_with(
            &[
                ((5, 2), Piece::single(Color::Red)),
                ((4, 3), Piece::single(Color::Red)),
                ((1, 0), Piece::single(Color::White)),
            ],
            Color::Red,
        );
        game.pending.append(mv((5, 2), (4, 3)));

        assert!(game.commit());

        assert_eq!(game.board().count(), (2, 1));
        assert_eq!(game.board().piece_at(pos(5, 2)), Some(Piece::single(Color::Red)));
        assert_eq!(game.board().piece_at(pos(4, 3)), Some(Piece::single(Color::Red)));
    }

    #[test]
    fn resign_hands_win_to_opponent() {
        let mut game = Game::new(RED, WHITE);
        game.propose_move(mv((5, 2), (4, 3))).unwrap();

        assert_eq!(game.resign(PlayerId(99)), Err(CheckersError::NotAParticipant));
        assert_eq!(game.resign(RED), Ok(Color::White));
        assert!(game.is_over());
        assert!(game.pending().is_empty());
        assert_eq!(game.resign(WHITE), Err(CheckersError::GameOver));
        assert_eq!(game.winner(), Some(Color::White));
    }

    #[test]
    fn reload_discards_uncommitted_turn() {
        let mut game = game_with(
            &[
                ((5, 2), Piece::king(Color::Red)),
                ((4, 3), Piece::single(Color::White)),
            ],
            Color::Red,
        );
        game.propose_move(mv((5, 2), (3, 4))).unwrap();
        let before = *game.board();

        game.reload();

        assert!(game.pending().is_empty());
        assert_eq!(*game.board(), before);
        assert_eq!(game.active_color(), Color::Red);
        game.propose_move(mv((5, 2), (3, 4))).unwrap();
    }

    #[test]
    fn seats_and_perspectives() {
        let game = Game::new(RED, WHITE);
        let spectator = PlayerId(7);

        assert_eq!(game.color_of(WHITE), Some(Color::White));
        assert_eq!(game.opponent_of(RED), Some(WHITE));
        assert_eq!(game.opponent_of(spectator), None);
        assert!(game.is_active_player(RED));
        assert!(!game.is_active_player(WHITE));
        assert_eq!(game.view_mode(spectator), ViewMode::Spectator);
        assert_eq!(game.view_mode(WHITE), ViewMode::Play);
        assert_eq!(game.perspective_for(WHITE), Perspective::WhiteBottom);
        assert_eq!(game.perspective_for(spectator), Perspective::RedBottom);
    }
}
