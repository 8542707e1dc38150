//! In-memory registry of running games.
//!
//! Each game sits behind its own lock. A mutating call holds the write lock
//! for exactly one operation; queries share the read lock.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::BoardView;
use crate::error::{CheckersError, CheckersResult};
use crate::game::Game;
use crate::rules::Rules;
use crate::types::{Color, GameState, Move, Outcome, Perspective, PlayerId};

/// Shared handle to one game.
pub type GameHandle = Arc<RwLock<Game>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct GameCenter {
    rules: Rules,
    games: RwLock<HashMap<GameId, GameHandle>>,
    resigned: Mutex<HashSet<GameId>>,
    next_id: AtomicU64,
}

impl Default for GameCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl GameCenter {
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    pub fn with_rules(rules: Rules) -> Self {
        Self {
            rules,
            games: RwLock::new(HashMap::new()),
            resigned: Mutex::new(HashSet::new()),
            // 0 is never handed out
            next_id: AtomicU64::new(1),
        }
    }

    /// Starts a fresh game; `red` moves first.
    pub fn create_game(&self, red: PlayerId, white: PlayerId) -> GameId {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let game = Game::with_rules(red, white, self.rules);
        self.games.write().insert(id, Arc::new(RwLock::new(game)));
        info!(game = %id, red = red.0, white = white.0, "game created");
        id
    }

    pub fn game(&self, id: GameId) -> CheckersResult<GameHandle> {
        self.games
            .read()
            .get(&id)
            .cloned()
            .ok_or(CheckersError::NoSuchGame { id: id.0 })
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.games.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.read().is_empty()
    }

    /// Stops tracking a game. Returns whether it was tracked.
    pub fn remove_game(&self, id: GameId) -> bool {
        let removed = self.games.write().remove(&id).is_some();
        if removed {
            info!(game = %id, "game removed");
        }
        removed
    }

    pub fn board_view(&self, id: GameId, perspective: Perspective) -> CheckersResult<BoardView> {
        self.read(id, |game| game.board_view(perspective))
    }

    pub fn game_state(&self, id: GameId) -> CheckersResult<GameState> {
        self.read(id, Game::to_game_state)
    }

    pub fn active_color(&self, id: GameId) -> CheckersResult<Color> {
        self.read(id, Game::active_color)
    }

    pub fn propose_move(&self, id: GameId, mv: Move) -> CheckersResult<()> {
        self.write(id, |game| game.propose_move(mv))?
    }

    pub fn undo_last(&self, id: GameId) -> CheckersResult<Move> {
        self.write(id, Game::undo_last)?
    }

    /// `Ok(false)` when no moves were queued.
    pub fn commit_turn(&self, id: GameId) -> CheckersResult<bool> {
        self.write(id, Game::commit)
    }

    /// Winners are recorded by commit and resign, so a read lock is enough.
    pub fn is_over(&self, id: GameId) -> CheckersResult<Outcome> {
        self.read(id, Game::outcome)
    }

    pub fn reload(&self, id: GameId) -> CheckersResult<()> {
        self.write(id, Game::reload)
    }

    /// Ends the game for `player`, stops tracking it and remembers that it
    /// ended by resignation so the partner can find out via `checkout`.
    pub fn resign(&self, id: GameId, player: PlayerId) -> CheckersResult<Color> {
        let winner = self.write(id, |game| game.resign(player))??;
        self.games.write().remove(&id);
        self.resigned.lock().insert(id);
        info!(game = %id, winner = %winner, "game ended by resignation");
        Ok(winner)
    }

    /// True exactly once for a game that ended by resignation.
    pub fn checkout(&self, id: GameId) -> bool {
        self.resigned.lock().remove(&id)
    }

    fn read<T>(&self, id: GameId, f: impl FnOnce(&Game) -> T) -> CheckersResult<T> {
        let handle = self.game(id)?;
        let game = handle.read();
        Ok(f(&*game))
    }

    fn write<T>(&self, id: GameId, f: impl FnOnce(&mut Game) -> T) -> CheckersResult<T> {
        let handle = self.game(id)?;
        let mut game = handle.write();
        Ok(f(&mut *game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    const RED: PlayerId = PlayerId(10);
    const WHITE: PlayerId = PlayerId(20);

    fn mv(from: (u8, u8), to: (u8, u8)) -> Move {
        Move::new(Position::new(from.0, from.1), Position::new(to.0, to.1))
    }

    #[test]
    fn ids_are_distinct_and_nonzero() {
        let center = GameCenter::new();
        let a = center.create_game(RED, WHITE);
        let b = center.create_game(WHITE, RED);

        assert_ne!(a, b);
        assert_ne!(a, GameId(0));
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn turn_round_trip_through_registry() {
        let center = GameCenter::new();
        let id = center.create_game(RED, WHITE);

        center.propose_move(id, mv((5, 2), (4, 3))).unwrap();
        assert_eq!(center.commit_turn(id), Ok(true));
        assert_eq!(center.commit_turn(id), Ok(false));
        assert_eq!(center.active_color(id), Ok(Color::White));
        assert_eq!(
            center.is_over(id),
            Ok(Outcome {
                over: false,
                winner: None
            })
        );

        let view = center.board_view(id, Perspective::WhiteBottom).unwrap();
        assert_eq!(view.rows[0].index, 7);
        assert_eq!(center.game_state(id).unwrap().pending.len(), 0);
    }

    #[test]
    fn unknown_game_is_reported_not_faulted() {
        let center = GameCenter::new();
        let ghost = GameId(42);
        let expected = CheckersError::NoSuchGame { id: 42 };

        assert_eq!(center.propose_move(ghost, mv((5, 2), (4, 3))), Err(expected));
        assert_eq!(center.undo_last(ghost), Err(expected));
        assert_eq!(center.commit_turn(ghost), Err(expected));
        assert_eq!(center.active_color(ghost), Err(expected));
        assert_eq!(center.is_over(ghost), Err(expected));
        assert!(center.board_view(ghost, Perspective::RedBottom).is_err());
    }

    #[test]
    fn rule_errors_pass_through() {
        let center = GameCenter::new();
        let id = center.create_game(RED, WHITE);

        assert_eq!(center.undo_last(id), Err(CheckersError::NothingToUndo));
        assert_eq!(
            center.propose_move(id, mv((2, 1), (3, 2))),
            Err(CheckersError::NotYourPiece)
        );
    }

    #[test]
    fn resignation_removes_game_and_is_checked_out_once() {
        let center = GameCenter::new();
        let id = center.create_game(RED, WHITE);

        assert_eq!(center.resign(id, WHITE), Ok(Color::Red));
        assert!(!center.contains(id));
        assert_eq!(
            center.commit_turn(id),
            Err(CheckersError::NoSuchGame { id: id.0 })
        );
        assert!(center.checkout(id));
        assert!(!center.checkout(id));
    }

    #[test]
    fn stranger_cannot_resign() {
        let center = GameCenter::new();
        let id = center.create_game(RED, WHITE);

        assert_eq!(center.resign(id, PlayerId(3)), Err(CheckersError::NotAParticipant));
        assert!(center.contains(id));
    }

    #[test]
    fn duplicate_requests_are_serialized() {
        let center = GameCenter::new();
        let id = center.create_game(RED, WHITE);

        let results: Vec<CheckersResult<()>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| center.propose_move(id, mv((5, 2), (4, 3)))))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.err())
                .all(|e| e == CheckersError::TooManyMoves)
        );
        assert_eq!(center.game_state(id).unwrap().pending.len(), 1);
    }

    #[test]
    fn is_over_runs_alongside_readers() {
        let center = GameCenter::new();
        let id = center.create_game(RED, WHITE);
        let handle = center.game(id).unwrap();
        let _reader = handle.read();

        assert_eq!(
            center.is_over(id),
            Ok(Outcome {
                over: false,
                winner: None
            })
        );
        assert_eq!(center.active_color(id), Ok(Color::Red));
    }

    #[test]
    fn registry_rules_reach_games() {
        let center = GameCenter::with_rules(Rules::casual());
        let id = center.create_game(RED, WHITE);

        assert_eq!(center.game(id).unwrap().read().rules(), Rules::casual());
    }
}
