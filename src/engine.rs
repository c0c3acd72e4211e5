use crate::board::{Board, Player};
use log::{debug, info};
use std::time::{Duration, Instant};

pub const WIN_SCORE: i8 = 1;
pub const LOSS_SCORE: i8 = -1;
pub const DRAW_SCORE: i8 = 0;

/// Exhaustive minimax search for one side of the board.
///
/// The engine maximizes for `player`; its opponent is assumed to play
/// perfectly and minimizes. The search walks a single board in place,
/// placing and retracting a move at every step.
pub struct Engine {
    player: Player,
    nodes: u64,
    elapsed: Duration,
}

impl Engine {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            nodes: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// Nodes visited by the searches since the last [`Engine::best_move`] started.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Wall-clock time of the last [`Engine::best_move`].
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Score a terminal position, or `None` if the game goes on.
    pub fn eval(&self, board: &Board) -> Option<i8> {
        if board.winner(self.player) {
            Some(WIN_SCORE)
        } else if board.winner(self.player.opponent()) {
            Some(LOSS_SCORE)
        } else if board.is_full() {
            Some(DRAW_SCORE)
        } else {
            None
        }
    }

    fn mover(&self, is_maximizing: bool) -> Player {
        if is_maximizing { self.player } else { self.player.opponent() }
    }

    pub fn minimax(&mut self, board: &mut Board, is_maximizing: bool) -> i8 {
        self.nodes += 1;
        if let Some(score) = self.eval(board) {
            return score;
        }

        let mover = self.mover(is_maximizing);
        let mut best_score = if is_maximizing { i8::MIN } else { i8::MAX };
        for idx in board.available_moves() {
            let placed = board.make_move(idx, mover);
            debug_assert!(placed);
            let score = self.minimax(board, !is_maximizing);
            board.retract_move(idx);

            best_score = if is_maximizing {
                best_score.max(score)
            } else {
                best_score.min(score)
            };
        }
        best_score
    }

    /// Minimax that stops exploring siblings once `beta <= alpha`.
    ///
    /// `alpha` is the score the maximizing side is already guaranteed,
    /// `beta` the score the minimizing side is already guaranteed.
    pub fn minimax_alpha_beta(
        &mut self,
        board: &mut Board,
        is_maximizing: bool,
        mut alpha: i8,
        mut beta: i8,
    ) -> i8 {
        self.nodes += 1;
        if let Some(score) = self.eval(board) {
            return score;
        }

        let mover = self.mover(is_maximizing);
        let mut best_score = if is_maximizing { i8::MIN } else { i8::MAX };
        for idx in board.available_moves() {
            let placed = board.make_move(idx, mover);
            debug_assert!(placed);
            let score = self.minimax_alpha_beta(board, !is_maximizing, alpha, beta);
            board.retract_move(idx);

            if is_maximizing {
                best_score = best_score.max(score);
                alpha = alpha.max(score);
            } else {
                best_score = best_score.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        best_score
    }

    /// Pick the move with the strictly greatest score; ties keep the lowest index.
    ///
    /// Returns `None` if the board has no empty cell.
    pub fn best_move(&mut self, board: &mut Board, use_pruning: bool) -> Option<usize> {
        let start = Instant::now();
        self.nodes = 0;

        let mut best: Option<(usize, i8)> = None;
        for idx in board.available_moves() {
            let placed = board.make_move(idx, self.player);
            debug_assert!(placed);
            let score = if use_pruning {
                self.minimax_alpha_beta(board, false, i8::MIN, i8::MAX)
            } else {
                self.minimax(board, false)
            };
            board.retract_move(idx);

            debug!("Move {} scores {}", idx, score);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }
        self.elapsed = start.elapsed();

        if let Some((idx, score)) = best {
            info!(
                "Best move for {}: {} (score: {}, nodes: {}, pruning: {}, elapsed: {:?})",
                self.player,
                idx,
                score,
                self.nodes,
                use_pruning,
                self.elapsed
            );
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn collect_reachable(board: &mut Board, to_move: Player, seen: &mut HashSet<(Board, Player)>) {
        if !seen.insert((*board, to_move)) {
            return;
        }
        if board.winner(Player::X) || board.winner(Player::O) || board.is_full() {
            return;
        }
        for idx in board.available_moves() {
            assert!(board.make_move(idx, to_move));
            collect_reachable(board, to_move.opponent(), seen);
            board.retract_move(idx);
        }
    }

    /// Every non-terminal position reachable by alternating play, with either side opening.
    fn reachable_positions() -> Vec<(Board, Player)> {
        let mut seen = HashSet::new();
        for first in [Player::X, Player::O] {
            collect_reachable(&mut Board::new(), first, &mut seen);
        }
        let engine = Engine::new(Player::O);
        seen.into_iter()
            .filter(|(board, _)| engine.eval(board).is_none())
            .collect()
    }

    #[test]
    fn completes_winning_row() {
        let mut board: Board = "OO. XX. ...".parse().unwrap();
        let mut engine = Engine::new(Player::O);
        assert_eq!(engine.best_move(&mut board, false), Some(2));
        assert_eq!(engine.best_move(&mut board, true), Some(2));
        assert_eq!(board, "OO. XX. ...".parse::<Board>().unwrap());
    }

    #[test]
    fn blocks_losing_row() {
        let mut board: Board = "XX. O.. ...".parse().unwrap();
        let mut engine = Engine::new(Player::O);
        assert_eq!(engine.best_move(&mut board, false), Some(2));
        assert_eq!(engine.best_move(&mut board, true), Some(2));
    }

    #[test]
    fn opening_move() {
        let mut board = Board::new();
        let mut engine = Engine::new(Player::O);

        let best = engine.best_move(&mut board, false);
        assert_eq!(best, Some(0));
        assert_eq!(engine.best_move(&mut board, true), Some(0));
        assert_eq!(board, Board::new());

        let mut scores = Vec::new();
        for idx in board.available_moves() {
            assert!(board.make_move(idx, Player::O));
            scores.push(engine.minimax(&mut board, false));
            board.retract_move(idx);
        }
        // perfect play from the empty board is a draw
        assert_eq!(scores[4], DRAW_SCORE);
        assert!(scores.iter().all(|&score| scores[4] >= score));
    }

    #[test]
    fn full_board_has_no_move() {
        let mut board: Board = "XOX XOO OXX".parse().unwrap();
        let mut engine = Engine::new(Player::O);
        assert_eq!(engine.best_move(&mut board, false), None);
        assert_eq!(engine.best_move(&mut board, true), None);
        for is_maximizing in [true, false] {
            assert_eq!(engine.minimax(&mut board, is_maximizing), DRAW_SCORE);
            assert_eq!(
                engine.minimax_alpha_beta(&mut board, is_maximizing, i8::MIN, i8::MAX),
                DRAW_SCORE
            );
        }
    }

    #[test]
    fn last_cell_is_a_draw() {
        let mut board: Board = "XOX XOO OX.".parse().unwrap();
        let before = board;
        let mut engine = Engine::new(Player::O);
        for is_maximizing in [true, false] {
            assert_eq!(engine.minimax(&mut board, is_maximizing), DRAW_SCORE);
            assert_eq!(
                engine.minimax_alpha_beta(&mut board, is_maximizing, i8::MIN, i8::MAX),
                DRAW_SCORE
            );
        }
        assert_eq!(board, before);
        assert_eq!(engine.best_move(&mut board, true), Some(8));
    }

    #[test]
    fn eval_order() {
        let engine = Engine::new(Player::O);
        assert_eq!(engine.eval(&"OOO XX. ...".parse().unwrap()), Some(WIN_SCORE));
        assert_eq!(engine.eval(&"XXX OO. ...".parse().unwrap()), Some(LOSS_SCORE));
        assert_eq!(engine.eval(&"XOX XOO OXX".parse().unwrap()), Some(DRAW_SCORE));
        assert_eq!(engine.eval(&"XOX XOO OX.".parse().unwrap()), None);
        // not reachable, but the engine's own line wins
        assert_eq!(engine.eval(&"OOO XXX ...".parse().unwrap()), Some(WIN_SCORE));
        assert_eq!(Engine::new(Player::X).eval(&"OOO XXX ...".parse().unwrap()), Some(WIN_SCORE));
    }

    #[test]
    fn alpha_beta_matches_minimax() {
        let mut engine = Engine::new(Player::O);
        for (board, to_move) in reachable_positions() {
            let mut board = board;
            let is_maximizing = to_move == engine.player();
            let plain = engine.minimax(&mut board, is_maximizing);
            let pruned = engine.minimax_alpha_beta(&mut board, is_maximizing, i8::MIN, i8::MAX);
            assert_eq!(plain, pruned, "{:?} to move on\n{}", to_move, board);
        }
    }

    #[test]
    fn best_move_is_available_and_variant_independent() {
        let mut engine = Engine::new(Player::O);
        for (board, to_move) in reachable_positions() {
            if to_move != engine.player() {
                continue;
            }
            let mut board = board;
            let before = board;
            let available = board.available_moves();
            let plain = engine.best_move(&mut board, false);
            let pruned = engine.best_move(&mut board, true);
            assert_eq!(plain, pruned, "on\n{}", board);
            let idx = plain.expect("non-terminal board has a move");
            assert!(available.contains(&idx));
            assert_eq!(board, before);
        }
    }

    #[test]
    fn pruning_visits_fewer_nodes() {
        let mut board = Board::new();
        let mut engine = Engine::new(Player::O);
        engine.best_move(&mut board, false);
        let plain_nodes = engine.nodes();
        engine.best_move(&mut board, true);
        let pruned_nodes = engine.nodes();
        // every node of the full game tree except the root
        assert_eq!(plain_nodes, 549_945);
        assert!(pruned_nodes < plain_nodes);
        assert!(engine.elapsed() > Duration::ZERO);
    }

    fn assert_never_loses(board: &mut Board, engine: &mut Engine, engine_to_move: bool) {
        let human = engine.player().opponent();
        assert!(!board.winner(human), "engine lost on\n{}", board);
        if board.winner(engine.player()) || board.is_full() {
            return;
        }

        if engine_to_move {
            let idx = engine.best_move(board, true).expect("board is not full");
            assert!(board.make_move(idx, engine.player()));
            assert_never_loses(board, engine, false);
            board.retract_move(idx);
        } else {
            for idx in board.available_moves() {
                assert!(board.make_move(idx, human));
                assert_never_loses(board, engine, true);
                board.retract_move(idx);
            }
        }
    }

    #[test]
    fn never_loses() {
        for engine_first in [false, true] {
            let mut engine = Engine::new(Player::O);
            assert_never_loses(&mut Board::new(), &mut engine, engine_first);
        }
    }
}
