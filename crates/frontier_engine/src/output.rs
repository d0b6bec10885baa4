//! Root choices - sorting and move text
//!
//! After a session stops, the root's children become the engine's
//! answer: one choice per root move, ordered best-first under the
//! side-to-move polarity (descending evals for White, ascending for
//! Black). The move text is a long coordinate style: castling as
//! `0-0`/`0-0-0`, otherwise an optional piece letter, the source
//! square, the destination square and a promotion letter when
//! promoting.

use crate::constants::*;
use crate::search::Shared;
use crate::stats::StatsSnapshot;
use crate::types::{decode_destination, Board, Position, Side};

/// One sorted root move.
#[derive(Debug, Clone)]
pub struct RootChoice {
    pub from: i8,
    /// Destination, promotion-encoded like every move descriptor.
    pub to: i8,
    pub eval: f64,
    pub text: String,
}

impl RootChoice {
    /// Eval scaled by 1000 and truncated, as transmitted on the wire.
    pub fn eval_milli(&self) -> i64 {
        (self.eval * 1000.0) as i64
    }
}

/// Everything `get_output` reports.
#[derive(Debug, Clone)]
pub struct OutputReport {
    pub choices: Vec<RootChoice>,
    /// The root's eval; carries the terminal eval when the root has no
    /// choices at all.
    pub root_eval: f64,
    pub stats: StatsSnapshot,
}

pub(crate) fn report(shared: &Shared, session: Option<&Position>) -> OutputReport {
    let stats = shared.stats.snapshot();
    let Some(position) = session else {
        return OutputReport {
            choices: Vec::new(),
            root_eval: 0.0,
            stats,
        };
    };

    let root = shared.arena.node(0);
    let mut choices = Vec::with_capacity(root.num_children());
    if let Some((start, count)) = root.children() {
        for index in start..start + count {
            let child = shared.arena.node(index);
            choices.push(RootChoice {
                from: child.from,
                to: child.to,
                eval: child.eval(),
                text: move_text(&position.board, child.from, child.to),
            });
        }
    }

    match root.side {
        Side::White => choices.sort_unstable_by(|a, b| b.eval.total_cmp(&a.eval)),
        Side::Black => choices.sort_unstable_by(|a, b| a.eval.total_cmp(&b.eval)),
    }

    OutputReport {
        choices,
        root_eval: root.eval(),
        stats,
    }
}

fn square_text(sq: u8) -> [char; 2] {
    [
        (b'a' + sq % 8) as char,
        (b'1' + sq / 8) as char,
    ]
}

/// Human-readable text for a root move on the given board.
pub fn move_text(board: &Board, from: i8, to: i8) -> String {
    if !(0..64).contains(&from) {
        return "??".to_string();
    }
    let piece = board[from as usize];

    if piece == W_KING && from == 4 && to == 6 || piece == B_KING && from == 60 && to == 62 {
        return "0-0".to_string();
    }
    if piece == W_KING && from == 4 && to == 2 || piece == B_KING && from == 60 && to == 58 {
        return "0-0-0".to_string();
    }

    let mut out = String::with_capacity(6);
    match piece {
        W_KNIGHT | B_KNIGHT => out.push('N'),
        W_BISHOP | B_BISHOP => out.push('B'),
        W_ROOK | B_ROOK => out.push('R'),
        W_QUEEN | B_QUEEN => out.push('Q'),
        W_KING | B_KING => out.push('K'),
        W_PAWN | B_PAWN => {}
        _ => out.push('?'),
    }

    let [f, r] = square_text(from as u8);
    out.push(f);
    out.push(r);

    let (true_to, promotion) = decode_destination(to);
    let [f, r] = square_text(true_to);
    out.push(f);
    out.push(r);

    if let Some(p) = promotion {
        match p {
            W_KNIGHT | B_KNIGHT => out.push('N'),
            W_BISHOP | B_BISHOP => out.push('B'),
            W_ROOK | B_ROOK => out.push('R'),
            _ => out.push('Q'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_text_styles() {
        let board = STARTING_BOARD;
        assert_eq!(move_text(&board, 12, 28), "e2e4");
        assert_eq!(move_text(&board, 6, 21), "Ng1f3");
        assert_eq!(move_text(&board, 4, 6), "0-0");
        assert_eq!(move_text(&board, 4, 2), "0-0-0");

        let mut promo_board: Board = [EMPTY; 64];
        promo_board[48] = W_PAWN;
        assert_eq!(move_text(&promo_board, 48, 88), "a7a8Q");
        let mut promo_board: Board = [EMPTY; 64];
        promo_board[8] = B_PAWN;
        assert_eq!(move_text(&promo_board, 8, 96), "a2a1N");
    }

    #[test]
    fn test_eval_milli_truncates() {
        let choice = RootChoice {
            from: 0,
            to: 1,
            eval: 0.2499,
            text: String::new(),
        };
        assert_eq!(choice.eval_milli(), 249);
        let negative = RootChoice {
            eval: -0.2499,
            ..choice
        };
        assert_eq!(negative.eval_milli(), -249);
    }
}
