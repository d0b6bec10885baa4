//! Knight move generation

use crate::board::{is_black_piece, is_white_piece};
use crate::types::{Board, Side};

/// Collect pseudo-legal knight destinations from `sq`. Edge guards on
/// rank and file keep the fixed offsets from wrapping.
pub fn knight_destinations(board: &Board, sq: u8, side: Side, out: &mut Vec<u8>) {
    let r = sq / 8;
    let c = sq % 8;
    let x = sq as i32;

    let own = |p: i8| match side {
        Side::White => is_white_piece(p),
        Side::Black => is_black_piece(p),
    };

    let mut push = |dest: i32| {
        if !own(board[dest as usize]) {
            out.push(dest as u8);
        }
    };

    if r > 0 {
        if c > 1 {
            push(x - 10);
        }
        if c < 6 {
            push(x - 6);
        }
    }
    if r < 7 {
        if c > 1 {
            push(x + 6);
        }
        if c < 6 {
            push(x + 10);
        }
    }
    if r > 1 {
        if c > 0 {
            push(x - 17);
        }
        if c < 7 {
            push(x - 15);
        }
    }
    if r < 6 {
        if c > 0 {
            push(x + 15);
        }
        if c < 7 {
            push(x + 17);
        }
    }
}
