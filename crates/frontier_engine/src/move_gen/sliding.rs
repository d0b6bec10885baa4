//! Sliding piece move generation - bishops, rooks and queens
//!
//! Rays walk outward one step at a time within precomputed rank/file
//! spans, stopping at the first occupied square (inclusive when it holds
//! an enemy piece). Queens are the union of the bishop and rook rays.

use crate::board::{is_black_piece, is_white_piece};
use crate::constants::EMPTY;
use crate::types::{Board, Side};

const DIAGONAL_RAYS: [(i32, i32, i32); 4] = [(-1, -1, -9), (-1, 1, -7), (1, -1, 7), (1, 1, 9)];
const ORTHOGONAL_RAYS: [(i32, i32, i32); 4] = [(-1, 0, -8), (1, 0, 8), (0, -1, -1), (0, 1, 1)];

pub fn bishop_destinations(board: &Board, sq: u8, side: Side, out: &mut Vec<u8>) {
    walk_rays(board, sq, side, &DIAGONAL_RAYS, out);
}

pub fn rook_destinations(board: &Board, sq: u8, side: Side, out: &mut Vec<u8>) {
    walk_rays(board, sq, side, &ORTHOGONAL_RAYS, out);
}

pub fn queen_destinations(board: &Board, sq: u8, side: Side, out: &mut Vec<u8>) {
    walk_rays(board, sq, side, &DIAGONAL_RAYS, out);
    walk_rays(board, sq, side, &ORTHOGONAL_RAYS, out);
}

fn walk_rays(board: &Board, sq: u8, side: Side, rays: &[(i32, i32, i32); 4], out: &mut Vec<u8>) {
    let x = sq as i32;
    let r = x / 8;
    let c = x % 8;

    let own = |p: i8| match side {
        Side::White => is_white_piece(p),
        Side::Black => is_black_piece(p),
    };

    for &(dr, dc, step) in rays {
        let row_span = if dr < 0 {
            r
        } else if dr > 0 {
            7 - r
        } else {
            7
        };
        let col_span = if dc < 0 {
            c
        } else if dc > 0 {
            7 - c
        } else {
            7
        };

        let mut i = x;
        for _ in 0..row_span.min(col_span) {
            i += step;
            let p = board[i as usize];
            if own(p) {
                break;
            }
            out.push(i as u8);
            if p != EMPTY {
                break;
            }
        }
    }
}
