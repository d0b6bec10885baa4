//! Square attack detection
//!
//! [`square_attacked`] scans outward from a square: pawn attackers on the
//! two forward diagonals, knight attackers on the eight knight offsets,
//! an adjacent enemy king, then sliding attackers along the four diagonal
//! and four orthogonal rays until the first blocker. Rank and file bounds
//! are checked explicitly so rays never wrap around the board edge.
//!
//! The scan deliberately does not require a king to be standing on the
//! probed square. Castling generation probes the king's transit squares
//! with the king temporarily relocated, and the same primitive backs the
//! ordinary king-safety test.

use crate::constants::*;
use crate::types::Board;

/// True if the given square is attacked by the given side.
pub fn square_attacked(board: &Board, sq: u8, by_black: bool) -> bool {
    let x = sq as i32;
    let r = x / 8;
    let c = x % 8;

    // Attacker piece codes are offset by 6 when the attackers are black.
    let z = if by_black { 6 } else { 0 };
    let pawn = z;
    let knight = z + 1;
    let bishop = z + 2;
    let rook = z + 3;
    let queen = z + 4;
    let king = z + 5;

    let at = |i: i32| board[i as usize];

    // Pawns attack toward the enemy side, so white attackers sit below
    // the square and black attackers above it.
    if by_black {
        if r < 7 && c > 0 && at(x + 7) == pawn {
            return true;
        }
        if r < 7 && c < 7 && at(x + 9) == pawn {
            return true;
        }
    } else {
        if r > 0 && c > 0 && at(x - 9) == pawn {
            return true;
        }
        if r > 0 && c < 7 && at(x - 7) == pawn {
            return true;
        }
    }

    // Adjacent king.
    if c > 0 && at(x - 1) == king {
        return true;
    }
    if c < 7 && at(x + 1) == king {
        return true;
    }
    if r > 0 {
        if at(x - 8) == king {
            return true;
        }
        if c > 0 && at(x - 9) == king {
            return true;
        }
        if c < 7 && at(x - 7) == king {
            return true;
        }
    }
    if r < 7 {
        if at(x + 8) == king {
            return true;
        }
        if c > 0 && at(x + 7) == king {
            return true;
        }
        if c < 7 && at(x + 9) == king {
            return true;
        }
    }

    // Knights.
    if r > 0 {
        if c > 1 && at(x - 10) == knight {
            return true;
        }
        if c < 6 && at(x - 6) == knight {
            return true;
        }
    }
    if r < 7 {
        if c > 1 && at(x + 6) == knight {
            return true;
        }
        if c < 6 && at(x + 10) == knight {
            return true;
        }
    }
    if r > 1 {
        if c > 0 && at(x - 17) == knight {
            return true;
        }
        if c < 7 && at(x - 15) == knight {
            return true;
        }
    }
    if r < 6 {
        if c > 0 && at(x + 15) == knight {
            return true;
        }
        if c < 7 && at(x + 17) == knight {
            return true;
        }
    }

    // Diagonal rays: bishops and queens.
    for &(dr, dc, step) in &[(-1, -1, -9), (-1, 1, -7), (1, -1, 7), (1, 1, 9)] {
        let span = ray_span(r, c, dr, dc);
        let mut i = x;
        for _ in 0..span {
            i += step;
            let p = at(i);
            if p == bishop || p == queen {
                return true;
            }
            if p != EMPTY {
                break;
            }
        }
    }

    // Orthogonal rays: rooks and queens.
    for &(dr, dc, step) in &[(-1, 0, -8), (1, 0, 8), (0, -1, -1), (0, 1, 1)] {
        let span = ray_span(r, c, dr, dc);
        let mut i = x;
        for _ in 0..span {
            i += step;
            let p = at(i);
            if p == rook || p == queen {
                return true;
            }
            if p != EMPTY {
                break;
            }
        }
    }

    false
}

/// Number of on-board steps available from (r, c) in direction (dr, dc).
#[inline]
fn ray_span(r: i32, c: i32, dr: i32, dc: i32) -> i32 {
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
    row_span.min(col_span)
}

/// True if the king of the given color standing on `sq` is not attacked.
#[inline]
pub fn king_safe(board: &Board, sq: u8, king_is_black: bool) -> bool {
    !square_attacked(board, sq, !king_is_black)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_board() -> Board {
        [EMPTY; 64]
    }

    #[test]
    fn test_rook_attack_blocked() {
        let mut b = empty_board();
        b[0] = B_ROOK; // a1
        assert!(square_attacked(&b, 56, true), "open a-file");
        b[24] = W_PAWN; // a4 blocks
        assert!(!square_attacked(&b, 56, true), "blocked a-file");
    }

    #[test]
    fn test_bishop_ray_does_not_wrap() {
        let mut b = empty_board();
        b[7] = B_BISHOP; // h1
        // a2 (8) is not on h1's diagonal even though 8 = 7 + 1.
        assert!(!square_attacked(&b, 8, true));
        assert!(square_attacked(&b, 56, true), "h1-a8 diagonal is real");
    }

    #[test]
    fn test_pawn_attack_direction() {
        let mut b = empty_board();
        b[28] = W_PAWN; // e4
        assert!(square_attacked(&b, 35, false), "white pawn attacks d5");
        assert!(square_attacked(&b, 37, false), "white pawn attacks f5");
        assert!(!square_attacked(&b, 19, false), "white pawn does not attack backwards");
    }

    #[test]
    fn test_knight_attack_with_edge_guard() {
        let mut b = empty_board();
        b[0] = B_KNIGHT; // a1
        assert!(square_attacked(&b, 17, true), "a1 knight hits b3");
        assert!(square_attacked(&b, 10, true), "a1 knight hits c2");
        assert!(!square_attacked(&b, 15, true), "no wrap to h2");
    }

    #[test]
    fn test_adjacent_king_attacks() {
        let mut b = empty_board();
        b[27] = W_KING; // d4
        assert!(square_attacked(&b, 28, false));
        assert!(square_attacked(&b, 18, false));
        assert!(!square_attacked(&b, 29, false));
    }

    #[test]
    fn test_king_safe_on_probe_square_without_king() {
        // The probe must work on an empty square: castling transit checks
        // rely on it.
        let mut b = empty_board();
        b[60] = B_ROOK; // e8
        assert!(!king_safe(&b, 4, false), "e1 covered by rook on e8");
        assert!(king_safe(&b, 5, false), "f1 is not");
    }
}
