//! Piece-square tables
//!
//! One 64-entry table per piece code. Each entry is the piece's base
//! point value plus a centralization bonus:
//! `(row_bonus + col_bonus - 3) * edge_factor`, where `row_bonus` is the
//! rank distance from the piece's own back rank and `col_bonus` is
//! `min(file, 7 - file)`. Black tables mirror the white ones with the
//! sign flipped, so a full-board sum is a single pass.

use crate::constants::*;

pub struct EvalTables {
    values: [[f64; 64]; NUM_PIECES],
}

impl EvalTables {
    pub fn new() -> EvalTables {
        let mut values = [[0.0; 64]; NUM_PIECES];
        for (piece, table) in values.iter_mut().enumerate() {
            for (sq, v) in table.iter_mut().enumerate() {
                let rank = sq / 8;
                let file = sq % 8;
                let row_bonus = if piece < 6 { rank } else { 7 - rank };
                let col_bonus = file.min(7 - file);
                let placement = (row_bonus + col_bonus) as f64 - 3.0;
                *v = PIECE_POINT_VALUES[piece] + placement * PIECE_EDGE_FACTOR[piece];
            }
        }
        EvalTables { values }
    }

    /// Table value for a piece code on a square. `piece` must be a real
    /// piece, not `EMPTY`.
    #[inline]
    pub fn value(&self, piece: i8, sq: u8) -> f64 {
        self.values[piece as usize][sq as usize]
    }
}

impl Default for EvalTables {
    fn default() -> Self {
        EvalTables::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_color_symmetric() {
        let t = EvalTables::new();
        for piece in 0..6i8 {
            for sq in 0..64u8 {
                let mirrored = 8 * (7 - sq / 8) + sq % 8;
                let white = t.value(piece, sq);
                let black = t.value(piece + 6, mirrored);
                assert!(
                    (white + black).abs() < 1e-12,
                    "piece {} sq {}: {} vs {}",
                    piece,
                    sq,
                    white,
                    black
                );
            }
        }
    }

    #[test]
    fn test_centralization_is_rewarded() {
        let t = EvalTables::new();
        // A knight on e4 is worth more than a knight on a1.
        assert!(t.value(W_KNIGHT, 28) > t.value(W_KNIGHT, 0));
        // And the black mirror is worth less (more negative).
        assert!(t.value(B_KNIGHT, 36) < t.value(B_KNIGHT, 56));
    }
}
