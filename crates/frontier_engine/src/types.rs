//! Core types - board, sides, castling rights, positions
//!
//! The board is a flat array of 64 signed bytes holding piece codes
//! (see [`crate::constants`]), rank 1 first, so `square = rank * 8 + file`.
//! A move is a `(from, to)` pair of squares where `to` values 64..127
//! encode a pawn promotion: the destination file is `to % 8`, the
//! destination rank is implied by the promoting side, and the promotion
//! piece is encoded in blocks of eight (knight, bishop, rook, queen for
//! White, then the same for Black).
//!
//! [`Position`] is the full externally-supplied state: board plus the
//! castling/en-passant/counter fields that cannot be derived from the
//! board alone. It parses from the whitespace-separated integer wire
//! format used by the control protocol.

use crate::constants::*;
use crate::error::{EngineError, EngineResult};

/// Flat board of piece codes, rank 1 first.
pub type Board = [i8; 64];

/// Side to move. The discriminants match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Side {
    White = 0,
    Black = 1,
}

impl Side {
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    #[inline]
    pub fn is_black(self) -> bool {
        self == Side::Black
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(value: i64) -> Option<Side> {
        match value {
            0 => Some(Side::White),
            1 => Some(Side::Black),
            _ => None,
        }
    }
}

/// Game-level classification of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GameState {
    #[default]
    Normal = 0,
    WhiteWin = 1,
    BlackWin = 2,
    Draw = 3,
}

impl GameState {
    pub fn from_index(value: i64) -> Option<GameState> {
        match value {
            0 => Some(GameState::Normal),
            1 => Some(GameState::WhiteWin),
            2 => Some(GameState::BlackWin),
            3 => Some(GameState::Draw),
            _ => None,
        }
    }
}

/// Castling rights for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Castling {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

/// The incremental state that rides along with a board: everything a
/// position needs beyond piece placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosState {
    pub castling: Castling,
    /// File of a pawn that just advanced two squares, or -1.
    pub en_passant_file: i8,
    /// Half-moves since the last pawn move or capture, saturating at 100.
    pub halfmove_clock: u8,
    /// King squares, indexed by [`Side::index`].
    pub king_sq: [u8; 2],
}

impl Default for PosState {
    fn default() -> Self {
        PosState {
            castling: Castling::default(),
            en_passant_file: -1,
            halfmove_clock: 0,
            king_sq: [4, 60],
        }
    }
}

/// A complete externally-supplied position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub board: Board,
    pub state: PosState,
    /// Source square of the move that produced this position, or -1.
    pub square_from: i8,
    /// Destination (possibly promotion-encoded) of that move, or -1.
    pub square_to: i8,
    pub side: Side,
    pub game_state: GameState,
}

/// Number of integer fields in the position wire format.
pub const POSITION_FIELDS: usize = 76;

impl Position {
    /// The standard starting position.
    pub fn starting() -> Position {
        Position {
            board: STARTING_BOARD,
            state: PosState {
                castling: Castling {
                    white_kingside: true,
                    white_queenside: true,
                    black_kingside: true,
                    black_queenside: true,
                },
                en_passant_file: -1,
                halfmove_clock: 0,
                king_sq: [4, 60],
            },
            square_from: -1,
            square_to: -1,
            side: Side::White,
            game_state: GameState::Normal,
        }
    }

    /// Parse a position from the wire format: 64 piece codes (rank 1
    /// first) followed by the castling flags, en-passant file, fifty-move
    /// counter, king squares, last move and side/state fields.
    pub fn parse(input: &str) -> EngineResult<Position> {
        let mut values = [0i64; POSITION_FIELDS];
        let mut count = 0;
        for token in input.split_whitespace() {
            if count == POSITION_FIELDS {
                break;
            }
            values[count] = token.parse::<i64>().map_err(|_| EngineError::PositionToken {
                index: count,
                token: token.to_string(),
            })?;
            count += 1;
        }
        if count < POSITION_FIELDS {
            return Err(EngineError::PositionTruncated {
                count,
                expected: POSITION_FIELDS,
            });
        }
        Position::from_ints(&values)
    }

    /// Build a position from the 76 wire-format integers.
    pub fn from_ints(values: &[i64; POSITION_FIELDS]) -> EngineResult<Position> {
        let mut board = [EMPTY; 64];
        for (sq, &v) in values[..64].iter().enumerate() {
            if !(-1..=11).contains(&v) {
                return Err(EngineError::PositionValue {
                    field: "board",
                    value: v,
                });
            }
            board[sq] = v as i8;
        }

        let flag = |field: &'static str, v: i64| -> EngineResult<bool> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(EngineError::PositionValue { field, value: v }),
            }
        };
        let square = |field: &'static str, v: i64| -> EngineResult<u8> {
            if (0..64).contains(&v) {
                Ok(v as u8)
            } else {
                Err(EngineError::PositionValue { field, value: v })
            }
        };

        let castling = Castling {
            white_kingside: flag("white_kingside", values[64])?,
            white_queenside: flag("white_queenside", values[65])?,
            black_kingside: flag("black_kingside", values[66])?,
            black_queenside: flag("black_queenside", values[67])?,
        };
        let en_passant_file = values[68];
        if !(-1..8).contains(&en_passant_file) {
            return Err(EngineError::PositionValue {
                field: "en_passant_file",
                value: en_passant_file,
            });
        }
        let halfmove_clock = values[69];
        if !(0..=100).contains(&halfmove_clock) {
            return Err(EngineError::PositionValue {
                field: "halfmove_clock",
                value: halfmove_clock,
            });
        }
        let king_sq = [
            square("white_king_square", values[70])?,
            square("black_king_square", values[71])?,
        ];
        let square_from = values[72];
        if !(-1..64).contains(&square_from) {
            return Err(EngineError::PositionValue {
                field: "square_from",
                value: square_from,
            });
        }
        let square_to = values[73];
        if !(-1..128).contains(&square_to) {
            return Err(EngineError::PositionValue {
                field: "square_to",
                value: square_to,
            });
        }
        let side = Side::from_index(values[74]).ok_or(EngineError::PositionValue {
            field: "side",
            value: values[74],
        })?;
        let game_state = GameState::from_index(values[75]).ok_or(EngineError::PositionValue {
            field: "game_state",
            value: values[75],
        })?;

        Ok(Position {
            board,
            state: PosState {
                castling,
                en_passant_file: en_passant_file as i8,
                halfmove_clock: halfmove_clock as u8,
                king_sq,
            },
            square_from: square_from as i8,
            square_to: square_to as i8,
            side,
            game_state,
        })
    }
}

/// Decode a destination value into the true destination square and the
/// promotion piece code, if any.
#[inline]
pub fn decode_destination(to: i8) -> (u8, Option<i8>) {
    if to < 64 {
        (to as u8, None)
    } else if to < 96 {
        let file = (to % 8) as u8;
        (56 + file, Some(W_KNIGHT + (to - 64) / 8))
    } else {
        let file = (to % 8) as u8;
        (file, Some(B_KNIGHT + (to - 96) / 8))
    }
}

/// Inverse of [`decode_destination`].
#[inline]
pub fn encode_destination(true_square: u8, promotion: Option<i8>) -> i8 {
    match promotion {
        None => true_square as i8,
        Some(piece) if piece < B_PAWN => 64 + (piece - W_KNIGHT) * 8 + (true_square % 8) as i8,
        Some(piece) => 96 + (piece - B_KNIGHT) * 8 + (true_square % 8) as i8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_codes_round_trip() {
        for to in 0..128i16 {
            let to = to as i8;
            let (true_sq, promotion) = decode_destination(to);
            assert!(true_sq < 64, "true square out of range for {}", to);
            if let Some(p) = promotion {
                assert!(
                    (W_KNIGHT..=W_QUEEN).contains(&p) || (B_KNIGHT..=B_QUEEN).contains(&p),
                    "promotion piece {} invalid for {}",
                    p,
                    to
                );
            }
            assert_eq!(encode_destination(true_sq, promotion), to);
        }
    }

    #[test]
    fn test_promotion_rank_by_side() {
        // White promotions land on rank 8, black promotions on rank 1.
        let (sq, piece) = decode_destination(88); // white queen, a-file
        assert_eq!(sq, 56);
        assert_eq!(piece, Some(W_QUEEN));
        let (sq, piece) = decode_destination(127); // black queen, h-file
        assert_eq!(sq, 7);
        assert_eq!(piece, Some(B_QUEEN));
    }

    #[test]
    fn test_parse_starting_position() {
        let text = "3 1 2 4 5 2 1 3 \
                    0 0 0 0 0 0 0 0 \
                    -1 -1 -1 -1 -1 -1 -1 -1 \
                    -1 -1 -1 -1 -1 -1 -1 -1 \
                    -1 -1 -1 -1 -1 -1 -1 -1 \
                    -1 -1 -1 -1 -1 -1 -1 -1 \
                    6 6 6 6 6 6 6 6 \
                    9 7 8 10 11 8 7 9 \
                    1 1 1 1 -1 0 4 60 -1 -1 0 0";
        let pos = Position::parse(text).expect("starting position should parse");
        assert_eq!(pos, Position::starting());
    }

    #[test]
    fn test_parse_rejects_bad_piece_code() {
        let mut fields = vec!["12".to_string()];
        fields.extend(std::iter::repeat("0".to_string()).take(POSITION_FIELDS - 1));
        let err = Position::parse(&fields.join(" ")).unwrap_err();
        assert!(matches!(err, EngineError::PositionValue { field: "board", .. }));
    }

    #[test]
    fn test_parse_rejects_truncated_input() {
        let err = Position::parse("0 1 2").unwrap_err();
        assert!(matches!(err, EngineError::PositionTruncated { count: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        let mut fields = vec!["x".to_string()];
        fields.extend(std::iter::repeat("0".to_string()).take(POSITION_FIELDS - 1));
        let err = Position::parse(&fields.join(" ")).unwrap_err();
        assert!(matches!(err, EngineError::PositionToken { index: 0, .. }));
    }
}
