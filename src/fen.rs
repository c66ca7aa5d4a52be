// src/fen.rs
//
// Minimal FEN support: piece placement, side to move, castling rights,
// en passant square, halfmove/fullmove clocks. No SAN, no PGN, no UCI
// move parsing - those live outside the engine's scope entirely.

use crate::board::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, PieceKind};
use crate::square::Square;

/// Parse a FEN string into a board and the side to move. Every newly
/// placed piece gets a fresh `uid` via `Board::spawn`, same as any
/// other board construction path.
pub fn parse(fen: &str) -> Result<(Board, Color), String> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(format!("FEN needs at least 4 fields, got {}: {fen}", fields.len()));
    }

    let mut board = Board::new_empty();
    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(format!("placement field must have 8 ranks, got {}", ranks.len()));
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as i32;
        let mut file = 0i32;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as i32;
                continue;
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let kind = piece_kind_from_glyph(c)?;
            let sq = Square::new(file, rank).ok_or_else(|| format!("rank '{rank_str}' overflows the board"))?;
            board.spawn(color, kind, sq);
            file += 1;
        }
        if file != 8 {
            return Err(format!("rank '{rank_str}' does not cover all 8 files"));
        }
    }

    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(format!("bad active color field: {other}")),
    };

    let mut rights = 0u8;
    if fields[2] != "-" {
        for c in fields[2].chars() {
            rights |= match c {
                'K' => CASTLE_WK,
                'Q' => CASTLE_WQ,
                'k' => CASTLE_BK,
                'q' => CASTLE_BQ,
                other => return Err(format!("bad castling rights glyph: {other}")),
            };
        }
    }
    board.castling_rights = rights;

    board.en_passant = if fields[3] == "-" {
        None
    } else {
        Some(fields[3].parse::<Square>()?)
    };

    board.halfmove_clock = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
    board.fullmove_number = fields.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

    board.validate().map_err(|e| format!("FEN produced an invalid board: {e}"))?;

    Ok((board, side_to_move))
}

fn piece_kind_from_glyph(c: char) -> Result<PieceKind, String> {
    match c.to_ascii_lowercase() {
        'p' => Ok(PieceKind::Pawn),
        'n' => Ok(PieceKind::Knight),
        'b' => Ok(PieceKind::Bishop),
        'r' => Ok(PieceKind::Rook),
        'q' => Ok(PieceKind::Queen),
        'k' => Ok(PieceKind::King),
        other => Err(format!("unrecognized piece glyph: {other}")),
    }
}

/// Render a board and side to move back to FEN. Round-trips everything
/// `parse` reads: placement, active color, castling rights, en
/// passant, halfmove clock, fullmove number.
pub fn to_fen(board: &Board, side_to_move: Color) -> String {
    let mut placement = String::new();
    for rank in (0..8).rev() {
        let mut empty_run = 0;
        for file in 0..8 {
            let sq = Square::new(file, rank).unwrap();
            match board.piece_at(sq) {
                Some(p) => {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(p.kind.symbol(p.color));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            placement.push_str(&empty_run.to_string());
        }
        if rank != 0 {
            placement.push('/');
        }
    }

    let active = match side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut castling = String::new();
    if board.has_castling(CASTLE_WK) {
        castling.push('K');
    }
    if board.has_castling(CASTLE_WQ) {
        castling.push('Q');
    }
    if board.has_castling(CASTLE_BK) {
        castling.push('k');
    }
    if board.has_castling(CASTLE_BQ) {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = board.en_passant.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());

    format!("{placement} {active} {castling} {ep} {} {}", board.halfmove_clock, board.fullmove_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_round_trips() {
        let (board, color) = parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(color, Color::White);
        assert_eq!(board.all_pieces().count(), 32);
        assert_eq!(to_fen(&board, color), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn kiwipete_parses_partial_castling_and_no_en_passant() {
        let (board, color) = parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(color, Color::White);
        assert!(board.has_castling(CASTLE_WK));
        assert!(board.has_castling(CASTLE_BQ));
        assert_eq!(board.en_passant, None);
    }

    #[test]
    fn en_passant_square_round_trips() {
        let (board, color) =
            parse("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
        assert_eq!(board.en_passant, Some("d6".parse().unwrap()));
        assert_eq!(to_fen(&board, color), "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3");
    }

    #[test]
    fn rejects_short_fen() {
        assert!(parse("rnbqkbnr").is_err());
    }

    #[test]
    fn rejects_rank_not_covering_all_files() {
        assert!(parse("rnbqkbn/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }
}
