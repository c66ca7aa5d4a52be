// src/moves/abilities.rs
//
// Per-piece-type movement and attack generation (step, slide, pawn,
// castle), plus the ChainKill virtual-capture geometry. Sliders walk
// outward by ray-casting rather than magic bitboards so that
// `slide_can_pass_through` composes directly with the scan (see
// DESIGN.md, "Sliding attack generation").

use crate::board::{Board, CardinalDir, Color, Piece, PieceKind};
use crate::game::Game;
use crate::moves::types::Move;
use crate::square::Square;

pub const ORTH: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAG: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub fn king8() -> [(i32, i32); 8] {
    [ORTH[0], ORTH[1], ORTH[2], ORTH[3], DIAG[0], DIAG[1], DIAG[2], DIAG[3]]
}

fn slide_deltas(kind: PieceKind) -> &'static [(i32, i32)] {
    match kind {
        PieceKind::Bishop => &DIAG,
        PieceKind::Rook => &ORTH,
        PieceKind::Queen => &[
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ],
        _ => &[],
    }
}

/// Pseudo-legal moves for one piece (base chess movement only; ChainKill
/// remote captures are injected separately by the `ChainKill` rule).
pub fn generate_moves(piece: &Piece, game: &Game) -> Vec<Move> {
    match piece.kind {
        PieceKind::Knight => step_moves(piece, &KNIGHT_DELTAS, game.board()),
        PieceKind::King => {
            let mut mvs = step_moves(piece, &king8(), game.board());
            mvs.extend(castle_moves(piece, game));
            mvs
        }
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => slide_moves(piece, game),
        PieceKind::Pawn => pawn_moves(piece, game),
    }
}

/// Attack set for one piece: same geometry as moves but destinations
/// need not be empty/enemy (own-colored squares count as attacked too),
/// and pawns attack only diagonally (no forward pushes).
pub fn generate_attacks(piece: &Piece, game: &Game) -> Vec<Square> {
    match piece.kind {
        PieceKind::Knight => step_attacks(piece, &KNIGHT_DELTAS),
        PieceKind::King => step_attacks(piece, &king8()),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => slide_attacks(piece, game),
        PieceKind::Pawn => pawn_attacks(piece),
    }
}

fn step_moves(piece: &Piece, deltas: &[(i32, i32)], board: &Board) -> Vec<Move> {
    let mut out = Vec::new();
    for &(df, dr) in deltas {
        let Some(to) = Square::new(piece.pos.file() + df, piece.pos.rank() + dr) else {
            continue;
        };
        match board.piece_at(to) {
            Some(target) if target.color == piece.color => {}
            _ => out.push(Move::Normal {
                from: piece.pos,
                to,
                double_pawn_push: false,
            }),
        }
    }
    out
}

fn step_attacks(piece: &Piece, deltas: &[(i32, i32)]) -> Vec<Square> {
    deltas
        .iter()
        .filter_map(|&(df, dr)| Square::new(piece.pos.file() + df, piece.pos.rank() + dr))
        .collect()
}

fn slide_moves(piece: &Piece, game: &Game) -> Vec<Move> {
    let board = game.board();
    let passthrough = game.slide_can_pass_through(piece);
    let mut out = Vec::new();
    for &(df, dr) in slide_deltas(piece.kind) {
        let mut f = piece.pos.file() + df;
        let mut r = piece.pos.rank() + dr;
        while let Some(to) = Square::new(f, r) {
            match board.piece_at(to) {
                None => out.push(Move::Normal {
                    from: piece.pos,
                    to,
                    double_pawn_push: false,
                }),
                Some(target) => {
                    if target.color != piece.color {
                        out.push(Move::Normal {
                            from: piece.pos,
                            to,
                            double_pawn_push: false,
                        });
                    }
                    if !passthrough {
                        break;
                    }
                }
            }
            f += df;
            r += dr;
        }
    }
    out
}

fn slide_attacks(piece: &Piece, game: &Game) -> Vec<Square> {
    let board = game.board();
    let passthrough = game.slide_can_pass_through(piece);
    let mut out = Vec::new();
    for &(df, dr) in slide_deltas(piece.kind) {
        let mut f = piece.pos.file() + df;
        let mut r = piece.pos.rank() + dr;
        while let Some(to) = Square::new(f, r) {
            out.push(to);
            if board.piece_at(to).is_some() && !passthrough {
                break;
            }
            f += df;
            r += dr;
        }
    }
    out
}

fn pawn_attacks(piece: &Piece) -> Vec<Square> {
    let direction = if piece.color == Color::White { 1 } else { -1 };
    [-1, 1]
        .iter()
        .filter_map(|&df| Square::new(piece.pos.file() + df, piece.pos.rank() + direction))
        .collect()
}

fn pawn_moves(piece: &Piece, game: &Game) -> Vec<Move> {
    let board = game.board();
    let direction = if piece.color == Color::White { 1 } else { -1 };
    let start_rank = if piece.color == Color::White { 1 } else { 6 };
    let last_rank = if piece.color == Color::White { 7 } else { 0 };
    let mut out = Vec::new();

    let r1 = piece.pos.rank() + direction;
    if let Some(one) = Square::new(piece.pos.file(), r1) {
        if board.is_empty(one) {
            if r1 == last_rank {
                push_promotions(&mut out, piece.pos, one);
            } else {
                out.push(Move::Normal {
                    from: piece.pos,
                    to: one,
                    double_pawn_push: false,
                });
            }
            if piece.pos.rank() == start_rank {
                let r2 = piece.pos.rank() + 2 * direction;
                if let Some(two) = Square::new(piece.pos.file(), r2) {
                    if board.is_empty(two) {
                        out.push(Move::Normal {
                            from: piece.pos,
                            to: two,
                            double_pawn_push: true,
                        });
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = Square::new(piece.pos.file() + df, piece.pos.rank() + direction) else {
            continue;
        };
        if let Some(target) = board.piece_at(to) {
            if target.color != piece.color {
                if to.rank() == last_rank {
                    push_promotions(&mut out, piece.pos, to);
                } else {
                    out.push(Move::Normal {
                        from: piece.pos,
                        to,
                        double_pawn_push: false,
                    });
                }
            }
        }
    }

    // en passant: legal only if the immediately prior move was a
    // double pawn push by an opposing pawn adjacent on this rank.
    if let Some(Move::Normal {
        to: lm_to,
        double_pawn_push: true,
        ..
    }) = game.last_move()
    {
        if let Some(moved) = board.piece_at(*lm_to) {
            if moved.kind == PieceKind::Pawn && moved.color != piece.color {
                let ep_rank = if piece.color == Color::White { 4 } else { 3 };
                if piece.pos.rank() == ep_rank
                    && (moved.pos.file() - piece.pos.file()).abs() == 1
                    && moved.pos.rank() == piece.pos.rank()
                {
                    if let Some(ep_to) = Square::new(moved.pos.file(), piece.pos.rank() + direction) {
                        if board.is_empty(ep_to) {
                            out.push(Move::EnPassant {
                                from: piece.pos,
                                to: ep_to,
                                captured_sq: moved.pos,
                            });
                        }
                    }
                }
            }
        }
    }

    out
}

fn push_promotions(out: &mut Vec<Move>, from: Square, to: Square) {
    // Move generation defaults to Queen; the variant field also supports
    // under-promotion to R/B/N for callers that construct the move
    // directly (e.g. a UI), per §4.1.
    out.push(Move::Promotion {
        from,
        to,
        promote_to: PieceKind::Queen,
    });
}

fn castle_moves(king: &Piece, game: &Game) -> Vec<Move> {
    let mut out = Vec::new();
    if king.has_moved || game.in_check(king.color) {
        return out;
    }
    let board = game.board();
    let r0 = king.pos.rank();
    let kf = king.pos.file();

    for &rook_file in &[0, 7] {
        let Some(rook_sq) = Square::new(rook_file, r0) else {
            continue;
        };
        let Some(rook) = board.piece_at(rook_sq) else {
            continue;
        };
        if rook.kind != PieceKind::Rook || rook.color != king.color || rook.has_moved {
            continue;
        }

        let step = if rook_file > kf { 1 } else { -1 };
        let mut f = kf + step;
        let mut corridor_clear = true;
        while f != rook_file {
            if !board.is_empty(Square::new(f, r0).unwrap()) {
                corridor_clear = false;
                break;
            }
            f += step;
        }
        if !corridor_clear {
            continue;
        }

        let king_to = Square::new(kf + 2 * step, r0).unwrap();
        let rook_to = Square::new(kf + step, r0).unwrap();
        if !board.is_empty(king_to) || !board.is_empty(rook_to) {
            continue;
        }

        let enemy = king.color.opponent();
        let cross1 = Square::new(kf + step, r0).unwrap();
        if game.is_square_attacked(cross1, enemy) || game.is_square_attacked(king_to, enemy) {
            continue;
        }

        out.push(Move::Castle {
            from: king.pos,
            to: king_to,
            rook_from: rook.pos,
            rook_to,
        });
    }
    out
}

/// ChainKill's per-piece-type capture geometry, evaluated as if `piece`
/// stood on `origin` instead of its real square. Sliders: when
/// `slide_can_pass_through` is enabled, a ray continues through blockers
/// of any color, collecting every enemy square it passes; otherwise it
/// stops at the first occupied square, counted only if it is an enemy.
pub fn virtual_capture_targets(piece: &Piece, origin: Square, game: &Game) -> Vec<Square> {
    let board = game.board();
    let mut out = Vec::new();
    let mut add_if_enemy = |to: Square, out: &mut Vec<Square>| {
        if let Some(target) = board.piece_at(to) {
            if target.color != piece.color {
                out.push(to);
            }
        }
    };

    match piece.kind {
        PieceKind::Pawn => {
            let direction = if piece.color == Color::White { 1 } else { -1 };
            for df in [-1, 1] {
                if let Some(to) = Square::new(origin.file() + df, origin.rank() + direction) {
                    add_if_enemy(to, &mut out);
                }
            }
        }
        PieceKind::Knight => {
            for &(df, dr) in &KNIGHT_DELTAS {
                if let Some(to) = Square::new(origin.file() + df, origin.rank() + dr) {
                    add_if_enemy(to, &mut out);
                }
            }
        }
        PieceKind::King => {
            for &(df, dr) in &king8() {
                if let Some(to) = Square::new(origin.file() + df, origin.rank() + dr) {
                    add_if_enemy(to, &mut out);
                }
            }
        }
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            let passthrough = game.slide_can_pass_through(piece);
            for &(df, dr) in slide_deltas(piece.kind) {
                let mut f = origin.file() + df;
                let mut r = origin.rank() + dr;
                while let Some(to) = Square::new(f, r) {
                    if let Some(target) = board.piece_at(to) {
                        if target.color != piece.color {
                            out.push(to);
                        }
                        if !passthrough {
                            break;
                        }
                    }
                    f += df;
                    r += dr;
                }
            }
        }
    }
    out
}

/// Cardinal direction from `target_sq` toward `origin_sq`, if they share
/// a file or rank; used by CaptureDefense's Block Path test.
pub fn direction_from_target_to_origin(target_sq: Square, origin_sq: Square) -> Option<CardinalDir> {
    if target_sq.file() == origin_sq.file() {
        if origin_sq.rank() > target_sq.rank() {
            return Some(CardinalDir::North);
        }
        if origin_sq.rank() < target_sq.rank() {
            return Some(CardinalDir::South);
        }
    }
    if target_sq.rank() == origin_sq.rank() {
        if origin_sq.file() > target_sq.file() {
            return Some(CardinalDir::East);
        }
        if origin_sq.file() < target_sq.file() {
            return Some(CardinalDir::West);
        }
    }
    None
}

/// The effective square a captured piece is removed from, and the
/// origin square used for Block Path's direction test (`from_sq` for
/// Normal/EnPassant, `origin_sq` for RemoteCapture).
pub fn capture_origin(mv: &Move) -> Square {
    match *mv {
        Move::EnPassant { from, .. } => from,
        Move::RemoteCapture { origin_sq, .. } => origin_sq,
        _ => mv.from_sq(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;

    #[test]
    fn knight_in_center_has_eight_pseudo_legal_moves() {
        let mut game = Game::new_chess_only();
        // clear the board except one white knight on d4
        game.board_mut().remove("b1".parse().unwrap());
        let knight = game.board_mut().spawn(Color::White, PieceKind::Knight, "d4".parse().unwrap());
        let moves = generate_moves(&knight, &game);
        assert_eq!(moves.len(), 8);
    }

    #[test]
    fn direction_detection_matches_cardinal_axes() {
        let target: Square = "d4".parse().unwrap();
        let north: Square = "d6".parse().unwrap();
        assert_eq!(direction_from_target_to_origin(target, north), Some(CardinalDir::North));
        let east: Square = "f4".parse().unwrap();
        assert_eq!(direction_from_target_to_origin(target, east), Some(CardinalDir::East));
    }
}
